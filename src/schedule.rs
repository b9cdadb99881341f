//! Row filtering and reshaping into the per-room weekly schedule.

use crate::document::Row;
use crate::{Result, TimetableError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

static TIME_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}:\d{2}-\d{2}:\d{2}").expect("time range pattern is valid"));

// ── Weekday ───────────────────────────────────────────────────────────────────

/// Teaching days, in canonical order. There are no Sunday classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All weekdays in canonical order; position `i` is read from the
    /// `i`-th weekday column.
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── ScheduleEntry ─────────────────────────────────────────────────────────────

/// One class meeting in a room on a given weekday.
///
/// Field names are the wire names of the JSON API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    /// Course code, e.g. `"115101"`.
    pub codigo: String,
    /// Professor code exactly as printed; empty when the source cell is
    /// absent.
    pub codigo_p: String,
    /// Course name.
    pub nombre: String,
    /// Time range, e.g. `"08:00-10:00"`.
    pub hora: String,
}

// ── RoomSchedule ──────────────────────────────────────────────────────────────

/// Entries of one room grouped by weekday.
///
/// Iteration and serialization follow canonical weekday order; weekdays
/// without entries are never present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoomSchedule {
    days: BTreeMap<Weekday, Vec<ScheduleEntry>>,
}

impl RoomSchedule {
    /// Entries for `day`, in encounter order.
    pub fn day(&self, day: Weekday) -> Option<&[ScheduleEntry]> {
        self.days.get(&day).map(Vec::as_slice)
    }

    pub fn days(&self) -> impl Iterator<Item = (Weekday, &[ScheduleEntry])> {
        self.days.iter().map(|(day, entries)| (*day, entries.as_slice()))
    }

    /// Number of weekdays with at least one entry.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn push(&mut self, day: Weekday, entry: ScheduleEntry) {
        self.days.entry(day).or_default().push(entry);
    }
}

// ── ResultSet ─────────────────────────────────────────────────────────────────

/// Room identifier → weekly schedule, ordered by the room's numeric suffix.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    rooms: Vec<(String, RoomSchedule)>,
}

impl ResultSet {
    pub fn rooms(&self) -> impl Iterator<Item = (&str, &RoomSchedule)> {
        self.rooms.iter().map(|(room, schedule)| (room.as_str(), schedule))
    }

    pub fn room(&self, room: &str) -> Option<&RoomSchedule> {
        self.rooms.iter().find(|(r, _)| r == room).map(|(_, schedule)| schedule)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rooms.len()))?;
        for (room, schedule) in &self.rooms {
            map.serialize_entry(room, schedule)?;
        }
        map.end()
    }
}

// ── ScheduleLayout ────────────────────────────────────────────────────────────

/// Column layout and filters of the timetable tables.
///
/// The [`Default`] is the layout of the published timetables: course code in
/// column 0, professor code in column 3, course name in column 5 and one
/// column per weekday from column 6 onwards.
#[derive(Debug, Clone)]
pub struct ScheduleLayout {
    /// Only courses whose code starts with this are kept.
    pub course_prefix: String,
    /// Only rooms starting with this are kept. Rooms are ordered by the digits
    /// that follow it.
    pub room_prefix: String,
    pub code_column: usize,
    pub professor_column: usize,
    pub name_column: usize,
    /// Column of Monday; the other weekdays follow.
    pub first_day_column: usize,
    /// Rows with fewer cells are skipped.
    pub min_cells: usize,
}

impl Default for ScheduleLayout {
    fn default() -> Self {
        Self {
            course_prefix: "115".into(),
            room_prefix: "SA4".into(),
            code_column: 0,
            professor_column: 3,
            name_column: 5,
            first_day_column: 6,
            min_cells: 7,
        }
    }
}

impl ScheduleLayout {
    /// Filter `rows` and regroup them as room → weekday → entries.
    ///
    /// Rows and cells that do not fit the layout are skipped without error.
    /// Fails with [`TimetableError::UnparsableRoomSuffix`] when a kept room
    /// has no digits after the room prefix.
    pub fn reshape(&self, rows: &[Row]) -> Result<ResultSet> {
        let mut rooms: Vec<(String, RoomSchedule)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut skipped = 0usize;

        for row in rows {
            if !self.collect_row(row, &mut rooms, &mut index) {
                skipped += 1;
            }
        }

        let mut keyed = Vec::with_capacity(rooms.len());
        for (room, schedule) in rooms {
            let suffix = numeric_suffix(&room, &self.room_prefix)
                .ok_or_else(|| TimetableError::UnparsableRoomSuffix(room.clone()))?
                .to_owned();
            keyed.push((suffix, room, schedule));
        }
        keyed.sort_by(|a, b| compare_numeric(&a.0, &b.0));

        debug!(rows = rows.len(), skipped, rooms = keyed.len(), "reshaped schedule");
        Ok(ResultSet { rooms: keyed.into_iter().map(|(_, room, schedule)| (room, schedule)).collect() })
    }

    /// Add the entries of one row. Returns `false` when the row is skipped
    /// as a whole.
    fn collect_row(
        &self,
        row: &Row,
        rooms: &mut Vec<(String, RoomSchedule)>,
        index: &mut HashMap<String, usize>,
    ) -> bool {
        if row.len() < self.min_cells {
            return false;
        }

        let code = cell(row, self.code_column).trim();
        if !code.starts_with(&self.course_prefix) {
            return false;
        }
        let professor = cell(row, self.professor_column);
        let name = cell(row, self.name_column).trim();

        for (offset, day) in Weekday::ALL.into_iter().enumerate() {
            let Some(Some(text)) = row.get(self.first_day_column + offset) else {
                continue;
            };
            if !TIME_RANGE.is_match(text) {
                continue;
            }

            let mut tokens = text.split_whitespace();
            let hora = tokens.next().unwrap_or_default();
            let room = tokens.next().unwrap_or_default();
            if !room.starts_with(&self.room_prefix) {
                continue;
            }

            let slot = *index.entry(room.to_owned()).or_insert_with(|| {
                rooms.push((room.to_owned(), RoomSchedule::default()));
                rooms.len() - 1
            });
            rooms[slot].1.push(
                day,
                ScheduleEntry {
                    codigo: code.to_owned(),
                    codigo_p: professor.to_owned(),
                    nombre: name.to_owned(),
                    hora: hora.to_owned(),
                },
            );
        }

        true
    }
}

/// Text of a cell; absent and missing cells read as empty.
fn cell(row: &Row, column: usize) -> &str {
    row.get(column).and_then(|c| c.as_deref()).unwrap_or("")
}

/// The digits following the first occurrence of `prefix` that is followed by
/// at least one digit.
fn numeric_suffix<'a>(room: &'a str, prefix: &str) -> Option<&'a str> {
    room.match_indices(prefix).find_map(|(start, _)| {
        let rest = &room[start + prefix.len()..];
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        (digits > 0).then(|| &rest[..digits])
    })
}

/// Compare two digit strings by numeric value without parsing them, so any
/// length works. Equal values compare equal.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
