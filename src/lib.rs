//! # timetablepdf
//!
//! Reads a university timetable PDF and regroups the classroom schedule of
//! the SA4 wing by room and weekday.
//!
//! ## What this crate does
//!
//! 1. **Extract tables**: opens the document with `pdfplumber`, finds the
//!    ruled tables of every page and returns their rows as lists of string
//!    cells.
//! 2. **Filter rows**: keeps the rows of courses whose code starts with
//!    `115` and the weekday cells whose room starts with `SA4`.
//! 3. **Reshape**: builds `room → weekday → [entry]`, rooms sorted by their
//!    numeric suffix and weekdays in Monday..Saturday order.
//! 4. **Serve**: exposes the whole pipeline as `POST /procesar-pdf`.
//!
//! ## Quick example
//!
//! ```no_run
//! use timetablepdf::{ScheduleLayout, TimetableDocument};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = TimetableDocument::from_path("horarios.pdf")?;
//! let rows = document.extract_rows()?;
//!
//! let schedule = ScheduleLayout::default().reshape(&rows)?;
//! for (room, days) in schedule.rooms() {
//!     println!("{room}: {} weekday(s)", days.len());
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

mod document;
mod schedule;
pub mod server;

pub use document::{Row, Table, TimetableDocument};
pub use pdfplumber::TableSettings;
pub use schedule::{ResultSet, RoomSchedule, ScheduleEntry, ScheduleLayout, Weekday};

// ── Configuration ────────────────────────────────────────────────────────────

/// Options of the table extraction step.
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfig {
    /// Table detection settings handed to `pdfplumber`. The default finds
    /// tables from their ruling lines.
    pub table_settings: TableSettings,

    /// Only the first `max_pages` pages are read when set.
    pub max_pages: Option<usize>,
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
#[derive(Error, Debug)]
pub enum TimetableError {
    /// A filesystem or socket I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The uploaded file name does not carry the `.pdf` extension.
    #[error("invalid file type: '{0}' is not a .pdf file")]
    InvalidFileType(String),

    /// `pdfplumber` could not open the document or read one of its pages.
    #[error("PDF parse error: {0}")]
    DocumentParse(String),

    /// A room identifier passed the prefix filter but carries no numeric
    /// suffix to sort by.
    #[error("room '{0}' has no numeric suffix to sort by")]
    UnparsableRoomSuffix(String),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, TimetableError>;

// ── Pipeline ─────────────────────────────────────────────────────────────────

/// Run the whole pipeline on an in-memory PDF: extract every table row, then
/// reshape with the default [`ScheduleLayout`].
pub fn process_pdf(data: &[u8]) -> Result<ResultSet> {
    let rows = TimetableDocument::from_bytes(data)?.extract_rows()?;
    ScheduleLayout::default().reshape(&rows)
}

/// Reject file names that do not end in `.pdf`.
///
/// The comparison is case-sensitive: `HORARIO.PDF` is rejected.
pub fn check_pdf_filename(filename: &str) -> Result<()> {
    if filename.ends_with(".pdf") {
        Ok(())
    } else {
        Err(TimetableError::InvalidFileType(filename.into()))
    }
}
