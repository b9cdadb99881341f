// Builds small timetable PDFs in memory so the tests need no fixtures.
//
// Every table is drawn as one rectangle per cell (12 columns of 80pt, rows of
// 20pt) with Helvetica text near the bottom-left corner of each cell. A cell
// holding `MERGED` is drawn as part of the cell on its left, without the
// vertical rule between them.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

pub const MERGED: &str = "<merged>";

const PAGE_WIDTH: f32 = 1008.0;
const PAGE_HEIGHT: f32 = 612.0;
const LEFT: f32 = 36.0;
const TOP: f32 = 560.0;
const COLUMN_WIDTH: f32 = 80.0;
const ROW_HEIGHT: f32 = 20.0;
const FONT_SIZE: f32 = 6.0;

pub type PageRows<'a> = &'a [&'a [&'a str]];

/// How the table of each page is put on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drawing {
    /// Straight in the page content: `re` rules, `Td` + `Tj` text.
    Direct,
    /// Under a translating `cm`, with text placed by `Tm` and shown by `TJ`.
    Transformed,
    /// Inside a Form XObject painted with `Do`.
    FormXObject,
}

/// One PDF page per entry of `pages`, each carrying one ruled table.
pub fn timetable_pdf(pages: &[PageRows<'_>]) -> Vec<u8> {
    build(pages, Drawing::Direct, None)
}

/// A single page PDF.
pub fn single_table_pdf(rows: PageRows<'_>) -> Vec<u8> {
    timetable_pdf(&[rows])
}

/// A single page PDF drawn the given way.
pub fn drawn_table_pdf(rows: PageRows<'_>, drawing: Drawing) -> Vec<u8> {
    build(&[rows], drawing, None)
}

/// A single page PDF whose font carries `cmap` as its `/ToUnicode` stream.
pub fn table_pdf_with_to_unicode(rows: PageRows<'_>, cmap: &[u8]) -> Vec<u8> {
    build(&[rows], Drawing::Direct, Some(cmap))
}

fn build(pages: &[PageRows<'_>], drawing: Drawing, to_unicode: Option<&[u8]>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    };
    if let Some(cmap) = to_unicode {
        let cmap_id = doc.add_object(Stream::new(dictionary! {}, cmap.to_vec()));
        font.set("ToUnicode", cmap_id);
    }
    let font_id = doc.add_object(font);
    let fonts = dictionary! { "F1" => font_id };

    let mut xobjects = Dictionary::new();
    let mut kids: Vec<Object> = Vec::new();
    for (i, rows) in pages.iter().enumerate() {
        let table = Content { operations: table_operations(rows, drawing) }.encode().unwrap();

        let content = if drawing == Drawing::FormXObject {
            let name = format!("Fm{i}");
            let form_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
                    "Resources" => dictionary! { "Font" => fonts.clone() },
                },
                table,
            ));
            xobjects.set(name.clone(), form_id);
            let paint = vec![
                Operation::new("q", vec![]),
                Operation::new("Do", vec![Object::Name(name.into_bytes())]),
                Operation::new("Q", vec![]),
            ];
            Content { operations: paint }.encode().unwrap()
        } else {
            table
        };

        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
        "XObject" => xobjects,
    });
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn table_operations(rows: &[&[&str]], drawing: Drawing) -> Vec<Operation> {
    let mut ops = Vec::new();
    if drawing == Drawing::Transformed {
        // Everything is drawn 10pt too far left and too high, then moved back.
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), 10.into(), (-10).into()],
        ));
    }
    let (dx, dy) = if drawing == Drawing::Transformed { (-10.0, 10.0) } else { (0.0, 0.0) };

    ops.push(Operation::new("w", vec![0.5_f32.into()]));
    let mut text = Vec::new();

    for (r, row) in rows.iter().enumerate() {
        let bottom = TOP - ROW_HEIGHT * (r as f32 + 1.0) + dy;

        let mut c = 0;
        while c < row.len() {
            let mut span = 1;
            while c + span < row.len() && row[c + span] == MERGED {
                span += 1;
            }

            let x = LEFT + COLUMN_WIDTH * c as f32 + dx;
            ops.push(Operation::new(
                "re",
                vec![x.into(), bottom.into(), (COLUMN_WIDTH * span as f32).into(), ROW_HEIGHT.into()],
            ));
            text.extend(cell_text(row[c], x + 2.0, bottom, drawing));
            c += span;
        }
    }
    ops.push(Operation::new("S", vec![]));
    ops.extend(text);

    if drawing == Drawing::Transformed {
        ops.push(Operation::new("Q", vec![]));
    }
    ops
}

/// Lines of a cell, first line on top.
fn cell_text(value: &str, x: f32, bottom: f32, drawing: Drawing) -> Vec<Operation> {
    let lines: Vec<&str> = value.lines().filter(|l| !l.is_empty()).collect();
    let baselines: &[f32] = match lines.len() {
        0 => return Vec::new(),
        1 => &[7.0],
        _ => &[12.0, 4.0],
    };

    let mut ops = Vec::new();
    for (line, offset) in lines.iter().zip(baselines) {
        let y = bottom + offset;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
        if drawing == Drawing::Transformed {
            let (head, tail) = line.split_at(line.len() / 2);
            ops.push(Operation::new(
                "Tm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()],
            ));
            ops.push(Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal(head),
                    0.into(),
                    Object::string_literal(tail),
                ])],
            ));
        } else {
            ops.push(Operation::new("Td", vec![x.into(), y.into()]));
            ops.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        }
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

/// A timetable row in the published column layout:
/// code, section, type, professor code, professor name, course name, then
/// Monday..Saturday.
pub fn course_row<'a>(
    code: &'a str,
    professor: &'a str,
    name: &'a str,
    days: [&'a str; 6],
) -> [&'a str; 12] {
    [
        code, "01", "T", professor, "", name, days[0], days[1], days[2], days[3], days[4], days[5],
    ]
}

pub const HEADER: [&str; 12] = [
    "Codigo", "Sec", "Tipo", "Cod. Prof", "Profesor", "Asignatura", "Lunes", "Martes", "Miercoles", "Jueves",
    "Viernes", "Sabado",
];
