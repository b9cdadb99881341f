use crate::{ExtractorConfig, Result, TimetableError};
use pdfplumber::{Pdf, PdfError};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One table row. `None` marks an empty cell or one covered by a merged
/// neighbour.
pub type Row = Vec<Option<String>>;

/// A table found on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// 1-based page number.
    pub page_number: usize,
    /// Rows from top to bottom.
    pub rows: Vec<Row>,
}

impl Table {
    /// Number of columns (the width of the widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

fn parse_error(e: PdfError) -> TimetableError {
    TimetableError::DocumentParse(e.to_string())
}

// ── TimetableDocument ─────────────────────────────────────────────────────────

/// A loaded PDF whose tables can be read row by row.
///
/// # Creating a document
///
/// ```no_run
/// use timetablepdf::{ExtractorConfig, TimetableDocument};
///
/// // From a file path
/// let d = TimetableDocument::from_path("horarios.pdf").unwrap();
///
/// // From an in-memory buffer
/// let bytes = std::fs::read("horarios.pdf").unwrap();
/// let d = TimetableDocument::from_bytes(&bytes).unwrap();
///
/// // From any reader, e.g. an upload stream
/// let file = std::fs::File::open("horarios.pdf").unwrap();
/// let d = TimetableDocument::from_reader(file).unwrap();
///
/// // Reading only the first page
/// let cfg = ExtractorConfig { max_pages: Some(1), ..Default::default() };
/// let d = TimetableDocument::from_bytes(&bytes).unwrap().with_config(cfg);
/// ```
pub struct TimetableDocument {
    pdf: Pdf,
    config: ExtractorConfig,
}

impl TimetableDocument {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Load a PDF from the file system.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Pdf::open_file(path.as_ref(), None).map_err(parse_error)?))
    }

    /// Load a PDF from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self::new(Pdf::open(data, None).map_err(parse_error)?))
    }

    /// Load a PDF from a readable stream.
    pub fn from_reader<R: Read>(mut source: R) -> Result<Self> {
        let mut data = Vec::new();
        source.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Replace the active [`ExtractorConfig`].
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    fn new(pdf: Pdf) -> Self {
        Self { pdf, config: ExtractorConfig::default() }
    }

    // ── Extraction ────────────────────────────────────────────────────────────

    /// Detect every table, in page order and, within a page, in the order
    /// `pdfplumber` reports them.
    ///
    /// Pages without a table contribute nothing. A page that cannot be read
    /// fails the whole call.
    pub fn extract_tables(&self) -> Result<Vec<Table>> {
        let limit = self.config.max_pages.unwrap_or(usize::MAX);
        let mut tables = Vec::new();
        let mut pages = 0usize;

        for page in self.pdf.pages_iter().take(limit) {
            let page = page.map_err(parse_error)?;
            let page_number = page.page_number() + 1;
            pages += 1;

            let found = page.extract_tables(&self.config.table_settings);
            if found.is_empty() {
                debug!(page = page_number, "no table on page");
            }
            tables.extend(found.into_iter().map(|rows| Table { page_number, rows }));
        }

        info!(pages, tables = tables.len(), "extracted tables");
        Ok(tables)
    }

    /// All table rows of the document concatenated: page order, then table
    /// order, then row order.
    pub fn extract_rows(&self) -> Result<Vec<Row>> {
        Ok(self.extract_tables()?.into_iter().flat_map(|t| t.rows).collect())
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Returns a reference to the underlying [`pdfplumber::Pdf`].
    pub fn pdf(&self) -> &Pdf {
        &self.pdf
    }

    /// Returns a reference to the active [`ExtractorConfig`].
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }
}
