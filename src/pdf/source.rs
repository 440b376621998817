use std::path::Path;

use crate::error::{Error, Result};
use crate::pdf::table::{parse_tables, RawTable};

/// Seam between the pipeline and the document format. Tests feed
/// prepared rows through this without touching a real PDF.
pub trait TableSource: Send + Sync {
    fn extract_tables(&self, path: &Path) -> Result<Vec<RawTable>>;

    fn name(&self) -> &str;
}

/// Extracts tables from a transcript PDF. Text extraction (layout,
/// encodings, fonts) is delegated to the `pdf-extract` crate; this
/// only reassembles the text into rows and cells.
pub struct PdfTableSource;

impl PdfTableSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfTableSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSource for PdfTableSource {
    fn extract_tables(&self, path: &Path) -> Result<Vec<RawTable>> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }

        tracing::debug!("Extracting text from {}", path.display());
        let text = pdf_extract::extract_text(path)
            .map_err(|e| Error::PdfExtraction(e.to_string()))?;

        let tables = parse_tables(&text);
        tracing::debug!("Found {} table-like regions", tables.len());

        if tables.is_empty() {
            return Err(Error::NoTablesFound(path.display().to_string()));
        }

        Ok(tables)
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}
