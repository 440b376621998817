pub mod config;
pub mod error;
pub mod models;
pub mod pdf;
pub mod cleaning;
pub mod analysis;
pub mod storage;

pub use config::{Config, PipelineConfig};
pub use error::{Error, Result};
pub use pdf::{PdfTableSource, TableSource};
pub use cleaning::TableCleaner;
pub use analysis::AnalysisPipeline;
pub use storage::Storage;
