pub mod source;
pub mod table;

pub use source::{PdfTableSource, TableSource};
pub use table::RawTable;
