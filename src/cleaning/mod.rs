pub mod cleaner;
pub mod dates;

pub use cleaner::TableCleaner;
