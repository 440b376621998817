pub mod grade;
pub mod course;
pub mod distribution;
pub mod report;

pub use grade::*;
pub use course::*;
pub use distribution::*;
pub use report::*;
