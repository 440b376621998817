pub mod cgpa;
pub mod pipeline;
pub mod simulator;

pub use pipeline::AnalysisPipeline;
