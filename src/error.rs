use thiserror::Error;

use crate::models::grade::Grade;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Transcript file not found: {0}")]
    FileNotFound(String),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("No tables found in {0}")]
    NoTablesFound(String),

    #[error("Table header row not found (expected \"Course Code\" and \"Grade\" columns)")]
    HeaderNotFound,

    #[error("Required column missing: {0}")]
    MissingColumn(String),

    #[error("No valid course rows after cleaning")]
    NoCourseRows,

    #[error("Invalid grade: {0}")]
    InvalidGrade(String),

    #[error("Invalid credits value: {0}")]
    InvalidCredits(String),

    #[error("Unknown course code: {0}")]
    UnknownCourse(String),

    #[error("Not enough credits in grade {grade}: requested {requested}, available {available}")]
    InsufficientCredits {
        grade: Grade,
        requested: u32,
        available: u32,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidGrade(_)
                | Error::InvalidCredits(_)
                | Error::UnknownCourse(_)
                | Error::InsufficientCredits { .. }
        )
    }
}
