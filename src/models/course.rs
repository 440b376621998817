use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::grade::Grade;

/// One row of the cleaned grade history. Immutable once cleaning
/// produced it; simulations always work on copies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseRecord {
    pub code: String,
    pub title: String,
    pub credits: u32,
    pub grade: Grade,
    pub completed_on: Option<NaiveDate>,
}

impl CourseRecord {
    /// Credit-weighted grade points, `None` for pass/fail courses.
    pub fn weighted_points(&self) -> Option<f64> {
        self.grade.points().map(|p| p * self.credits as f64)
    }
}

/// Title key used for retake detection: lowercase, alphanumeric only.
/// "Data Structures & Algorithms" and "DATA STRUCTURES ALGORITHMS"
/// collapse to the same key.
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
