use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::course::CourseRecord;
use super::distribution::GradeDistribution;
use super::grade::Grade;

/// Everything derived from one cleaned transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptReport {
    pub source_path: String,
    pub analyzed_at: DateTime<Utc>,
    pub courses: Vec<CourseRecord>,
    pub cgpa: Option<f64>,
    pub total_credits: u32,
    pub graded_credits: u32,
    pub distribution: GradeDistribution,
}

impl TranscriptReport {
    pub fn from_courses(source_path: String, courses: Vec<CourseRecord>) -> Self {
        let distribution = GradeDistribution::from_records(&courses);
        Self {
            source_path,
            analyzed_at: Utc::now(),
            cgpa: distribution.cgpa(),
            total_credits: distribution.total_credits(),
            graded_credits: distribution.graded_credits(),
            distribution,
            courses,
        }
    }

    pub fn courses_with_grade(&self, grade: Grade) -> impl Iterator<Item = &CourseRecord> {
        self.courses.iter().filter(move |c| c.grade == grade)
    }
}

/// Cumulative CGPA after one dated course was completed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub cgpa: f64,
}

/// Result of one what-if scenario. The original record set is never
/// touched; `projected_distribution` is the modified copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub label: String,
    pub changes: Vec<String>,
    pub original_cgpa: Option<f64>,
    pub projected_cgpa: Option<f64>,
    pub projected_distribution: GradeDistribution,
}

/// Full output of one run: the report plus whatever simulations and
/// history views were requested. This is what the formatters render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub report: TranscriptReport,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub simulations: Vec<SimulationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub history: Option<Vec<HistoryPoint>>,
}
