use crate::models::course::CourseRecord;
use crate::models::distribution::GradeDistribution;
use crate::models::report::HistoryPoint;

/// Credit-weighted mean of grade points over non-Pass records.
/// `None` when no graded credits exist.
pub fn cgpa(records: &[CourseRecord]) -> Option<f64> {
    GradeDistribution::from_records(records).cgpa()
}

/// Cumulative CGPA after each dated, graded course in chronological
/// order. Pass/fail and undated courses do not appear.
pub fn history(records: &[CourseRecord]) -> Vec<HistoryPoint> {
    let mut dated: Vec<&CourseRecord> = records
        .iter()
        .filter(|r| r.grade.counts_toward_cgpa() && r.completed_on.is_some())
        .collect();
    dated.sort_by_key(|r| r.completed_on);

    let mut points = 0.0;
    let mut credits = 0u32;
    let mut history = Vec::with_capacity(dated.len());

    for record in dated {
        let (date, weighted) = match (record.completed_on, record.weighted_points()) {
            (Some(date), Some(weighted)) => (date, weighted),
            _ => continue,
        };
        points += weighted;
        credits += record.credits;
        if credits > 0 {
            history.push(HistoryPoint {
                date,
                cgpa: points / credits as f64,
            });
        }
    }

    history
}
