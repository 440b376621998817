use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::course::CourseRecord;
use super::grade::Grade;

/// Credits earned per grade letter. Pass/fail credits are tracked for
/// reporting but never contribute to the CGPA.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GradeDistribution {
    credits: BTreeMap<Grade, u32>,
}

impl GradeDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[CourseRecord]) -> Self {
        let mut dist = Self::new();
        for record in records {
            dist.add(record.grade, record.credits);
        }
        dist
    }

    pub fn add(&mut self, grade: Grade, credits: u32) {
        if credits > 0 {
            *self.credits.entry(grade).or_insert(0) += credits;
        }
    }

    pub fn credits_for(&self, grade: Grade) -> u32 {
        self.credits.get(&grade).copied().unwrap_or(0)
    }

    pub fn total_credits(&self) -> u32 {
        self.credits.values().sum()
    }

    pub fn graded_credits(&self) -> u32 {
        self.credits
            .iter()
            .filter(|(g, _)| g.counts_toward_cgpa())
            .map(|(_, c)| c)
            .sum()
    }

    /// Credit-weighted mean of grade points over graded letters.
    /// `None` when no graded credits exist, so callers can report a
    /// "no data" condition instead of dividing by zero.
    pub fn cgpa(&self) -> Option<f64> {
        let graded = self.graded_credits();
        if graded == 0 {
            return None;
        }

        let points: f64 = self
            .credits
            .iter()
            .filter_map(|(g, c)| g.points().map(|p| p * *c as f64))
            .sum();

        Some(points / graded as f64)
    }

    /// Non-empty grade buckets in scale order.
    pub fn iter(&self) -> impl Iterator<Item = (Grade, u32)> + '_ {
        Grade::ALL
            .iter()
            .filter_map(|g| self.credits.get(g).map(|c| (*g, *c)))
    }

    pub fn is_empty(&self) -> bool {
        self.credits.values().all(|c| *c == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(grade: Grade, credits: u32) -> CourseRecord {
        CourseRecord {
            code: format!("T{}", credits),
            title: format!("Course {}", grade),
            credits,
            grade,
            completed_on: None,
        }
    }

    #[test]
    fn test_cgpa_weighted_mean() {
        let records = vec![record(Grade::A, 4), record(Grade::B, 3)];
        let dist = GradeDistribution::from_records(&records);
        // (4*9 + 3*8) / 7
        let expected = 60.0 / 7.0;
        assert!((dist.cgpa().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pass_credits_do_not_move_cgpa() {
        let mut records = vec![record(Grade::A, 4), record(Grade::C, 3)];
        let before = GradeDistribution::from_records(&records).cgpa().unwrap();

        records.push(record(Grade::P, 2));
        let dist = GradeDistribution::from_records(&records);
        assert_eq!(dist.cgpa().unwrap(), before);
        // but the credits still show up in reporting totals
        assert_eq!(dist.total_credits(), 9);
        assert_eq!(dist.graded_credits(), 7);
    }

    #[test]
    fn test_cgpa_no_graded_credits() {
        let records = vec![record(Grade::P, 2), record(Grade::P, 1)];
        let dist = GradeDistribution::from_records(&records);
        assert_eq!(dist.cgpa(), None);

        let empty = GradeDistribution::new();
        assert_eq!(empty.cgpa(), None);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_iter_scale_order() {
        let records = vec![record(Grade::F, 3), record(Grade::S, 4), record(Grade::B, 3)];
        let dist = GradeDistribution::from_records(&records);
        let grades: Vec<_> = dist.iter().map(|(g, _)| g).collect();
        assert_eq!(grades, vec![Grade::S, Grade::B, Grade::F]);
    }
}
