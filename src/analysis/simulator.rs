use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::course::CourseRecord;
use crate::models::distribution::GradeDistribution;
use crate::models::grade::Grade;
use crate::models::report::{SimulationOutcome, TranscriptReport};

/// Move credits from one grade bucket to another, e.g. "what if those
/// 8 credits of B had been A". CLI form: `FROM:TO:CREDITS`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeConversion {
    pub from: Grade,
    pub to: Grade,
    pub credits: u32,
}

impl FromStr for GradeConversion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(Error::InvalidCredits(format!(
                "expected FROM:TO:CREDITS, got \"{}\"",
                s
            )));
        }
        let from = parts[0].parse()?;
        let to = parts[1].parse()?;
        let credits: u32 = parts[2]
            .trim()
            .parse()
            .map_err(|_| Error::InvalidCredits(parts[2].trim().to_string()))?;
        if credits == 0 {
            return Err(Error::InvalidCredits("credits must be positive".to_string()));
        }
        Ok(Self { from, to, credits })
    }
}

impl std::fmt::Display for GradeConversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} credits {} -> {}", self.credits, self.from, self.to)
    }
}

/// A hypothetical not-yet-taken course. CLI form: `GRADE:CREDITS`.
#[derive(Debug, Clone, PartialEq)]
pub struct FutureCourse {
    pub grade: Grade,
    pub credits: u32,
}

impl FromStr for FutureCourse {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            return Err(Error::InvalidCredits(format!(
                "expected GRADE:CREDITS, got \"{}\"",
                s
            )));
        }
        let grade = parts[0].parse()?;
        let credits: u32 = parts[1]
            .trim()
            .parse()
            .map_err(|_| Error::InvalidCredits(parts[1].trim().to_string()))?;
        if credits == 0 {
            return Err(Error::InvalidCredits("credits must be positive".to_string()));
        }
        Ok(Self { grade, credits })
    }
}

impl std::fmt::Display for FutureCourse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} credits at {}", self.credits, self.grade)
    }
}

/// Replace the grade of one existing course. CLI form: `CODE=GRADE`.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseEdit {
    pub code: String,
    pub grade: Grade,
}

impl FromStr for CourseEdit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (code, grade) = s
            .split_once('=')
            .ok_or_else(|| Error::InvalidGrade(format!("expected CODE=GRADE, got \"{}\"", s)))?;
        let code = code.trim();
        if code.is_empty() {
            return Err(Error::UnknownCourse(String::new()));
        }
        Ok(Self {
            code: code.to_string(),
            grade: grade.parse()?,
        })
    }
}

impl std::fmt::Display for CourseEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} regraded to {}", self.code, self.grade)
    }
}

/// Applies conversions to a copy of the distribution. The source
/// bucket must hold enough credits at each step.
pub fn apply_conversions(
    distribution: &GradeDistribution,
    changes: &[GradeConversion],
) -> Result<GradeDistribution> {
    let mut result = distribution.clone();
    for change in changes {
        let available = result.credits_for(change.from);
        if change.credits > available {
            return Err(Error::InsufficientCredits {
                grade: change.from,
                requested: change.credits,
                available,
            });
        }
        result = rebuild_with(&result, change.from, available - change.credits);
        result.add(change.to, change.credits);
    }
    Ok(result)
}

/// Adds hypothetical future credits to a copy of the distribution.
pub fn apply_future_courses(
    distribution: &GradeDistribution,
    additions: &[FutureCourse],
) -> GradeDistribution {
    let mut result = distribution.clone();
    for addition in additions {
        result.add(addition.grade, addition.credits);
    }
    result
}

/// Returns a modified copy of the record set with the named courses
/// regraded. The originals are left untouched.
pub fn apply_regrades(records: &[CourseRecord], edits: &[CourseEdit]) -> Result<Vec<CourseRecord>> {
    let mut result = records.to_vec();
    for edit in edits {
        let record = result
            .iter_mut()
            .find(|r| r.code.eq_ignore_ascii_case(&edit.code))
            .ok_or_else(|| Error::UnknownCourse(edit.code.clone()))?;
        record.grade = edit.grade;
    }
    Ok(result)
}

pub fn simulate_conversions(
    report: &TranscriptReport,
    changes: &[GradeConversion],
) -> Result<SimulationOutcome> {
    let projected = apply_conversions(&report.distribution, changes)?;
    Ok(SimulationOutcome {
        label: "Grade improvement".to_string(),
        changes: changes.iter().map(|c| c.to_string()).collect(),
        original_cgpa: report.cgpa,
        projected_cgpa: projected.cgpa(),
        projected_distribution: projected,
    })
}

/// Future courses stack on top of whatever distribution the caller
/// passes, so they can follow an improvement simulation.
pub fn simulate_future_courses(
    base: &GradeDistribution,
    original_cgpa: Option<f64>,
    additions: &[FutureCourse],
) -> SimulationOutcome {
    let projected = apply_future_courses(base, additions);
    SimulationOutcome {
        label: "Future courses".to_string(),
        changes: additions.iter().map(|a| a.to_string()).collect(),
        original_cgpa,
        projected_cgpa: projected.cgpa(),
        projected_distribution: projected,
    }
}

pub fn simulate_regrades(
    report: &TranscriptReport,
    edits: &[CourseEdit],
) -> Result<SimulationOutcome> {
    let regraded = apply_regrades(&report.courses, edits)?;
    let projected = GradeDistribution::from_records(&regraded);
    Ok(SimulationOutcome {
        label: "Course regrade".to_string(),
        changes: edits.iter().map(|e| e.to_string()).collect(),
        original_cgpa: report.cgpa,
        projected_cgpa: projected.cgpa(),
        projected_distribution: projected,
    })
}

fn rebuild_with(distribution: &GradeDistribution, grade: Grade, credits: u32) -> GradeDistribution {
    let mut result = GradeDistribution::new();
    for (g, c) in distribution.iter() {
        if g != grade {
            result.add(g, c);
        }
    }
    result.add(grade, credits);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, credits: u32, grade: Grade) -> CourseRecord {
        CourseRecord {
            code: code.to_string(),
            title: code.to_string(),
            credits,
            grade,
            completed_on: None,
        }
    }

    fn sample_report() -> TranscriptReport {
        TranscriptReport::from_courses(
            "transcript.pdf".to_string(),
            vec![
                record("CS101", 4, Grade::A),
                record("MA101", 3, Grade::B),
                record("PE101", 2, Grade::P),
            ],
        )
    }

    #[test]
    fn test_parse_specs() {
        let conversion: GradeConversion = "B:A:3".parse().unwrap();
        assert_eq!(conversion.from, Grade::B);
        assert_eq!(conversion.to, Grade::A);
        assert_eq!(conversion.credits, 3);

        let future: FutureCourse = "S:4".parse().unwrap();
        assert_eq!(future.grade, Grade::S);
        assert_eq!(future.credits, 4);

        let edit: CourseEdit = "cs101=S".parse().unwrap();
        assert_eq!(edit.code, "cs101");
        assert_eq!(edit.grade, Grade::S);

        assert!("B:A".parse::<GradeConversion>().is_err());
        assert!("B:A:0".parse::<GradeConversion>().is_err());
        assert!("X:4".parse::<FutureCourse>().is_err());
        assert!("CS101".parse::<CourseEdit>().is_err());
    }

    #[test]
    fn test_conversion_moves_credits() {
        let report = sample_report();
        let outcome = simulate_conversions(
            &report,
            &["B:A:3".parse().unwrap()],
        )
        .unwrap();

        assert_eq!(outcome.projected_distribution.credits_for(Grade::B), 0);
        assert_eq!(outcome.projected_distribution.credits_for(Grade::A), 7);
        // all 7 graded credits now at A
        assert!((outcome.projected_cgpa.unwrap() - 9.0).abs() < 1e-9);
        // original report untouched
        assert_eq!(report.distribution.credits_for(Grade::B), 3);
    }

    #[test]
    fn test_conversion_insufficient_credits() {
        let report = sample_report();
        let result = simulate_conversions(&report, &["B:A:5".parse().unwrap()]);
        assert!(matches!(
            result,
            Err(Error::InsufficientCredits {
                grade: Grade::B,
                requested: 5,
                available: 3,
            })
        ));
    }

    #[test]
    fn test_future_courses_extend_distribution() {
        let report = sample_report();
        let outcome = simulate_future_courses(
            &report.distribution,
            report.cgpa,
            &["S:3".parse().unwrap()],
        );

        // (4*9 + 3*8 + 3*10) / 10 = 9.0
        assert!((outcome.projected_cgpa.unwrap() - 9.0).abs() < 1e-9);
        assert_eq!(outcome.original_cgpa, report.cgpa);
    }

    #[test]
    fn test_regrade_leaves_originals_unchanged() {
        let report = sample_report();
        let outcome = simulate_regrades(&report, &["MA101=S".parse().unwrap()]).unwrap();

        // (4*9 + 3*10) / 7
        assert!((outcome.projected_cgpa.unwrap() - 66.0 / 7.0).abs() < 1e-9);
        assert_eq!(report.courses[1].grade, Grade::B);
    }

    #[test]
    fn test_regrade_unknown_course() {
        let report = sample_report();
        let result = simulate_regrades(&report, &["EE999=A".parse().unwrap()]);
        assert!(matches!(result, Err(Error::UnknownCourse(c)) if c == "EE999"));
    }

    #[test]
    fn test_regrade_to_pass_removes_from_weighting() {
        let report = sample_report();
        let outcome = simulate_regrades(&report, &["MA101=P".parse().unwrap()]).unwrap();
        // only CS101 remains graded
        assert!((outcome.projected_cgpa.unwrap() - 9.0).abs() < 1e-9);
    }
}
