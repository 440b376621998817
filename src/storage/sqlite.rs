use rusqlite::{params, Connection};
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::{CourseRecord, GradeDistribution, TranscriptReport};

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    fn init_db(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS transcripts (
                id INTEGER PRIMARY KEY,
                source_path TEXT UNIQUE NOT NULL,
                analyzed_at TEXT NOT NULL,
                cgpa REAL,
                total_credits INTEGER NOT NULL,
                graded_credits INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS courses (
                id INTEGER PRIMARY KEY,
                transcript_id INTEGER NOT NULL REFERENCES transcripts(id),
                code TEXT NOT NULL,
                title TEXT NOT NULL,
                credits INTEGER NOT NULL,
                grade TEXT NOT NULL,
                completed_on TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_courses_transcript_id ON courses(transcript_id);
            "#,
        )?;

        Ok(())
    }

    pub fn save_report(&self, report: &TranscriptReport) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO transcripts (source_path, analyzed_at, cgpa, total_credits, graded_credits)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(source_path) DO UPDATE SET
                analyzed_at = excluded.analyzed_at,
                cgpa = excluded.cgpa,
                total_credits = excluded.total_credits,
                graded_credits = excluded.graded_credits
            "#,
            params![
                report.source_path,
                report.analyzed_at.to_rfc3339(),
                report.cgpa,
                report.total_credits,
                report.graded_credits,
            ],
        )?;

        let transcript_id: i64 = self.conn.query_row(
            "SELECT id FROM transcripts WHERE source_path = ?1",
            params![report.source_path],
            |row| row.get(0),
        )?;

        // Re-analysis replaces the course rows wholesale.
        self.conn.execute(
            "DELETE FROM courses WHERE transcript_id = ?1",
            params![transcript_id],
        )?;

        for course in &report.courses {
            self.conn.execute(
                r#"
                INSERT INTO courses (transcript_id, code, title, credits, grade, completed_on)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    transcript_id,
                    course.code,
                    course.title,
                    course.credits,
                    course.grade.to_string(),
                    course.completed_on.map(|d| d.to_string()),
                ],
            )?;
        }

        Ok(())
    }

    pub fn get_report(&self, source_path: &str) -> Result<Option<TranscriptReport>> {
        let result = self.conn.query_row(
            r#"
            SELECT id, analyzed_at
            FROM transcripts
            WHERE source_path = ?1
            "#,
            params![source_path],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                ))
            },
        );

        match result {
            Ok((transcript_id, analyzed_at_str)) => {
                let courses = self.get_courses(transcript_id)?;
                let distribution = GradeDistribution::from_records(&courses);

                let analyzed_at = chrono::DateTime::parse_from_rfc3339(&analyzed_at_str)
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .unwrap_or_else(|_| chrono::Utc::now());

                Ok(Some(TranscriptReport {
                    source_path: source_path.to_string(),
                    analyzed_at,
                    cgpa: distribution.cgpa(),
                    total_credits: distribution.total_credits(),
                    graded_credits: distribution.graded_credits(),
                    distribution,
                    courses,
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_courses(&self, transcript_id: i64) -> Result<Vec<CourseRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT code, title, credits, grade, completed_on
            FROM courses
            WHERE transcript_id = ?1
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map(params![transcript_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut courses = Vec::new();
        for row in rows {
            let (code, title, credits, grade_str, completed_on) = row?;
            let grade = grade_str
                .parse()
                .map_err(|_| Error::InvalidGrade(grade_str.clone()))?;
            courses.push(CourseRecord {
                code,
                title,
                credits,
                grade,
                completed_on: completed_on
                    .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            });
        }

        Ok(courses)
    }

    pub fn list_transcripts(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_path FROM transcripts ORDER BY analyzed_at DESC",
        )?;

        let paths = stmt.query_map([], |row| row.get(0))?;
        paths
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grade;

    fn sample_report(path: &str, grades: &[(u32, Grade)]) -> TranscriptReport {
        let courses = grades
            .iter()
            .enumerate()
            .map(|(i, (credits, grade))| CourseRecord {
                code: format!("CS10{}", i),
                title: format!("Course {}", i),
                credits: *credits,
                grade: *grade,
                completed_on: NaiveDate::from_ymd_opt(2023, 5, 15),
            })
            .collect();
        TranscriptReport::from_courses(path.to_string(), courses)
    }

    #[test]
    fn test_save_and_get_round_trip() {
        let storage = Storage::in_memory().unwrap();
        let report = sample_report("/tmp/t.pdf", &[(4, Grade::A), (2, Grade::P)]);

        storage.save_report(&report).unwrap();
        let loaded = storage.get_report("/tmp/t.pdf").unwrap().unwrap();

        assert_eq!(loaded.courses, report.courses);
        assert_eq!(loaded.cgpa, report.cgpa);
        assert_eq!(loaded.total_credits, 6);
        assert_eq!(loaded.graded_credits, 4);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let storage = Storage::in_memory().unwrap();
        assert!(storage.get_report("/tmp/none.pdf").unwrap().is_none());
    }

    #[test]
    fn test_reanalysis_replaces_courses() {
        let storage = Storage::in_memory().unwrap();
        storage
            .save_report(&sample_report("/tmp/t.pdf", &[(4, Grade::B), (3, Grade::C)]))
            .unwrap();
        storage
            .save_report(&sample_report("/tmp/t.pdf", &[(4, Grade::A)]))
            .unwrap();

        let loaded = storage.get_report("/tmp/t.pdf").unwrap().unwrap();
        assert_eq!(loaded.courses.len(), 1);
        assert_eq!(loaded.courses[0].grade, Grade::A);
    }

    #[test]
    fn test_list_transcripts() {
        let storage = Storage::in_memory().unwrap();
        storage
            .save_report(&sample_report("/tmp/a.pdf", &[(4, Grade::A)]))
            .unwrap();
        storage
            .save_report(&sample_report("/tmp/b.pdf", &[(3, Grade::B)]))
            .unwrap();

        let paths = storage.list_transcripts().unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&"/tmp/a.pdf".to_string()));
    }
}
