use std::collections::{HashMap, HashSet};

use crate::cleaning::dates::parse_date;
use crate::error::{Error, Result};
use crate::models::course::{normalize_title, CourseRecord};
use crate::models::grade::Grade;
use crate::pdf::table::RawTable;

const COL_CODE: &str = "Course Code";
const COL_TITLE: &str = "Course Title";
const COL_CREDITS: &str = "Credits";
const COL_GRADE: &str = "Grade";
const COL_DATES: &[&str] = &["Date", "Result Declared On"];

/// Positions of the columns we keep, resolved from the header row.
#[derive(Debug, Clone)]
struct ColumnMap {
    code: usize,
    title: usize,
    credits: usize,
    grade: usize,
    date: Option<usize>,
}

/// Turns raw extracted tables into clean course records: finds the
/// header row, keeps the known columns, drops malformed rows, and
/// deduplicates retakes keeping the most recent attempt.
pub struct TableCleaner {
    dayfirst: bool,
}

impl TableCleaner {
    pub fn new(dayfirst: bool) -> Self {
        Self { dayfirst }
    }

    pub fn clean(&self, tables: &[RawTable]) -> Result<Vec<CourseRecord>> {
        // Multi-page transcripts split one logical table across pages,
        // so all extracted rows are processed as a single sequence.
        let rows: Vec<&Vec<String>> = tables.iter().flat_map(|t| t.rows.iter()).collect();

        let header_index = rows
            .iter()
            .position(|row| Self::is_header(row))
            .ok_or(Error::HeaderNotFound)?;

        let columns = Self::resolve_columns(rows[header_index])?;

        let mut records = Vec::new();
        for row in rows.iter().skip(header_index + 1) {
            // Page breaks repeat the header row.
            if Self::is_header(row) {
                continue;
            }
            if let Some(record) = self.parse_row(row, &columns) {
                records.push(record);
            }
        }

        let records = Self::dedup_retakes(records);
        if records.is_empty() {
            return Err(Error::NoCourseRows);
        }

        tracing::info!("Cleaned {} course records", records.len());
        Ok(records)
    }

    fn is_header(row: &[String]) -> bool {
        let has = |name: &str| row.iter().any(|c| c.trim().eq_ignore_ascii_case(name));
        has(COL_CODE) && has(COL_GRADE)
    }

    fn resolve_columns(header: &[String]) -> Result<ColumnMap> {
        let find = |name: &str| {
            header
                .iter()
                .position(|c| c.trim().eq_ignore_ascii_case(name))
        };

        let code = find(COL_CODE).ok_or_else(|| Error::MissingColumn(COL_CODE.to_string()))?;
        let title = find(COL_TITLE).ok_or_else(|| Error::MissingColumn(COL_TITLE.to_string()))?;
        let credits =
            find(COL_CREDITS).ok_or_else(|| Error::MissingColumn(COL_CREDITS.to_string()))?;
        let grade = find(COL_GRADE).ok_or_else(|| Error::MissingColumn(COL_GRADE.to_string()))?;
        let date = COL_DATES.iter().find_map(|name| find(name));

        Ok(ColumnMap {
            code,
            title,
            credits,
            grade,
            date,
        })
    }

    /// One cleaned record per well-formed row. Rows with missing
    /// cells, non-numeric credits, off-scale grades, or (in a dated
    /// transcript) unparseable dates are dropped, matching how a
    /// person would skim past subtotal and remark lines.
    fn parse_row(&self, row: &[String], columns: &ColumnMap) -> Option<CourseRecord> {
        let cell = |i: usize| row.get(i).map(|c| c.trim()).filter(|c| !c.is_empty());

        let code = cell(columns.code)?;
        let title = cell(columns.title)?;
        let credits_raw = cell(columns.credits)?;
        let grade_raw = cell(columns.grade)?;

        let credits_value: f64 = credits_raw.parse().ok()?;
        if !credits_value.is_finite() || credits_value <= 0.0 {
            return None;
        }
        let credits = credits_value.round() as u32;
        if credits == 0 {
            return None;
        }

        let grade: Grade = grade_raw.parse().ok()?;

        let completed_on = match columns.date {
            Some(i) => Some(parse_date(cell(i)?, self.dayfirst)?),
            None => None,
        };

        Some(CourseRecord {
            code: code.to_string(),
            title: title.to_string(),
            credits,
            grade,
            completed_on,
        })
    }

    /// A retaken course appears once per attempt under the same title
    /// (modulo punctuation and case). Only the most recent attempt
    /// counts; without dates, the later row wins.
    fn dedup_retakes(records: Vec<CourseRecord>) -> Vec<CourseRecord> {
        let mut best: HashMap<String, usize> = HashMap::new();

        for (i, record) in records.iter().enumerate() {
            let key = normalize_title(&record.title);
            match best.get(&key) {
                Some(&j) => {
                    if (record.completed_on, i) > (records[j].completed_on, j) {
                        best.insert(key, i);
                    }
                }
                None => {
                    best.insert(key, i);
                }
            }
        }

        let keep: HashSet<usize> = best.into_values().collect();
        records
            .into_iter()
            .enumerate()
            .filter(|(i, _)| keep.contains(i))
            .map(|(_, r)| r)
            .collect()
    }
}
