use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cleaning::TableCleaner;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::TranscriptReport;
use crate::pdf::TableSource;
use crate::storage::Storage;

/// Wires extraction, cleaning, aggregation, and the result cache into
/// one synchronous pass over a transcript.
pub struct AnalysisPipeline {
    source: Box<dyn TableSource>,
    cleaner: TableCleaner,
    storage: Storage,
}

impl AnalysisPipeline {
    pub fn new(
        source: impl TableSource + 'static,
        storage: Storage,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source: Box::new(source),
            cleaner: TableCleaner::new(config.dates_dayfirst),
            storage,
        }
    }

    pub fn analyze(&self, path: &Path) -> Result<TranscriptReport> {
        // Step 1: Extract raw tables
        tracing::info!("Extracting tables from {} via {}", path.display(), self.source.name());
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message("Reading transcript...");
        pb.enable_steady_tick(Duration::from_millis(100));
        let tables = self.source.extract_tables(path);
        pb.finish_and_clear();
        let tables = tables?;
        tracing::info!("Extracted {} tables", tables.len());

        // Step 2: Clean into course records
        let courses = self.cleaner.clean(&tables)?;

        // Step 3: Aggregate
        let report = TranscriptReport::from_courses(storage_key(path), courses);
        match report.cgpa {
            Some(cgpa) => tracing::info!("CGPA {:.2} over {} graded credits", cgpa, report.graded_credits),
            None => tracing::warn!("No graded credits found in {}", path.display()),
        }

        // Step 4: Cache the result
        self.storage.save_report(&report)?;
        tracing::info!("Report saved to database");

        Ok(report)
    }

    pub fn cached(&self, path: &Path) -> Result<Option<TranscriptReport>> {
        self.storage.get_report(&storage_key(path))
    }
}

/// Reports are keyed by canonical path so relative and absolute
/// invocations hit the same cache entry.
fn storage_key(path: &Path) -> String {
    path.canonicalize()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pdf::RawTable;

    struct FixedSource {
        tables: Vec<RawTable>,
    }

    impl TableSource for FixedSource {
        fn extract_tables(&self, _path: &Path) -> Result<Vec<RawTable>> {
            Ok(self.tables.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn sample_tables() -> Vec<RawTable> {
        vec![RawTable {
            rows: vec![
                vec!["Course Code", "Course Title", "Credits", "Grade"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                vec!["CS101", "Intro to Programming", "4", "A"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                vec!["PE101", "Physical Education", "2", "P"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ],
        }]
    }

    #[test]
    fn test_analyze_and_cache_round_trip() {
        let pipeline = AnalysisPipeline::new(
            FixedSource {
                tables: sample_tables(),
            },
            Storage::in_memory().unwrap(),
            PipelineConfig {
                dates_dayfirst: true,
            },
        );

        let path = Path::new("transcript.pdf");
        let report = pipeline.analyze(path).unwrap();
        assert_eq!(report.courses.len(), 2);
        assert!((report.cgpa.unwrap() - 9.0).abs() < 1e-9);
        assert_eq!(report.total_credits, 6);
        assert_eq!(report.graded_credits, 4);

        let cached = pipeline.cached(path).unwrap().unwrap();
        assert_eq!(cached.courses, report.courses);
        assert_eq!(cached.cgpa, report.cgpa);
    }

    #[test]
    fn test_analyze_propagates_cleaning_errors() {
        let pipeline = AnalysisPipeline::new(
            FixedSource {
                tables: vec![RawTable {
                    rows: vec![vec!["Semester".to_string(), "Remarks".to_string()]; 2],
                }],
            },
            Storage::in_memory().unwrap(),
            PipelineConfig {
                dates_dayfirst: true,
            },
        );

        let result = pipeline.analyze(Path::new("transcript.pdf"));
        assert!(matches!(result, Err(Error::HeaderNotFound)));
    }

    #[test]
    fn test_cached_miss() {
        let pipeline = AnalysisPipeline::new(
            FixedSource {
                tables: sample_tables(),
            },
            Storage::in_memory().unwrap(),
            PipelineConfig {
                dates_dayfirst: true,
            },
        );

        assert!(pipeline.cached(Path::new("never-analyzed.pdf")).unwrap().is_none());
    }
}
