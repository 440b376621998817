use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gpanalyzer::analysis::cgpa;
use gpanalyzer::analysis::simulator::{
    self, CourseEdit, FutureCourse, GradeConversion,
};
use gpanalyzer::models::{AnalysisOutput, Grade, SimulationOutcome, TranscriptReport};
use gpanalyzer::{AnalysisPipeline, Config, PdfTableSource, PipelineConfig, Storage};

#[derive(Parser, Debug)]
#[command(name = "gpanalyzer")]
#[command(version = "0.1.0")]
#[command(about = "Compute CGPA from a transcript PDF and simulate grade changes")]
struct Args {
    /// Path to the transcript PDF
    transcript: PathBuf,

    /// Output format (json, text, markdown)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Database path for caching results (defaults to GPANALYZER_DB)
    #[arg(long)]
    database: Option<String>,

    /// Use cached analysis if available
    #[arg(long)]
    cached: bool,

    /// Include the cumulative CGPA history
    #[arg(long)]
    history: bool,

    /// Simulate moving credits between grades, e.g. B:A:6
    #[arg(long, value_name = "FROM:TO:CREDITS")]
    convert: Vec<String>,

    /// Simulate future courses, e.g. S:4
    #[arg(long, value_name = "GRADE:CREDITS")]
    future: Vec<String>,

    /// Simulate regrading one course, e.g. CS101=A
    #[arg(long, value_name = "CODE=GRADE")]
    regrade: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("gpanalyzer=info".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Parse simulation specs up front so bad input fails before any
    // PDF work happens.
    let conversions: Vec<GradeConversion> = parse_specs(&args.convert)?;
    let futures: Vec<FutureCourse> = parse_specs(&args.future)?;
    let regrades: Vec<CourseEdit> = parse_specs(&args.regrade)?;

    // Initialize storage and pipeline
    let database = args.database.as_deref().unwrap_or(&config.database_path);
    let storage = Storage::new(database)?;
    let pipeline = AnalysisPipeline::new(
        PdfTableSource::new(),
        storage,
        PipelineConfig::from(&config),
    );

    // Check for a cached report if requested
    let report = if args.cached {
        match pipeline.cached(&args.transcript)? {
            Some(report) => {
                tracing::info!("Using cached analysis from {}", report.analyzed_at);
                report
            }
            None => {
                tracing::info!("No cached analysis found, parsing the transcript");
                pipeline.analyze(&args.transcript)?
            }
        }
    } else {
        pipeline.analyze(&args.transcript)?
    };

    // Run requested simulations against copies of the extracted data
    let simulations = run_simulations(&report, &conversions, &futures, &regrades)?;

    let history = if args.history {
        let points = cgpa::history(&report.courses);
        if points.is_empty() {
            tracing::warn!("No dated graded courses, history is empty");
        }
        Some(points)
    } else {
        None
    };

    let output = AnalysisOutput {
        report,
        simulations,
        history,
    };

    write_output(&output, &args)?;

    Ok(())
}

fn parse_specs<T: std::str::FromStr<Err = gpanalyzer::Error>>(
    specs: &[String],
) -> Result<Vec<T>, gpanalyzer::Error> {
    specs.iter().map(|s| s.parse()).collect()
}

fn run_simulations(
    report: &TranscriptReport,
    conversions: &[GradeConversion],
    futures: &[FutureCourse],
    regrades: &[CourseEdit],
) -> Result<Vec<SimulationOutcome>, gpanalyzer::Error> {
    let mut simulations = Vec::new();

    let mut base_distribution = report.distribution.clone();
    if !conversions.is_empty() {
        let outcome = simulator::simulate_conversions(report, conversions)?;
        base_distribution = outcome.projected_distribution.clone();
        simulations.push(outcome);
    }

    // Future courses stack on top of the improved distribution when
    // both simulations are requested.
    if !futures.is_empty() {
        simulations.push(simulator::simulate_future_courses(
            &base_distribution,
            report.cgpa,
            futures,
        ));
    }

    if !regrades.is_empty() {
        simulations.push(simulator::simulate_regrades(report, regrades)?);
    }

    Ok(simulations)
}

fn write_output(output: &AnalysisOutput, args: &Args) -> anyhow::Result<()> {
    let rendered = match args.format.as_str() {
        "json" => serde_json::to_string_pretty(output)?,
        "markdown" => format_markdown(output),
        _ => format_text(output),
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &rendered)?;
        tracing::info!("Output written to: {}", path);
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn fmt_cgpa(cgpa: Option<f64>) -> String {
    match cgpa {
        Some(value) => format!("{:.2}", value),
        None => "n/a (no graded credits)".to_string(),
    }
}

fn format_text(output: &AnalysisOutput) -> String {
    let report = &output.report;
    let mut text = String::new();

    text.push_str(&format!(
        "\n=== Transcript Analysis: {} ===\n\n",
        report.source_path
    ));
    text.push_str(&format!("Courses: {}\n", report.courses.len()));
    text.push_str(&format!(
        "Credits: {} total, {} graded\n",
        report.total_credits, report.graded_credits
    ));
    text.push_str(&format!("CGPA: {}\n", fmt_cgpa(report.cgpa)));

    // Grade distribution with a bar per grade
    if !report.distribution.is_empty() {
        text.push_str("\nGrade Distribution (credits):\n");
        let max_credits = report
            .distribution
            .iter()
            .map(|(_, c)| c)
            .max()
            .unwrap_or(1);
        for (grade, credits) in report.distribution.iter() {
            let bar_length = (credits as usize * 30) / max_credits.max(1) as usize;
            let percent = credits as f64 / report.total_credits as f64 * 100.0;
            text.push_str(&format!(
                "  {}  {:<30}  {:>3} ({:.1}%)\n",
                grade,
                "#".repeat(bar_length),
                credits,
                percent
            ));
        }
    }

    // Courses grouped by grade, best first
    for grade in Grade::ALL {
        let courses: Vec<_> = report.courses_with_grade(grade).collect();
        if courses.is_empty() {
            continue;
        }
        text.push_str(&format!("\n{} Grade Courses:\n", grade));
        for course in courses {
            text.push_str(&format!(
                "  - {}  {} ({} credits)\n",
                course.code, course.title, course.credits
            ));
        }
    }

    if let Some(ref history) = output.history {
        if !history.is_empty() {
            text.push_str("\nCumulative CGPA:\n");
            for point in history {
                text.push_str(&format!("  {}  {:.2}\n", point.date, point.cgpa));
            }
        }
    }

    for simulation in &output.simulations {
        text.push_str(&format!("\n=== {} ===\n", simulation.label));
        text.push_str("Changes:\n");
        for change in &simulation.changes {
            text.push_str(&format!("  - {}\n", change));
        }
        text.push_str(&format!(
            "Original CGPA: {}\n",
            fmt_cgpa(simulation.original_cgpa)
        ));
        text.push_str(&format!(
            "Projected CGPA: {}\n",
            fmt_cgpa(simulation.projected_cgpa)
        ));
    }

    text.push_str(&format!(
        "\nAnalyzed on: {}\n",
        report.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    text
}

fn format_markdown(output: &AnalysisOutput) -> String {
    let report = &output.report;
    let mut text = String::new();

    text.push_str(&format!("# Transcript Analysis: {}\n\n", report.source_path));

    text.push_str("## Summary\n\n");
    text.push_str("| Metric | Value |\n|--------|-------|\n");
    text.push_str(&format!("| Courses | {} |\n", report.courses.len()));
    text.push_str(&format!("| Total Credits | {} |\n", report.total_credits));
    text.push_str(&format!("| Graded Credits | {} |\n", report.graded_credits));
    text.push_str(&format!("| CGPA | {} |\n", fmt_cgpa(report.cgpa)));

    if !report.distribution.is_empty() {
        text.push_str("\n## Grade Distribution\n\n");
        text.push_str("| Grade | Credits | Share |\n|-------|---------|-------|\n");
        for (grade, credits) in report.distribution.iter() {
            let percent = credits as f64 / report.total_credits as f64 * 100.0;
            text.push_str(&format!("| {} | {} | {:.1}% |\n", grade, credits, percent));
        }
    }

    text.push_str("\n## Courses\n\n");
    text.push_str("| Code | Title | Credits | Grade | Completed |\n");
    text.push_str("|------|-------|---------|-------|----------|\n");
    for course in &report.courses {
        let completed = course
            .completed_on
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        text.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            course.code, course.title, course.credits, course.grade, completed
        ));
    }

    if let Some(ref history) = output.history {
        if !history.is_empty() {
            text.push_str("\n## Cumulative CGPA\n\n");
            text.push_str("| Date | CGPA |\n|------|------|\n");
            for point in history {
                text.push_str(&format!("| {} | {:.2} |\n", point.date, point.cgpa));
            }
        }
    }

    for simulation in &output.simulations {
        text.push_str(&format!("\n## {}\n\n", simulation.label));
        for change in &simulation.changes {
            text.push_str(&format!("- {}\n", change));
        }
        text.push_str(&format!(
            "\nOriginal CGPA: **{}** — Projected CGPA: **{}**\n",
            fmt_cgpa(simulation.original_cgpa),
            fmt_cgpa(simulation.projected_cgpa)
        ));
    }

    text.push_str(&format!(
        "\n---\n*Analyzed on {}*\n",
        report.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpanalyzer::models::CourseRecord;

    fn sample_output() -> AnalysisOutput {
        let report = TranscriptReport::from_courses(
            "transcript.pdf".to_string(),
            vec![
                CourseRecord {
                    code: "CS101".to_string(),
                    title: "Intro to Programming".to_string(),
                    credits: 4,
                    grade: Grade::A,
                    completed_on: None,
                },
                CourseRecord {
                    code: "PE101".to_string(),
                    title: "Physical Education".to_string(),
                    credits: 2,
                    grade: Grade::P,
                    completed_on: None,
                },
            ],
        );
        AnalysisOutput {
            report,
            simulations: Vec::new(),
            history: None,
        }
    }

    #[test]
    fn test_format_text_includes_summary() {
        let text = format_text(&sample_output());
        assert!(text.contains("CGPA: 9.00"));
        assert!(text.contains("Credits: 6 total, 4 graded"));
        assert!(text.contains("A Grade Courses:"));
        assert!(text.contains("P Grade Courses:"));
    }

    #[test]
    fn test_format_text_no_graded_credits() {
        let mut output = sample_output();
        output.report = TranscriptReport::from_courses(
            "transcript.pdf".to_string(),
            vec![CourseRecord {
                code: "PE101".to_string(),
                title: "Physical Education".to_string(),
                credits: 2,
                grade: Grade::P,
                completed_on: None,
            }],
        );
        let text = format_text(&output);
        assert!(text.contains("CGPA: n/a (no graded credits)"));
    }

    #[test]
    fn test_format_markdown_tables() {
        let markdown = format_markdown(&sample_output());
        assert!(markdown.contains("| CGPA | 9.00 |"));
        assert!(markdown.contains("| CS101 | Intro to Programming | 4 | A | - |"));
    }
}
