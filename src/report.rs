//! Result lines, progress spinner and run summary
//!
//! Result lines go to stdout, one per metric, as each scenario completes.
//! The header, spinner and summary go to stderr so stdout stays a plain
//! result stream.

use crate::bench::{ScenarioReport, Status};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Spinner showing what the harness is doing right now
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Run `f` with the spinner hidden so its output does not tear
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Status for ProgressReporter {
    fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }
}

/// The stdout lines for one report
///
/// Metric names are padded to the longest name in the report so the driver
/// column lines up.
pub fn result_lines(report: &ScenarioReport) -> Vec<String> {
    let width = report.metrics.iter().map(|m| m.name.len()).max().unwrap_or(0);
    report
        .metrics
        .iter()
        .map(|m| {
            format!(
                "{} - {:<width$} - {:<10} - {:>10}",
                report.scenario,
                m.name,
                report.driver,
                m.value,
                width = width
            )
        })
        .collect()
}

/// Write a report's lines to `out`
pub fn write_report<W: Write>(out: &mut W, report: &ScenarioReport) -> io::Result<()> {
    for line in result_lines(report) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Print a header at the start of the run
pub fn print_header(dbfile: &Path, driver: &str, scenarios: usize) {
    eprintln!();
    eprintln!(
        "{} {}",
        style("sqlite-bench").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Database:").bold(), dbfile.display());
    eprintln!("  {} {}", style("Driver:").bold(), driver);
    eprintln!("  {} {}", style("Scenarios:").bold(), scenarios);
    eprintln!();
}

/// Print a summary once every scenario has run
pub fn print_summary(reports: &[ScenarioReport], duration: Duration) {
    let largest = reports
        .iter()
        .filter_map(|r| r.metric("dbsize").map(|size| (r.scenario.as_str(), size)))
        .max_by_key(|&(_, size)| size);

    eprintln!();
    eprintln!("{}", style("Benchmark Complete").green().bold());
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Scenarios:").bold(), reports.len());
    eprintln!(
        "  {} {:.1}s",
        style("Duration:").bold(),
        duration.as_secs_f64()
    );
    if let Some((scenario, size)) = largest {
        eprintln!(
            "  {} {} ({})",
            style("Largest file:").bold(),
            format_size(size, BINARY),
            scenario
        );
    }
    eprintln!();
}
