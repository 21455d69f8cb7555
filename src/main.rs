//! sqlite-bench - Cross-driver SQLite benchmark harness
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use sqlite_bench::bench::{BenchContext, Harness, ScenarioReport, Status};
use sqlite_bench::config::{BenchConfig, CliArgs};
use sqlite_bench::report::{print_header, print_summary, write_report, ProgressReporter};
use std::io;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    let config = BenchConfig::from_args(args).context("Invalid configuration")?;
    let plan = config.plan();

    if config.show_progress {
        print_header(&config.dbfile, config.driver.name(), plan.len());
    }

    let progress = config.show_progress.then(ProgressReporter::new);
    let status: &dyn Status = match &progress {
        Some(p) => p,
        None => &(),
    };

    let harness = Harness::new(BenchContext {
        dbfile: &config.dbfile,
        factory: &config.driver,
        status,
    });

    info!(
        driver = config.driver.name(),
        scenarios = plan.len(),
        dbfile = %config.dbfile.display(),
        "Starting benchmark"
    );

    let started = Instant::now();
    let mut write_error: Option<io::Error> = None;
    let result = harness.run(&plan, |report: &ScenarioReport| {
        let written = match &progress {
            Some(p) => p.suspend(|| write_report(&mut io::stdout().lock(), report)),
            None => write_report(&mut io::stdout().lock(), report),
        };
        if let Err(e) = written {
            write_error.get_or_insert(e);
        }
    });

    let reports = match result {
        Ok(reports) => reports,
        Err(e) => {
            if let Some(ref p) = progress {
                p.finish_and_clear();
            }
            return Err(e).context("Benchmark failed");
        }
    };

    if let Some(e) = write_error {
        return Err(e).context("Failed to write results");
    }

    if let Some(ref p) = progress {
        p.finish_and_clear();
        print_summary(&reports, started.elapsed());
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("sqlite_bench=debug,warn")
    } else {
        EnvFilter::new("sqlite_bench=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(verbose)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
