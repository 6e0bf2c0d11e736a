use anyhow::{Context, Result};
use colored::*;
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;
use thirteenf::{
    ciks::{load_ciks, Cik},
    utils::progress::ProgressTracker,
    HarvestConfig, Pipeline, RunOptions, RunReport,
};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "thirteenf-cli",
    about = "Download 13F-HR holdings tables from SEC EDGAR as CSV"
)]
struct Opt {
    /// CIKs to harvest; when given, the CIK file is not read
    ciks: Vec<Cik>,

    /// CSV file with a `CIK` column
    #[structopt(long = "ciks", parse(from_os_str))]
    cik_file: Option<PathBuf>,

    /// Directory receiving one CSV per filing
    #[structopt(long = "out", parse(from_os_str))]
    output_dir: Option<PathBuf>,

    /// Number of recent feed entries requested per CIK
    #[structopt(long)]
    count: Option<usize>,

    /// Minimum delay between EDGAR requests, in milliseconds
    #[structopt(long)]
    interval_ms: Option<u64>,

    /// Stop at the first failed filing
    #[structopt(long)]
    fail_fast: bool,

    /// Write a JSON run report to this path
    #[structopt(long, parse(from_os_str))]
    report: Option<PathBuf>,
}

impl Opt {
    fn apply(&self, config: &mut HarvestConfig) {
        if let Some(path) = &self.cik_file {
            config.cik_file = path.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(count) = self.count {
            config.feed_count = count;
        }
        if let Some(ms) = self.interval_ms {
            config.request_interval = Duration::from_millis(ms);
        }
    }
}

fn print_summary(report: &RunReport) {
    for result in report.succeeded() {
        let path = result
            .output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        println!("{} {} {}", "✓".green(), result.cik, path.dimmed());
    }
    for result in report.failed() {
        println!(
            "{} {} {} [{}] {}",
            "✗".red(),
            result.cik,
            result.accession_number.as_deref().unwrap_or("-"),
            result.error_category.as_deref().unwrap_or("unknown").yellow(),
            result.error.as_deref().unwrap_or_default()
        );
    }
    println!(
        "\n{} filing(s) written, {} failed",
        report.succeeded().count().to_string().green(),
        report.failed().count().to_string().red()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut config = HarvestConfig::from_env()?;
    opt.apply(&mut config);
    log::debug!("Configuration: {:?}", config);

    let ciks = if opt.ciks.is_empty() {
        load_ciks(&config.cik_file)?
    } else {
        opt.ciks.clone()
    };

    let pipeline = Pipeline::from_config(config)
        .with_options(RunOptions {
            fail_fast: opt.fail_fast,
        })
        .with_progress(ProgressTracker::new(ciks.len() as u64));

    let report = pipeline.run(&ciks).await;
    print_summary(&report);

    if let Some(path) = &opt.report {
        report
            .save(path)
            .with_context(|| format!("Failed to save run report to {}", path.display()))?;
    }

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
