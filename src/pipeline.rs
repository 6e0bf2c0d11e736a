use log::{error, info, warn};
use reqwest::Client;
use std::sync::Arc;

use crate::ciks::Cik;
use crate::core::config::HarvestConfig;
use crate::edgar::{
    extract_holdings, resolve_feed, resolve_links, EdgarError, Fetch, FilingFeedEntry,
    FilingLinkSet, HoldingsTable, HttpFetcher, RateLimiter,
};
use crate::output::{CsvHoldingsWriter, HoldingsWriter};
use crate::report::{FetchStatus, FilingResult, RunReport};
use crate::utils::progress::ProgressTracker;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop at the first failed identifier or filing instead of continuing.
    pub fail_fast: bool,
}

/// Drives feed, link and holdings resolution for each identifier in turn.
pub struct Pipeline {
    config: HarvestConfig,
    fetcher: Box<dyn Fetch>,
    writer: Box<dyn HoldingsWriter>,
    options: RunOptions,
    progress: Option<ProgressTracker>,
}

impl Pipeline {
    pub fn new(config: HarvestConfig, fetcher: Box<dyn Fetch>, writer: Box<dyn HoldingsWriter>) -> Self {
        Self {
            config,
            fetcher,
            writer,
            options: RunOptions::default(),
            progress: None,
        }
    }

    /// Paced HTTP fetcher and CSV output, both taken from `config`.
    pub fn from_config(config: HarvestConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.request_interval));
        let fetcher = HttpFetcher::new(Client::new(), &config.user_agent, rate_limiter);
        let writer = CsvHoldingsWriter::new(&config.output_dir);
        Self::new(config, Box::new(fetcher), Box::new(writer))
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, progress: ProgressTracker) -> Self {
        self.progress = Some(progress);
        self
    }

    pub async fn run(&self, ciks: &[Cik]) -> RunReport {
        let mut report = RunReport::new();
        info!("Harvesting 13F-HR filings for {} CIK(s)", ciks.len());

        for &cik in ciks {
            if let Some(progress) = &self.progress {
                progress.update_message(&format!("CIK {}", cik));
            }

            let aborted = self.run_identifier(cik, &mut report).await;

            if let Some(progress) = &self.progress {
                progress.increment(1);
            }
            if aborted {
                warn!("Stopping run after failure for CIK {} (fail-fast)", cik);
                break;
            }
        }

        report.finish();
        if let Some(progress) = &self.progress {
            progress.finish("done");
        }
        info!(
            "Run finished: {} filing(s) written, {} failure(s)",
            report.succeeded().count(),
            report.failed().count()
        );
        report
    }

    /// Processes every 13F-HR filing of one identifier; returns true when the run should stop.
    async fn run_identifier(&self, cik: Cik, report: &mut RunReport) -> bool {
        let entries = match resolve_feed(self.fetcher.as_ref(), &self.config, cik).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("CIK {}: failed to resolve filing feed: {}", cik, e);
                report.push(FilingResult::from_edgar_error(cik, None, &e));
                return self.options.fail_fast;
            }
        };

        for entry in &entries {
            let result = self.process_filing(cik, entry).await;
            if let Some(path) = &result.output_path {
                if report.wrote(path) {
                    warn!(
                        "CIK {} filing {}: {} was already written in this run and has been replaced",
                        cik,
                        entry.accession_number,
                        path.display()
                    );
                }
            }
            let failed = result.status == FetchStatus::Failed;
            report.push(result);
            if failed && self.options.fail_fast {
                return true;
            }
        }
        false
    }

    async fn process_filing(&self, cik: Cik, entry: &FilingFeedEntry) -> FilingResult {
        let accession = entry.accession_number.as_str();

        let (links, table) = match self.harvest_filing(entry).await {
            Ok(harvested) => harvested,
            Err(e) => {
                error!("CIK {} filing {}: {}", cik, accession, e);
                return FilingResult::from_edgar_error(cik, Some(accession), &e);
            }
        };

        match self.writer.write(&links, &table) {
            Ok(path) => {
                if let Some(progress) = &self.progress {
                    progress.println(&format!("Saved {}", path.display()));
                }
                FilingResult::success(cik, accession, path, table.len())
            }
            Err(e) => {
                error!("CIK {} filing {}: failed to write holdings: {:#}", cik, accession, e);
                FilingResult::failure(cik, Some(accession), "output", format!("{:#}", e))
            }
        }
    }

    async fn harvest_filing(
        &self,
        entry: &FilingFeedEntry,
    ) -> Result<(FilingLinkSet, HoldingsTable), EdgarError> {
        let links = resolve_links(self.fetcher.as_ref(), &self.config.origin, entry).await?;
        let table = extract_holdings(self.fetcher.as_ref(), &links.holdings_doc_url).await?;
        Ok((links, table))
    }
}
