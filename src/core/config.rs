use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::ciks::Cik;
use crate::edgar::{DEFAULT_FEED_COUNT, EDGAR_FEED_URL, EDGAR_ORIGIN, USER_AGENT};

/// Immutable settings for one harvesting run.
#[derive(Clone, Debug, PartialEq)]
pub struct HarvestConfig {
    pub user_agent: String,
    /// Feed URL with `{cik}` and `{count}` placeholders.
    pub feed_url_template: String,
    /// Prefix for the relative document links found on filing index pages.
    pub origin: String,
    pub feed_count: usize,
    pub request_interval: Duration,
    pub cik_file: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            feed_url_template: EDGAR_FEED_URL.to_string(),
            origin: EDGAR_ORIGIN.to_string(),
            feed_count: DEFAULT_FEED_COUNT,
            request_interval: Duration::from_secs(1),
            cik_file: PathBuf::from("ciks.csv"),
            output_dir: PathBuf::from("out"),
        }
    }
}

impl HarvestConfig {
    /// Reads overrides from the environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let user_agent = lookup("USER_AGENT")
            .or_else(|| lookup("USERAGENT"))
            .unwrap_or(defaults.user_agent);

        let feed_count = match lookup("EDGAR_FEED_COUNT") {
            Some(raw) => parse_var("EDGAR_FEED_COUNT", &raw)?,
            None => defaults.feed_count,
        };

        let request_interval = match lookup("EDGAR_REQUEST_INTERVAL_MS") {
            Some(raw) => Duration::from_millis(parse_var("EDGAR_REQUEST_INTERVAL_MS", &raw)?),
            None => defaults.request_interval,
        };

        let cik_file = lookup("THIRTEENF_CIK_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.cik_file);

        let output_dir = lookup("THIRTEENF_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        Ok(Self {
            user_agent,
            feed_count,
            request_interval,
            cik_file,
            output_dir,
            ..defaults
        })
    }

    pub fn feed_url(&self, cik: Cik) -> String {
        self.feed_url_template
            .replace("{cik}", &cik.to_string())
            .replace("{count}", &self.feed_count.to_string())
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| anyhow!("{} must be a non-negative integer, got {:?}", key, raw))
}
