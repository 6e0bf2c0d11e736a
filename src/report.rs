use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ciks::Cik;
use crate::edgar::EdgarError;
use crate::utils::dirs::ensure_parent_dir;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchStatus {
    Success,
    Failed,
}

/// Outcome of one filing, or of an identifier whose feed could not be resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilingResult {
    pub cik: Cik,
    /// `None` when the failure happened before any filing was identified.
    pub accession_number: Option<String>,
    pub status: FetchStatus,
    pub output_path: Option<PathBuf>,
    pub rows: Option<usize>,
    pub error_category: Option<String>,
    pub error: Option<String>,
}

impl FilingResult {
    pub fn success(cik: Cik, accession_number: &str, output_path: PathBuf, rows: usize) -> Self {
        Self {
            cik,
            accession_number: Some(accession_number.to_string()),
            status: FetchStatus::Success,
            output_path: Some(output_path),
            rows: Some(rows),
            error_category: None,
            error: None,
        }
    }

    pub fn failure(cik: Cik, accession_number: Option<&str>, category: &str, error: String) -> Self {
        Self {
            cik,
            accession_number: accession_number.map(str::to_string),
            status: FetchStatus::Failed,
            output_path: None,
            rows: None,
            error_category: Some(category.to_string()),
            error: Some(error),
        }
    }

    pub fn from_edgar_error(cik: Cik, accession_number: Option<&str>, error: &EdgarError) -> Self {
        Self::failure(cik, accession_number, error.category(), error.to_string())
    }
}

/// Manifest of a harvesting run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub results: Vec<FilingResult>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: FilingResult) {
        self.results.push(result);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &FilingResult> {
        self.results
            .iter()
            .filter(|r| r.status == FetchStatus::Success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &FilingResult> {
        self.results
            .iter()
            .filter(|r| r.status == FetchStatus::Failed)
    }

    /// Whether an earlier successful filing of this run was written to `path`.
    pub fn wrote(&self, path: &Path) -> bool {
        self.succeeded()
            .any(|r| r.output_path.as_deref() == Some(path))
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run report {}", path.display()))?;
        log::info!("Saved run report to {}", path.display());
        Ok(())
    }
}
