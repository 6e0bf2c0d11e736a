use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::path::PathBuf;

use crate::edgar::{FilingLinkSet, HoldingRecord, HoldingsTable};
use crate::utils::dirs::ensure_dir;

/// Destination for extracted holdings tables.
pub trait HoldingsWriter {
    /// Persists one filing's table and returns where it was written.
    fn write(&self, links: &FilingLinkSet, table: &HoldingsTable) -> Result<PathBuf>;
}

/// Writes one `{filer}_{period}_13F_HR.csv` file per filing.
pub struct CsvHoldingsWriter {
    output_dir: PathBuf,
}

impl CsvHoldingsWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path_for(&self, links: &FilingLinkSet) -> PathBuf {
        self.output_dir.join(file_name(&links.name, &links.period))
    }
}

pub fn file_name(filer_name: &str, period: &str) -> String {
    let stem = format!("{}_{}_13F_HR", filer_name, period);
    format!("{}.csv", stem.replace(['/', '\\'], "_"))
}

impl HoldingsWriter for CsvHoldingsWriter {
    fn write(&self, links: &FilingLinkSet, table: &HoldingsTable) -> Result<PathBuf> {
        ensure_dir(&self.output_dir)?;
        let path = self.path_for(links);

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        writer.write_record(HoldingRecord::FIELD_NAMES)?;
        for record in table {
            writer.serialize(record)?;
        }
        writer.flush()?;

        log::info!("Saved {} holding(s) to {}", table.len(), path.display());
        Ok(path)
    }
}
