use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Central Index Key assigned to a filer by the SEC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cik(pub u64);

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cik {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Cik)
            .map_err(|_| anyhow!("CIK must be a non-negative integer: {:?}", s))
    }
}

#[derive(Debug, Deserialize)]
struct CikRow {
    #[serde(rename = "CIK")]
    cik: u64,
}

/// Loads identifiers from the `CIK` column of a CSV file, keeping file order.
pub fn load_ciks(path: &Path) -> Result<Vec<Cik>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CIK file {}", path.display()))?;
    let ciks = read_ciks(file).with_context(|| format!("Failed to read {}", path.display()))?;
    log::info!("Loaded {} CIK(s) from {}", ciks.len(), path.display());
    Ok(ciks)
}

pub fn read_ciks<R: Read>(reader: R) -> Result<Vec<Cik>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    reader
        .deserialize::<CikRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map(|r| Cik(r.cik))
                .with_context(|| format!("Invalid CIK on data row {}", i + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_reads_cik_column_in_order() {
        let csv = "Name,CIK\nBerkshire Hathaway,1067983\nBridgewater, 1350694\nBerkshire Hathaway,1067983\n";
        let ciks = read_ciks(csv.as_bytes()).unwrap();
        assert_eq!(ciks, vec![Cik(1067983), Cik(1350694), Cik(1067983)]);
    }

    #[test]
    fn test_non_integer_cik_is_rejected() {
        let err = read_ciks("CIK\n1067983\nabc\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_missing_column_is_rejected() {
        assert!(read_ciks("cik_number\n1\n".as_bytes()).is_err());
    }

    #[test]
    fn test_load_ciks_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ciks.csv");
        fs::write(&path, "CIK\n102909\n").unwrap();
        assert_eq!(load_ciks(&path).unwrap(), vec![Cik(102909)]);
        assert!(load_ciks(&dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn test_cik_from_str() {
        assert_eq!(" 0001067983 ".parse::<Cik>().unwrap(), Cik(1067983));
        assert!("-1".parse::<Cik>().is_err());
    }
}
