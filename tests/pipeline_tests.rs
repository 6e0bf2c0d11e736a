use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use thirteenf::edgar::error::Result as EdgarResult;
use thirteenf::edgar::{EdgarError, Fetch};
use thirteenf::output::CsvHoldingsWriter;
use thirteenf::report::FetchStatus;
use thirteenf::{Cik, HarvestConfig, Pipeline, RunReport};

const FEED: &str = "https://data.sec.gov/rss?cik=1067983&count=40";
const FILING_DIR: &str = "https://www.sec.gov/Archives/edgar/data/1067983/000095012324011775";

// The crate's fixture helpers and StaticFetcher are cfg(test) only, so integration tests carry their own.
struct MapFetcher {
    bodies: HashMap<String, Vec<u8>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MapFetcher {
    fn new(bodies: Vec<(String, Vec<u8>)>) -> Self {
        Self {
            bodies: bodies.into_iter().collect(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Fetch for MapFetcher {
    async fn fetch(&self, url: &str) -> EdgarResult<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| EdgarError::Transport {
                url: url.to_string(),
                reason: "HTTP request failed with status: 404 Not Found".to_string(),
            })
    }
}

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("src/edgar/tests/data")
        .join(name);
    fs::read(&path).unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

fn single_filing_feed() -> Vec<u8> {
    let feed = String::from_utf8(fixture("feed.xml")).unwrap();
    // Keep the first entry only so every filing in the feed is served.
    let first_end = feed.find("</entry>").unwrap() + "</entry>".len();
    let start = feed.find("<entry>").unwrap();
    format!("{}{}\n</feed>\n", &feed[..start], &feed[start..first_end]).into_bytes()
}

fn served_filing() -> Vec<(String, Vec<u8>)> {
    vec![
        (FEED.to_string(), single_filing_feed()),
        (
            format!("{}/0000950123-24-011775-index.htm", FILING_DIR),
            fixture("filing_index.htm"),
        ),
        (format!("{}/primary_doc.xml", FILING_DIR), fixture("primary_doc.xml")),
        (format!("{}/46994.xml", FILING_DIR), fixture("information_table.xml")),
    ]
}

async fn run_into(out: PathBuf, ciks: &[Cik]) -> (RunReport, Vec<String>) {
    let fetcher = MapFetcher::new(served_filing());
    let config = HarvestConfig {
        output_dir: out.clone(),
        ..HarvestConfig::default()
    };
    let requests = fetcher.requests.clone();
    let pipeline = Pipeline::new(
        config,
        Box::new(fetcher),
        Box::new(CsvHoldingsWriter::new(out)),
    );
    let report = pipeline.run(ciks).await;
    let requests = requests.lock().unwrap().clone();
    (report, requests)
}

#[tokio::test]
async fn test_pipeline_writes_one_csv_per_filing() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");

    let (report, requests) = run_into(out.clone(), &[Cik(1067983)]).await;

    assert!(!report.has_failures(), "unexpected failures: {:?}", report.results);
    assert_eq!(
        requests,
        vec![
            FEED.to_string(),
            format!("{}/0000950123-24-011775-index.htm", FILING_DIR),
            format!("{}/primary_doc.xml", FILING_DIR),
            format!("{}/46994.xml", FILING_DIR),
        ]
    );

    let path = out.join("Berkshire Hathaway Inc_09-30-2024_13F_HR.csv");
    assert_eq!(report.results[0].output_path.as_ref(), Some(&path));
    assert_eq!(report.results[0].rows, Some(3));

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "nameOfIssuer,titleOfClass,cusip,value,sshPrnamt,sshPrnamtType,investmentDiscretion,votingAuthoritySole,votingAuthorityShared,votingAuthorityNone"
    );
    assert_eq!(lines[1], "ALLY FINL INC,COM,02005N100,1038960000,29000000,SH,DFND,29000000,0,0");
    assert_eq!(lines[3], "AMERICAN EXPRESS CO,COM,025816109,2393424000,8825125,SH,DFND,8825125,0,0");
}

#[tokio::test]
async fn test_rerun_produces_identical_output() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let path = out.join("Berkshire Hathaway Inc_09-30-2024_13F_HR.csv");

    run_into(out.clone(), &[Cik(1067983)]).await;
    let first = fs::read(&path).unwrap();
    run_into(out.clone(), &[Cik(1067983)]).await;

    assert_eq!(first, fs::read(&path).unwrap());
}

#[tokio::test]
async fn test_unknown_cik_is_reported_and_others_continue() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");

    let (report, _) = run_into(out.clone(), &[Cik(999), Cik(1067983)]).await;

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].cik, Cik(999));
    assert_eq!(report.results[0].status, FetchStatus::Failed);
    assert_eq!(report.results[0].error_category.as_deref(), Some("transport"));
    assert_eq!(report.results[1].status, FetchStatus::Success);
    assert!(out.join("Berkshire Hathaway Inc_09-30-2024_13F_HR.csv").exists());

    let manifest = dir.path().join("run.json");
    report.save(&manifest).unwrap();
    let saved: RunReport = serde_json::from_slice(&fs::read(&manifest).unwrap()).unwrap();
    assert_eq!(saved.failed().count(), 1);
}
