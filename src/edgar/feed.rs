use itertools::Itertools;
use log::info;
use roxmltree::Node;
use serde::{Deserialize, Serialize};

use super::error::{EdgarError, Result};
use super::fetch::Fetch;
use super::xml::parse_document;
use crate::ciks::Cik;
use crate::core::config::HarvestConfig;

/// Form type retained from the filer feed.
pub const TARGET_FORM_TYPE: &str = "13F-HR";

const DOCUMENT: &str = "filing feed";

/// One disclosure event from a filer's feed, all fields verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingFeedEntry {
    pub form_type: String,
    pub acceptance_date_time: String,
    pub accession_number: String,
    pub filing_date: String,
    pub filing_href: String,
    pub form_name: String,
    pub report_date: String,
    pub size: String,
}

/// Fetches the filer's recent-filings feed and keeps the 13F-HR entries.
pub async fn resolve_feed(
    fetcher: &dyn Fetch,
    config: &HarvestConfig,
    cik: Cik,
) -> Result<Vec<FilingFeedEntry>> {
    let url = config.feed_url(cik);
    info!("Fetching filing feed for CIK {}", cik);
    log::debug!("EDGAR feed request URL: {}", url);

    let body = fetcher.fetch(&url).await?;
    let entries = parse_feed(&body)?;

    info!(
        "CIK {}: {} {} filing(s) in feed",
        cik,
        entries.len(),
        TARGET_FORM_TYPE
    );
    Ok(entries)
}

/// Parses an Atom feed body, retaining entries whose category term is `13F-HR`.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FilingFeedEntry>> {
    let doc = parse_document(DOCUMENT, body)?;
    let feed = doc.root_element();
    if feed.tag_name().name() != "feed" {
        return Err(EdgarError::missing(DOCUMENT, "feed"));
    }

    let entries: Vec<Node> = feed
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "entry")
        .collect();

    let mut form_types = Vec::with_capacity(entries.len());
    let mut retained = Vec::new();
    for entry in entries {
        let term = local_child(entry, "category")
            .and_then(|c| c.attribute("term"))
            .ok_or_else(|| EdgarError::missing(DOCUMENT, "entry/category/@term"))?;
        form_types.push(term);

        if term == TARGET_FORM_TYPE {
            retained.push(map_entry(entry, term)?);
        }
    }

    log::debug!(
        "Feed form types: {}",
        form_types.iter().unique().join(", ")
    );
    Ok(retained)
}

fn map_entry(entry: Node, form_type: &str) -> Result<FilingFeedEntry> {
    let content = local_child(entry, "content-type")
        .or_else(|| local_child(entry, "content"))
        .ok_or_else(|| EdgarError::missing(DOCUMENT, "entry/content-type"))?;

    let field = |name: &str| -> Result<String> {
        local_child(content, name)
            .map(|n| n.text().unwrap_or("").to_string())
            .ok_or_else(|| EdgarError::missing(DOCUMENT, format!("content-type/{}", name)))
    };

    Ok(FilingFeedEntry {
        form_type: form_type.to_string(),
        acceptance_date_time: field("acceptance-date-time")?,
        accession_number: field("accession-number")?,
        filing_date: field("filing-date")?,
        filing_href: field("filing-href")?,
        form_name: field("form-name")?,
        report_date: field("report-date")?,
        size: field("size")?,
    })
}

// Feed elements are matched by local name; the Atom default namespace is not checked.
fn local_child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}
