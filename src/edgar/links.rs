use log::info;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use super::error::{EdgarError, Result};
use super::feed::FilingFeedEntry;
use super::fetch::Fetch;
use super::xml::{descendant_path, parse_document};

pub const THIRTEENF_FILER_NS: &str = "http://www.sec.gov/edgar/thirteenffiler";

/// A filing index page must expose more than this many `.xml` links.
pub const MIN_XML_LINKS: usize = 3;
const PRIMARY_DOC_POSITION: usize = 1;
const HOLDINGS_DOC_POSITION: usize = 3;

const PRIMARY_DOCUMENT: &str = "primary document";

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static selector is valid"));

/// Filer name, report period and information table URL for one filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingLinkSet {
    pub name: String,
    pub period: String,
    pub holdings_doc_url: String,
}

/// The two documents picked from a filing index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedDocuments {
    pub primary_doc_url: String,
    pub holdings_doc_url: String,
}

pub async fn resolve_links(
    fetcher: &dyn Fetch,
    origin: &str,
    entry: &FilingFeedEntry,
) -> Result<FilingLinkSet> {
    log::debug!("Fetching filing index: {}", entry.filing_href);
    let page = fetcher.fetch(&entry.filing_href).await?;
    let links = extract_xml_links(&String::from_utf8_lossy(&page));
    info!(
        "Filing {}: found {} .xml link(s) on index page",
        entry.accession_number,
        links.len()
    );

    let selected = select_documents(&links, origin, &entry.filing_href)?;
    log::debug!("Primary document: {}", selected.primary_doc_url);
    log::debug!("Information table: {}", selected.holdings_doc_url);

    let primary = fetcher.fetch(&selected.primary_doc_url).await?;
    let (name, period) = parse_primary_doc(&primary)?;

    Ok(FilingLinkSet {
        name,
        period,
        holdings_doc_url: selected.holdings_doc_url,
    })
}

/// Every anchor `href` ending in `.xml`, in document order.
pub fn extract_xml_links(html: &str) -> Vec<String> {
    Html::parse_document(html)
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.ends_with(".xml"))
        .map(str::to_string)
        .collect()
}

/// Picks the primary document and information table by position on the index page.
pub fn select_documents(links: &[String], origin: &str, page_url: &str) -> Result<SelectedDocuments> {
    if links.len() <= MIN_XML_LINKS {
        return Err(EdgarError::LinkDiscovery {
            url: page_url.to_string(),
            found: links.len(),
            required: MIN_XML_LINKS,
        });
    }

    Ok(SelectedDocuments {
        primary_doc_url: format!("{}{}", origin, links[PRIMARY_DOC_POSITION]),
        holdings_doc_url: format!("{}{}", origin, links[HOLDINGS_DOC_POSITION]),
    })
}

/// Extracts `filingManager/name` and `periodOfReport` from a 13F primary document.
pub fn parse_primary_doc(body: &[u8]) -> Result<(String, String)> {
    let doc = parse_document(PRIMARY_DOCUMENT, body)?;
    let root = doc.root_element();

    let lookup = |path: &str| -> Result<String> {
        descendant_path(root, THIRTEENF_FILER_NS, path)
            .and_then(|n| n.text())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or_else(|| EdgarError::missing(PRIMARY_DOCUMENT, path))
    };

    Ok((lookup("filingManager/name")?, lookup("periodOfReport")?))
}
