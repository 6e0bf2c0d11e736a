use log::info;
use roxmltree::Node;
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::fetch::Fetch;
use super::xml::{parse_document, required_integer, required_text};

pub const INFORMATION_TABLE_NS: &str = "http://www.sec.gov/edgar/document/thirteenf/informationtable";

const DOCUMENT: &str = "information table";

/// One line item of a 13F information table.
///
/// Field names serialize to the information table element names, which are also
/// the column headers of the written CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingRecord {
    #[serde(rename = "nameOfIssuer")]
    pub name_of_issuer: String,
    #[serde(rename = "titleOfClass")]
    pub title_of_class: String,
    pub cusip: String,
    pub value: u64,
    #[serde(rename = "sshPrnamt")]
    pub ssh_prnamt: u64,
    #[serde(rename = "sshPrnamtType")]
    pub ssh_prnamt_type: String,
    #[serde(rename = "investmentDiscretion")]
    pub investment_discretion: String,
    #[serde(rename = "votingAuthoritySole")]
    pub voting_authority_sole: u64,
    #[serde(rename = "votingAuthorityShared")]
    pub voting_authority_shared: u64,
    #[serde(rename = "votingAuthorityNone")]
    pub voting_authority_none: u64,
}

impl HoldingRecord {
    pub const FIELD_NAMES: [&'static str; 10] = [
        "nameOfIssuer",
        "titleOfClass",
        "cusip",
        "value",
        "sshPrnamt",
        "sshPrnamtType",
        "investmentDiscretion",
        "votingAuthoritySole",
        "votingAuthorityShared",
        "votingAuthorityNone",
    ];

    fn from_info_table(node: Node) -> Result<Self> {
        let text = |path: &str| required_text(DOCUMENT, node, INFORMATION_TABLE_NS, path);
        let integer = |path: &str| required_integer(DOCUMENT, node, INFORMATION_TABLE_NS, path);

        Ok(HoldingRecord {
            name_of_issuer: text("nameOfIssuer")?,
            title_of_class: text("titleOfClass")?,
            cusip: text("cusip")?,
            value: integer("value")?,
            ssh_prnamt: integer("shrsOrPrnAmt/sshPrnamt")?,
            ssh_prnamt_type: text("shrsOrPrnAmt/sshPrnamtType")?,
            investment_discretion: text("investmentDiscretion")?,
            voting_authority_sole: integer("votingAuthority/Sole")?,
            voting_authority_shared: integer("votingAuthority/Shared")?,
            voting_authority_none: integer("votingAuthority/None")?,
        })
    }
}

/// Holdings of one filing, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingsTable {
    records: Vec<HoldingRecord>,
}

impl HoldingsTable {
    pub fn new(records: Vec<HoldingRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[HoldingRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HoldingRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a HoldingsTable {
    type Item = &'a HoldingRecord;
    type IntoIter = std::slice::Iter<'a, HoldingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub async fn extract_holdings(fetcher: &dyn Fetch, holdings_doc_url: &str) -> Result<HoldingsTable> {
    log::debug!("Fetching information table: {}", holdings_doc_url);
    let body = fetcher.fetch(holdings_doc_url).await?;
    let table = parse_information_table(&body)?;
    info!("Extracted {} holding(s) from {}", table.len(), holdings_doc_url);
    Ok(table)
}

/// Maps every `infoTable` element to a record; any malformed entry fails the whole table.
pub fn parse_information_table(body: &[u8]) -> Result<HoldingsTable> {
    let doc = parse_document(DOCUMENT, body)?;
    let records = doc
        .root_element()
        .descendants()
        .filter(|n| n.is_element() && n.has_tag_name((INFORMATION_TABLE_NS, "infoTable")))
        .map(HoldingRecord::from_info_table)
        .collect::<Result<Vec<_>>>()?;
    Ok(HoldingsTable::new(records))
}
