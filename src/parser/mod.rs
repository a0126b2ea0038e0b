pub mod extract;
pub mod rows;
pub mod sections;
pub mod timestamp;

use scraper::Html;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use extract::{Extraction, Record, Trace};
use rows::Row;
use sections::Section;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("content container div#Content not found")]
    MissingContainer,
    #[error("no table inside div#Content")]
    MissingTable,
}

/// The page as published: update time plus records grouped by section.
#[derive(Debug, Serialize)]
pub struct RatingsReport {
    #[serde(rename = "updateDate")]
    pub update_date: Option<String>,
    pub data: SectionMap,
}

/// Section name → records, serialized as a JSON object in page order.
#[derive(Debug, Default)]
pub struct SectionMap(pub Vec<Section<Record>>);

impl SectionMap {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SectionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for section in &self.0 {
            map.serialize_entry(&section.name, &section.items)?;
        }
        map.end()
    }
}

/// One line of the console view, in the order rows appear on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleLine {
    Banner(String),
    Trace(Trace),
}

pub struct ParsedPage {
    pub report: RatingsReport,
    /// Every header and traced row as scanned, including rows a later
    /// repeat of their header discards from the report.
    pub console: Vec<ConsoleLine>,
}

/// Pipeline: html → rows → sections → records, plus the scan-order console view.
pub fn parse_page(html: &str) -> Result<ParsedPage, PageError> {
    let document = Html::parse_document(html);

    let update_date = rows::page_date_label(&document)
        .as_deref()
        .and_then(timestamp::normalize_label);
    let rows = rows::classify_rows(&document)?;

    let records: Vec<Section<Record>> = sections::segment(&rows)
        .into_iter()
        .map(|section| Section {
            items: section
                .items
                .iter()
                .flat_map(extract::extract_row)
                .map(|Extraction { record, .. }| record)
                .collect(),
            name: section.name,
        })
        .collect();

    Ok(ParsedPage {
        report: RatingsReport {
            update_date,
            data: SectionMap(records),
        },
        console: console_lines(&rows),
    })
}

/// Walk the rows once: a banner per header occurrence and a trace per
/// extracted group once any header has been seen.
fn console_lines(rows: &[Row]) -> Vec<ConsoleLine> {
    let mut lines = Vec::new();
    let mut in_section = false;
    for row in rows {
        match row {
            Row::Header(name) => {
                in_section = true;
                lines.push(ConsoleLine::Banner(name.clone()));
            }
            Row::Data(data) if in_section => lines.extend(
                extract::extract_row(data)
                    .into_iter()
                    .map(|Extraction { trace, .. }| ConsoleLine::Trace(trace)),
            ),
            Row::Data(_) => {}
        }
    }
    lines
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> ParsedPage {
        let html = std::fs::read_to_string("tests/fixtures/upgrades_downgrades.html").unwrap();
        parse_page(&html).unwrap()
    }

    fn section<'a>(data: &'a SectionMap, name: &str) -> &'a [Record] {
        data.0
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.items.as_slice())
            .unwrap()
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn single_upgrade_end_to_end() {
        let html = r#"<div id="Content"><table>
            <tr><td class="sectionTitle">Upgrades</td></tr>
            <tr><td class="rD">Acme Corp</td><td class="rD">ACME</td><td class="rD">BigBank</td><td class="rD">Buy</td><td class="rD">Strong Buy</td></tr>
        </table></div>"#;
        let page = parse_page(html).unwrap();
        assert_eq!(
            serde_json::to_value(&page.report).unwrap(),
            json!({
                "updateDate": null,
                "data": {
                    "Upgrades": [{ "ACME": ["Acme Corp", "ACME", "BigBank", "Buy", "Strong Buy"] }]
                }
            })
        );
    }

    #[test]
    fn no_headers_empty_data() {
        let html = r#"<div id="Content"><table>
            <tr><td class="rD">Acme Corp</td><td class="rD">ACME</td></tr>
        </table></div>"#;
        let page = parse_page(html).unwrap();
        assert!(page.report.data.is_empty());
        assert!(page.console.is_empty());
    }

    #[test]
    fn missing_table_is_fatal() {
        let err = parse_page("<html><body><p>down for maintenance</p></body></html>");
        assert!(matches!(err, Err(PageError::MissingContainer)));
    }

    #[test]
    fn fixture_update_date() {
        let page = fixture();
        assert_eq!(page.report.update_date.as_deref(), Some("2024-08-30 20:12:00 CEST"));
    }

    #[test]
    fn fixture_sections_in_page_order() {
        let page = fixture();
        let names: Vec<&str> = page.report.data.names().collect();
        assert_eq!(names, vec!["Upgrades", "Downgrades", "Coverage Initiated"]);
    }

    #[test]
    fn fixture_records() {
        let page = fixture();
        let data = &page.report.data;

        let upgrades = section(data, "Upgrades");
        assert_eq!(upgrades.len(), 2);
        assert_eq!(upgrades[0].ticker, "ACME");
        assert_eq!(
            upgrades[1].cells,
            cells(&["Globex", "GBX", "Smith & Co", "Neutral > Outperform"])
        );

        let downgrades = section(data, "Downgrades");
        assert_eq!(downgrades.len(), 1);
        assert_eq!(downgrades[0].ticker, "INIT");

        let initiated = section(data, "Coverage Initiated");
        assert_eq!(initiated[0].ticker, "HOOL");
        assert_eq!(initiated[0].cells, cells(&["Hooli", "HOOL"]));

        // The column-title row above the first header never lands anywhere.
        assert!(data.0.iter().flat_map(|s| &s.items).all(|r| r.ticker != "Ticker"));
    }

    fn traces(page: &ParsedPage) -> Vec<&Trace> {
        page.console
            .iter()
            .filter_map(|line| match line {
                ConsoleLine::Trace(trace) => Some(trace),
                ConsoleLine::Banner(_) => None,
            })
            .collect()
    }

    #[test]
    fn fixture_console_follows_the_page() {
        let page = fixture();
        assert_eq!(page.console[0], ConsoleLine::Banner("Upgrades".into()));
        let lines: Vec<String> = traces(&page).iter().map(|t| t.to_string()).collect();
        assert_eq!(
            lines[..2],
            [
                "ACME (Acme Corp) : BigBank >> Buy -->> Strong Buy",
                "GBX (Globex) : Smith & Co -->> Neutral > Outperform",
            ]
        );
        assert_eq!(traces(&page)[3].broker, extract::SENTINEL);
    }

    #[test]
    fn repeated_header_shows_discarded_rows() {
        let html = r#"<div id="Content"><table>
            <tr><td class="rD">Stray</td><td class="rD">STRY</td></tr>
            <tr><td class="sectionTitle">Upgrades</td></tr>
            <tr><td class="rD">Acme Corp</td><td class="rD">ACME</td></tr>
            <tr><td class="sectionTitle">Upgrades</td></tr>
            <tr><td class="rD">Globex</td><td class="rD">GBX</td></tr>
        </table></div>"#;
        let page = parse_page(html).unwrap();

        let upgrades = section(&page.report.data, "Upgrades");
        assert_eq!(upgrades.len(), 1);
        assert_eq!(upgrades[0].ticker, "GBX");

        let banners = page
            .console
            .iter()
            .filter(|line| matches!(line, ConsoleLine::Banner(name) if name == "Upgrades"))
            .count();
        assert_eq!(banners, 2);
        let tickers: Vec<&str> = traces(&page).iter().map(|t| t.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["ACME", "GBX"]);
    }

    #[test]
    fn json_keys_keep_page_order() {
        let page = fixture();
        let json = serde_json::to_string(&page.report).unwrap();
        let up = json.find("\"Upgrades\"").unwrap();
        let down = json.find("\"Downgrades\"").unwrap();
        let init = json.find("\"Coverage Initiated\"").unwrap();
        assert!(json.starts_with("{\"updateDate\":\"2024-08-30 20:12:00 CEST\",\"data\":{"));
        assert!(up < down && down < init);
    }
}
