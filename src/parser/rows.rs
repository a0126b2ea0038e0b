use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::PageError;

static CONTENT_DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div#Content").unwrap());
static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static TABLE_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static SECTION_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td.sectionTitle").unwrap());
static PRIMARY_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td.rD").unwrap());
static SECONDARY_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td.rL").unwrap());
static PAGE_DATE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.pageDate").unwrap());

/// Styling class a data cell carries. The page stripes its rows, so a row
/// normally holds one group, but both can appear side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    Primary,
    Secondary,
}

impl CellRole {
    pub fn class(self) -> &'static str {
        match self {
            CellRole::Primary => "rD",
            CellRole::Secondary => "rL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Header(String),
    Data(DataRow),
}

/// Raw, unfiltered cell texts of one `<tr>`, split by styling class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataRow {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

impl DataRow {
    /// Cell groups in extraction order: primary first.
    pub fn groups(&self) -> [(CellRole, &[String]); 2] {
        [
            (CellRole::Primary, self.primary.as_slice()),
            (CellRole::Secondary, self.secondary.as_slice()),
        ]
    }
}

/// Flatten the first table under `div#Content` into header and data rows.
pub fn classify_rows(document: &Html) -> Result<Vec<Row>, PageError> {
    let content = document
        .select(&CONTENT_DIV)
        .next()
        .ok_or(PageError::MissingContainer)?;
    let table = content
        .select(&TABLE)
        .next()
        .ok_or(PageError::MissingTable)?;

    Ok(table.select(&TABLE_ROW).map(classify_row).collect())
}

fn classify_row(tr: ElementRef<'_>) -> Row {
    if let Some(title) = tr.select(&SECTION_TITLE).next() {
        return Row::Header(element_text(title).trim().to_string());
    }

    Row::Data(DataRow {
        primary: tr.select(&PRIMARY_CELL).map(element_text).collect(),
        secondary: tr.select(&SECONDARY_CELL).map(element_text).collect(),
    })
}

/// Text of the `p.pageDate` label, if the page carries one.
pub fn page_date_label(document: &Html) -> Option<String> {
    document
        .select(&PAGE_DATE)
        .next()
        .map(|p| element_text(p).trim().to_string())
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}
