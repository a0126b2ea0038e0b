use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::rows::{CellRole, DataRow};

/// Placeholder for any positional field a short row doesn't have.
pub const SENTINEL: &str = "Unknown";

const ACTION_SEPARATOR: &str = " -->> ";

/// One ratings entry: serialized as `{ "<ticker>": [cells...] }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub ticker: String,
    pub cells: Vec<String>,
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.ticker, &self.cells)?;
        map.end()
    }
}

/// Human-labelled view of a record, for the console and logs only.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub role: CellRole,
    pub ticker: String,
    pub company: String,
    pub broker: String,
    pub action: String,
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.role {
            CellRole::Primary => ">>",
            CellRole::Secondary => "-->>",
        };
        write!(
            f,
            "{} ({}) : {} {} {}",
            self.ticker, self.company, self.broker, arrow, self.action
        )
    }
}

/// Both outputs of extracting one styled cell group.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub record: Record,
    pub trace: Trace,
}

/// Extract zero, one or two records from a data row, primary group first.
pub fn extract_row(row: &DataRow) -> Vec<Extraction> {
    row.groups()
        .into_iter()
        .filter_map(|(role, cells)| extract_group(role, cells))
        .collect()
}

fn extract_group(role: CellRole, raw: &[String]) -> Option<Extraction> {
    let cells = filter_cells(raw);
    if cells.is_empty() {
        return None;
    }

    let action = if cells.len() > 3 {
        cells[3..].join(ACTION_SEPARATOR)
    } else {
        SENTINEL.to_string()
    };
    let trace = Trace {
        role,
        ticker: field(&cells, 1),
        company: field(&cells, 0),
        broker: field(&cells, 2),
        action,
    };

    Some(Extraction {
        record: Record {
            ticker: trace.ticker.clone(),
            cells,
        },
        trace,
    })
}

/// Trim cells, drop the empty ones and swap `»` for `>`.
/// Field positions are counted over the result, not the raw row.
pub fn filter_cells(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| c.replace('»', ">"))
        .collect()
}

fn field(cells: &[String], idx: usize) -> String {
    cells
        .get(idx)
        .cloned()
        .unwrap_or_else(|| SENTINEL.to_string())
}

// ── Tests ──
