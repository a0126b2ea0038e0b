use super::rows::{DataRow, Row};

#[derive(Debug, Clone, PartialEq)]
pub struct Section<T> {
    pub name: String,
    pub items: Vec<T>,
}

impl<T> Section<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }
}

/// Accumulator for the left-to-right partition of table rows.
///
/// Sections keep the order their header first appeared in. A repeated header
/// empties the existing section instead of appending to it.
#[derive(Debug, Default)]
pub struct Segmentation {
    sections: Vec<Section<DataRow>>,
    cursor: Option<usize>,
}

impl Segmentation {
    pub fn push(mut self, row: &Row) -> Self {
        match row {
            // An empty title still names a section.
            Row::Header(name) => {
                let idx = match self.sections.iter().position(|s| &s.name == name) {
                    Some(idx) => {
                        self.sections[idx].items.clear();
                        idx
                    }
                    None => {
                        self.sections.push(Section::new(name.clone()));
                        self.sections.len() - 1
                    }
                };
                self.cursor = Some(idx);
            }
            // No header seen yet: nowhere to attach the row.
            Row::Data(data) => {
                if let Some(idx) = self.cursor {
                    self.sections[idx].items.push(data.clone());
                }
            }
        }
        self
    }

    pub fn into_sections(self) -> Vec<Section<DataRow>> {
        self.sections
    }
}

/// Split a flat row list into named sections by header rows.
pub fn segment(rows: &[Row]) -> Vec<Section<DataRow>> {
    rows.iter()
        .fold(Segmentation::default(), Segmentation::push)
        .into_sections()
}

// ── Tests ──
