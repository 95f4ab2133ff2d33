//! Search results as they are shown on screen.

use crate::client::Record;
use crate::utils::display_table;
use serde_json::Value;

pub const NO_RESULTS: &str = "No results found";

/// Text of a single cell. Strings are shown without quotes, `null` as an
/// empty cell, nested values as compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultsTable {
    /// `None` for an empty result set, which renders a single message row.
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    /// Lowercased concatenation of each row's cells.
    haystacks: Vec<String>,
    visible: Vec<bool>,
}

impl ResultsTable {
    pub fn from_records(records: &[Record]) -> Self {
        let Some(first) = records.first() else {
            return Self::with_rows(None, vec![vec![NO_RESULTS.to_owned()]]);
        };
        let header: Vec<String> = first.keys().cloned().collect();
        let rows = records
            .iter()
            .map(|record| {
                header
                    .iter()
                    .map(|key| record.get(key).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self::with_rows(Some(header), rows)
    }

    fn with_rows(header: Option<Vec<String>>, rows: Vec<Vec<String>>) -> Self {
        let haystacks = rows.iter().map(|r| r.concat().to_lowercase()).collect();
        let visible = vec![true; rows.len()];
        Self {
            header,
            rows,
            haystacks,
            visible,
        }
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Hides rows whose text does not contain `query`, ignoring case. Only
    /// visibility changes; the rows themselves are kept.
    pub fn set_query(&mut self, query: &str) {
        if self.header.is_none() {
            // the "no results" line is never filtered
            return;
        }
        let needle = query.to_lowercase();
        for (visible, haystack) in self.visible.iter_mut().zip(&self.haystacks) {
            *visible = haystack.contains(&needle);
        }
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.rows
            .iter()
            .zip(&self.visible)
            .filter_map(|(row, visible)| visible.then_some(row))
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }

    /// Header (when present) followed by every row, hidden ones included.
    pub fn all_lines(&self) -> impl Iterator<Item = &[String]> {
        self.header
            .as_deref()
            .into_iter()
            .chain(self.rows.iter().map(Vec::as_slice))
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        match &self.header {
            Some(header) => {
                let rows: Vec<&Vec<String>> = self.visible_rows().collect();
                display_table(ui, header, &rows);
            }
            None => {
                ui.label(NO_RESULTS);
            }
        }
    }
}
