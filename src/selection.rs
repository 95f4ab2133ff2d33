//! Column selection state behind the filter dropdown.
//!
//! `selected` keeps insertion order, `available` always keeps the order the
//! server returned the columns in.

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnSelection {
    columns: Vec<String>,
    available: Vec<String>,
    selected: Vec<String>,
}

impl ColumnSelection {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            available: columns.clone(),
            columns,
            selected: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, column: &str) -> bool {
        self.selected.iter().any(|c| c == column)
    }

    /// Moves `column` to the end of the selection. Returns `false` when
    /// nothing changed (already selected, or not a known column).
    pub fn select(&mut self, column: &str) -> bool {
        if self.is_selected(column) || !self.columns.iter().any(|c| c == column) {
            return false;
        }
        self.selected.push(column.to_owned());
        self.available.retain(|c| c != column);
        true
    }

    /// Returns `false` when `column` was not selected.
    pub fn remove(&mut self, column: &str) -> bool {
        if !self.is_selected(column) {
            return false;
        }
        self.selected.retain(|c| c != column);
        // rebuilt from the full set so a removed column returns to its
        // original slot, not the end
        self.available = self
            .columns
            .iter()
            .filter(|c| !self.selected.contains(c))
            .cloned()
            .collect();
        true
    }
}
