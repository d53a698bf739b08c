use std::path::{Path, PathBuf};

use crate::models::Row;

/// Ordered rows plus cursor, removal confirmation and the status line.
///
/// Invariant: `cursor < rows.len()` when there are rows, `cursor == 0` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowTable {
    rows: Vec<Row>,
    cursor: usize,
    pending_removal: bool,
    status_message: String,
}

impl RowTable {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// A fresh table over `rows` that keeps this table's cursor where possible
    /// and its status line. Any pending confirmation is dropped.
    pub fn rebuilt(&self, rows: Vec<Row>) -> Self {
        let mut table = Self {
            rows,
            cursor: self.cursor,
            pending_removal: false,
            status_message: self.status_message.clone(),
        };
        table.clamp_cursor();
        table
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&Row> {
        self.rows.get(self.cursor)
    }

    pub fn pending_removal(&self) -> bool {
        self.pending_removal
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.rows
            .iter()
            .map(|r| r.working_tree.path.clone())
            .collect()
    }

    /// Index of the row for `path`, compared exactly.
    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.rows.iter().position(|r| r.working_tree.path == path)
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn set_status_message(&mut self, text: impl Into<String>) {
        self.status_message = text.into();
    }

    pub fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    pub fn begin_removal_confirmation(&mut self) {
        self.pending_removal = true;
    }

    pub fn cancel_removal_confirmation(&mut self) {
        self.pending_removal = false;
        self.status_message.clear();
    }

    /// Leave confirmation after the removal was attempted, keeping the status line.
    pub fn finish_removal_confirmation(&mut self) {
        self.pending_removal = false;
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }
}
