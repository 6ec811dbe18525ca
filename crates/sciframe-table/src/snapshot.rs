use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::index::VectorIndex;
use crate::table::Table;
use crate::types::{Value, NAN};

/// Self-contained copy of a table block, used to move data between tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub name: String,
    pub lines: usize,
    pub cols: usize,
    /// One entry per column; empty for columns without a headline.
    pub headlines: Vec<String>,
    /// Row-major, `lines * cols` cells.
    pub values: Vec<Value>,
}

impl TableSnapshot {
    /// An all-missing snapshot of the given shape.
    pub fn new(name: impl Into<String>, lines: usize, cols: usize) -> Self {
        Self {
            name: name.into(),
            lines,
            cols,
            headlines: vec![String::new(); cols],
            values: vec![NAN; lines * cols],
        }
    }

    pub fn get(&self, line: usize, col: usize) -> Value {
        if line >= self.lines || col >= self.cols {
            return NAN;
        }
        self.values.get(line * self.cols + col).copied().unwrap_or(NAN)
    }

    pub fn set(&mut self, line: usize, col: usize, value: Value) {
        if line < self.lines && col < self.cols {
            self.values[line * self.cols + col] = value;
        }
    }

    pub fn headline(&self, col: usize) -> &str {
        self.headlines.get(col).map_or("", String::as_str)
    }
}

impl Table {
    /// Copy a block into a snapshot. Open ends extend to the current extent.
    pub fn extract_table(
        &self,
        name: impl Into<String>,
        lines: &VectorIndex,
        cols: &VectorIndex,
    ) -> TableSnapshot {
        let lines = lines.resolve(self.get_lines(false));
        let cols = cols.resolve(self.get_cols(false));
        let mut snapshot = TableSnapshot::new(name, lines.len(), cols.len());
        for (j, col) in cols.iter().enumerate() {
            if let Some(column) = self.column(col) {
                snapshot.headlines[j] = column.headline().to_owned();
            }
            for (i, line) in lines.iter().enumerate() {
                snapshot.set(i, j, self.read_mem(line, col));
            }
        }
        snapshot
    }

    /// Replace a block with the contents of `snapshot`.
    ///
    /// The target block is deleted first. Open ends are closed to the snapshot's shape, and
    /// cells or headlines that do not fit the selection are dropped. Empty snapshot headlines
    /// leave the target headline alone.
    pub fn import_table(
        &mut self,
        snapshot: &TableSnapshot,
        lines: &VectorIndex,
        cols: &VectorIndex,
    ) -> Result<(), TableError> {
        lines.validate()?;
        cols.validate()?;
        self.delete_bulk(lines, cols);
        if snapshot.lines == 0 || snapshot.cols == 0 {
            return Ok(());
        }

        let lines = lines.resolve_to(lines.front() + snapshot.lines - 1);
        let cols = cols.resolve_to(cols.front() + snapshot.cols - 1);
        if cols.max() >= self.get_cols(false) {
            self.allocate(cols.max() + 1, false)?;
        }
        for col in cols.iter().take(snapshot.cols) {
            if let Some(column) = self.columns[col].as_mut() {
                column.reserve(lines.max() + 1);
            }
        }

        for (i, line) in lines.iter().enumerate().take(snapshot.lines) {
            for (j, col) in cols.iter().enumerate().take(snapshot.cols) {
                self.write_data(line, col, snapshot.get(i, j))?;
            }
        }
        for (j, col) in cols.iter().enumerate().take(snapshot.cols) {
            let headline = snapshot.headline(j);
            if !headline.is_empty() {
                self.set_headline(col, headline)?;
            }
        }
        Ok(())
    }
}
