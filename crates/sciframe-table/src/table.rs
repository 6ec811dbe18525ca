use std::cell::Cell;

use chrono::{DateTime, Utc};
use sciframe_resample::DEFAULT_SCAN_BUFFER_LINES;

use crate::column::Column;
use crate::error::TableError;
use crate::index::VectorIndex;
use crate::types::{is_missing, Value, NAN};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableOptions {
    /// Hard cap on the number of column slots.
    pub max_cols: usize,
    /// Hard cap on `rows * cols` of the logical extent.
    pub max_cells: usize,
    /// Scan buffer size handed to the resampler.
    pub scan_buffer_lines: usize,
    pub lanczos_lobes: u32,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            max_cols: 10_000,
            max_cells: 100_000_000,
            scan_buffer_lines: DEFAULT_SCAN_BUFFER_LINES,
            lanczos_lobes: 6,
        }
    }
}

/// Column-oriented two-dimensional numeric table.
///
/// Column slots are created by [`Table::allocate`] (or implicitly by writes) but a column is only
/// materialized once something is written into it. Reads never fail: coordinates outside the
/// table, or inside an unmaterialized column, read as NaN.
#[derive(Clone, Debug)]
pub struct Table {
    pub(crate) columns: Vec<Option<Column>>,
    options: TableOptions,
    /// Row count, valid until the next mutation that could change it.
    cached_lines: Cell<Option<usize>>,
    saved: bool,
    last_saved: DateTime<Utc>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn default_headline(col: usize) -> String {
    format!("Col_{}", col + 1)
}

fn nan_avg(values: &[Value]) -> Value {
    let mut sum = Value::new(0.0, 0.0);
    let mut count = 0.0;
    for &v in values {
        if !is_missing(v) {
            sum += v;
            count += 1.0;
        }
    }
    if count > 0.0 {
        sum / count
    } else {
        sum
    }
}

impl Table {
    pub fn new() -> Self {
        Self::with_options(TableOptions::default())
    }

    pub fn with_options(options: TableOptions) -> Self {
        Self {
            columns: Vec::new(),
            options,
            cached_lines: Cell::new(None),
            saved: true,
            last_saved: Utc::now(),
        }
    }

    pub fn with_columns(cols: usize) -> Result<Self, TableError> {
        let mut table = Self::new();
        table.allocate(cols, false)?;
        Ok(table)
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Grow the number of column slots to at least `cols`. Never removes slots.
    pub fn allocate(&mut self, cols: usize, shrink: bool) -> Result<(), TableError> {
        if cols > self.options.max_cols {
            log::debug!("rejecting allocation of {cols} columns");
            return Err(TableError::Capacity {
                what: "column",
                requested: cols,
                limit: self.options.max_cols,
            });
        }
        if cols > self.columns.len() {
            self.columns.resize_with(cols, || None);
        }
        if shrink {
            for col in self.columns.iter_mut().flatten() {
                col.shrink();
            }
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.invalidate_lines();
        self.mark_modified();
    }

    /// Number of column slots. Slots are the logical column extent, so `full` makes no difference.
    pub fn get_cols(&self, _full: bool) -> usize {
        self.columns.len()
    }

    /// With `full`, the largest reserved column capacity; otherwise the logical row count.
    pub fn get_lines(&self, full: bool) -> usize {
        if full {
            return self
                .columns
                .iter()
                .flatten()
                .map(|c| c.capacity().max(c.len()))
                .max()
                .unwrap_or(0);
        }
        if let Some(lines) = self.cached_lines.get() {
            return lines;
        }
        let lines = self
            .columns
            .iter()
            .flatten()
            .map(Column::len)
            .max()
            .unwrap_or(0);
        self.cached_lines.set(Some(lines));
        lines
    }

    pub fn byte_size(&self) -> usize {
        self.columns.iter().flatten().map(Column::byte_size).sum()
    }

    /// `true` when the table holds at least one row.
    pub fn is_valid(&self) -> bool {
        self.get_lines(false) > 0
    }

    pub fn is_valid_element(&self, line: usize, col: usize) -> bool {
        self.column(col).is_some_and(|c| c.is_valid(line))
    }

    pub fn column(&self, col: usize) -> Option<&Column> {
        self.columns.get(col).and_then(Option::as_ref)
    }

    pub fn read_mem(&self, line: usize, col: usize) -> Value {
        self.column(col).map_or(NAN, |c| c.get(line))
    }

    /// Like [`Table::read_mem`], with negative coordinates reading as NaN.
    pub fn read_signed(&self, line: i64, col: i64) -> Value {
        match (usize::try_from(line), usize::try_from(col)) {
            (Ok(line), Ok(col)) => self.read_mem(line, col),
            _ => NAN,
        }
    }

    /// Flattened row-major read of a selection.
    ///
    /// A true two-dimensional block is not representable by this call: if both selections hold
    /// more than one position (or the table has no columns), a single NaN is returned.
    pub fn read_mem_block(&self, lines: &VectorIndex, cols: &VectorIndex) -> Vec<Value> {
        let lines = lines.resolve(self.get_lines(false));
        let cols = cols.resolve(self.get_cols(false));
        if (lines.len() > 1 && cols.len() > 1) || self.columns.is_empty() {
            return vec![NAN];
        }
        let mut out = Vec::with_capacity(lines.len() * cols.len());
        for i in &lines {
            for j in &cols {
                out.push(self.read_mem(i, j));
            }
        }
        out
    }

    pub fn read_real_mem_block(&self, lines: &VectorIndex, cols: &VectorIndex) -> Vec<f64> {
        self.read_mem_block(lines, cols)
            .into_iter()
            .map(|v| if is_missing(v) { f64::NAN } else { v.re })
            .collect()
    }

    /// Bilinear read at fractional coordinates.
    ///
    /// Missing neighbours are replaced by the mean of the available ones before blending; if all
    /// four are missing the result is NaN.
    pub fn read_mem_interpolated(&self, line: f64, col: f64) -> Value {
        if line.is_nan() || col.is_nan() {
            return NAN;
        }
        let base_line = line.floor();
        let base_col = col.floor();
        let x = line - base_line;
        let y = col - base_col;
        let (bl, bc) = (base_line as i64, base_col as i64);

        let mut f = [
            self.read_signed(bl, bc),
            self.read_signed(bl.saturating_add(1), bc),
            self.read_signed(bl, bc.saturating_add(1)),
            self.read_signed(bl.saturating_add(1), bc.saturating_add(1)),
        ];
        if f.iter().all(|v| is_missing(*v)) {
            return NAN;
        }
        let avg = nan_avg(&f);
        for v in &mut f {
            if is_missing(*v) {
                *v = avg;
            }
        }
        let [f00, f10, f01, f11] = f;
        f00 * (1.0 - x) * (1.0 - y) + f10 * x * (1.0 - y) + f01 * (1.0 - x) * y + f11 * x * y
    }

    pub fn write_data(&mut self, line: usize, col: usize, value: Value) -> Result<(), TableError> {
        if self.columns.is_empty() && is_missing(value) {
            return Ok(());
        }
        let lines = self.get_lines(false);
        if !is_missing(value) && (line >= lines || col >= self.columns.len()) {
            self.check_extent(line.max(lines.saturating_sub(1)), col)?;
        }
        if col >= self.columns.len() {
            self.allocate(col + 1, false)?;
        }

        self.column_mut(col).set(line, value);

        if is_missing(value) || line >= lines {
            self.invalidate_lines();
        }
        self.mark_modified();
        Ok(())
    }

    /// Write `values` along the selection.
    ///
    /// The data runs down the rows when the row selection holds more than one position and
    /// across the columns otherwise. Open ends are closed to fit the data. A single value is
    /// broadcast with [`Table::write_singleton`].
    pub fn write_block(
        &mut self,
        lines: &VectorIndex,
        cols: &VectorIndex,
        values: &[Value],
    ) -> Result<(), TableError> {
        match values {
            [] => return Ok(()),
            [v] => return self.write_singleton(lines, cols, *v),
            _ => {}
        }
        let n = values.len();
        let lines = lines.resolve_to(lines.front() + n - 1);
        let cols = cols.resolve_to(cols.front() + n - 1);
        let down_rows = lines.len() > 1;

        for (i, line) in lines.iter().enumerate() {
            for (j, col) in cols.iter().enumerate() {
                let k = if down_rows { i } else { j };
                if let Some(&v) = values.get(k) {
                    self.write_data(line, col, v)?;
                }
            }
        }
        Ok(())
    }

    /// Write `value` into every selected cell. Open ends extend to the current extent.
    pub fn write_singleton(
        &mut self,
        lines: &VectorIndex,
        cols: &VectorIndex,
        value: Value,
    ) -> Result<(), TableError> {
        let last_line = lines.front().max(self.get_lines(false)).saturating_sub(1);
        let last_col = cols.front().max(self.get_cols(false)).saturating_sub(1);
        let lines = lines.resolve_to(last_line);
        let cols = cols.resolve_to(last_col);
        for line in &lines {
            for col in &cols {
                self.write_data(line, col, value)?;
            }
        }
        Ok(())
    }

    /// Independent copy of a selection. Unmaterialized source columns stay unmaterialized.
    pub fn extract_range(&self, lines: &VectorIndex, cols: &VectorIndex) -> Table {
        let lines = lines.resolve(self.get_lines(false));
        let cols = cols.resolve(self.get_cols(false));
        let mut copy = Table::with_options(self.options);
        copy.columns = cols
            .iter()
            .map(|j| self.column(j).map(|c| c.copy_rows(&lines)))
            .collect();
        copy
    }

    /// Release reserved capacity and drop trailing empty column slots.
    pub fn shrink(&mut self) {
        for col in self.columns.iter_mut().flatten() {
            col.shrink();
        }
        let keep = self
            .columns
            .iter()
            .rposition(|c| c.as_ref().is_some_and(|c| !c.is_empty()))
            .map_or(0, |j| j + 1);
        self.columns.truncate(keep);
        self.columns.shrink_to_fit();
    }

    pub fn headline(&self, col: usize) -> String {
        match self.column(col) {
            Some(c) => c.headline().to_owned(),
            None => format!("{} (empty)", default_headline(col)),
        }
    }

    pub fn headlines(&self, cols: &VectorIndex) -> Vec<String> {
        cols.resolve(self.get_cols(false))
            .iter()
            .map(|j| self.headline(j))
            .collect()
    }

    pub fn set_headline(
        &mut self,
        col: usize,
        headline: impl Into<String>,
    ) -> Result<(), TableError> {
        if col >= self.columns.len() {
            self.allocate(col.saturating_add(1), false)?;
        }
        self.column_mut(col).set_headline(headline);
        self.mark_modified();
        Ok(())
    }

    /// Materialize every slot and give empty headlines their default name.
    pub fn create_table_headers(&mut self) {
        for (j, slot) in self.columns.iter_mut().enumerate() {
            let col = slot.get_or_insert_with(Column::new);
            if col.headline().is_empty() {
                col.set_headline(default_headline(j));
            }
        }
    }

    /// Number of text lines of the tallest headline. Headline line breaks are the two-character
    /// sequence `\n`.
    pub fn headline_count(&self) -> usize {
        self.columns
            .iter()
            .flatten()
            .map(|c| c.headline().matches("\\n").count() + 1)
            .max()
            .unwrap_or(1)
    }

    /// Rows between the end of column `col` and the end of the table.
    pub fn appended_zeroes(&self, col: usize) -> usize {
        let lines = self.get_lines(false);
        lines - self.column(col).map_or(0, |c| c.len().min(lines))
    }

    pub fn delete_entry(&mut self, line: usize, col: usize) {
        let Some(column) = self.columns.get_mut(col).and_then(Option::as_mut) else {
            return;
        };
        if !column.is_valid(line) {
            return;
        }
        column.set(line, NAN);
        if column.is_empty() && line == 0 {
            column.set_headline(default_headline(col));
        }
        self.invalidate_lines();
        self.mark_modified();
    }

    /// Delete a block. Columns left empty get their default headline back when the first row was
    /// part of the deletion.
    pub fn delete_bulk(&mut self, lines: &VectorIndex, cols: &VectorIndex) {
        if self.columns.is_empty() {
            return;
        }
        let extent = self.get_lines(false);
        let lines = lines.resolve(extent);
        let cols = cols.resolve(self.get_cols(false));
        let has_first_line = lines.contains(0);
        // Rows past the extent are already missing.
        let lines = match extent {
            0 => VectorIndex::list(Vec::new()),
            n => lines.clamp(0, n - 1),
        };

        for j in &cols {
            let Some(column) = self.columns.get_mut(j).and_then(Option::as_mut) else {
                continue;
            };
            for i in &lines {
                column.set(i, NAN);
            }
            if column.is_empty() && has_first_line {
                column.set_headline(default_headline(j));
            }
        }

        self.invalidate_lines();
        self.mark_modified();
    }

    pub fn save_status(&self) -> bool {
        self.saved
    }

    pub fn set_save_status(&mut self, saved: bool) {
        self.saved = saved;
        if saved {
            self.last_saved = Utc::now();
        }
    }

    pub fn last_saved(&self) -> DateTime<Utc> {
        self.last_saved
    }

    /// Materialize column `col`, which must already have a slot.
    pub(crate) fn column_mut(&mut self, col: usize) -> &mut Column {
        self.columns[col].get_or_insert_with(Column::new)
    }

    /// Fail if growing the logical extent to include `(line, col)` would exceed a cap.
    pub(crate) fn check_extent(&self, line: usize, col: usize) -> Result<(), TableError> {
        let cols = self.columns.len().max(col.saturating_add(1));
        if cols > self.options.max_cols {
            log::debug!("rejecting growth to {cols} columns");
            return Err(TableError::Capacity {
                what: "column",
                requested: cols,
                limit: self.options.max_cols,
            });
        }
        let cells = line
            .checked_add(1)
            .and_then(|rows| rows.checked_mul(cols))
            .unwrap_or(usize::MAX);
        if cells > self.options.max_cells {
            log::debug!("rejecting growth to row {line} x {cols} columns");
            return Err(TableError::Capacity {
                what: "cell",
                requested: cells,
                limit: self.options.max_cells,
            });
        }
        Ok(())
    }

    pub(crate) fn invalidate_lines(&self) {
        self.cached_lines.set(None);
    }

    pub(crate) fn mark_modified(&mut self) {
        if self.saved {
            self.saved = false;
            self.last_saved = Utc::now();
        }
    }
}
