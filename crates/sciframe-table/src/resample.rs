use sciframe_resample::{BoundaryOp, Kernel, Resampler, ResamplerConfig, Status};

use crate::column::Column;
use crate::error::TableError;
use crate::index::VectorIndex;
use crate::table::{default_headline, Table};
use crate::types::{is_missing, AppDir, Value, NAN};

impl Table {
    /// Resample a block to `samples` samples along the axes given by `dir`.
    ///
    /// `Cols` resamples each column, `Lines` each row and `All`/`Grid` both axes to a
    /// `samples x samples` block. `Grid` expects the first two selected columns to hold the axis
    /// values (resampled column-wise first) and the remaining columns to form a square matrix
    /// with one row per selected line.
    ///
    /// Data after the block moves so that it sits directly after the new block: below it only in
    /// the block columns, and right of it only in the block rows when the column count shrinks.
    /// Growing the column count moves whole columns to the right. Cells outside the block and
    /// outside those shifted ranges keep their position. The table only grows.
    pub fn resample(
        &mut self,
        lines: &VectorIndex,
        cols: &VectorIndex,
        samples: usize,
        dir: AppDir,
    ) -> Result<(), TableError> {
        if !self.is_valid() {
            return Err(TableError::ResampleConfig("table holds no data".into()));
        }
        if samples == 0 {
            return Err(TableError::ResampleConfig(
                "requested sample count is zero".into(),
            ));
        }
        lines.validate()?;
        cols.validate()?;

        let (n_lines, n_cols) = (self.get_lines(false), self.get_cols(false));
        let open_end = cols.is_open_end();
        let mut lines = lines.clamp(0, n_lines - 1).linearize();
        let mut cols = cols.clamp(0, n_cols - 1);

        let mut dir = dir;
        if matches!(dir, AppDir::All | AppDir::Grid) && lines.len() < 4 {
            log::debug!("resample: {} rows are too few for 2-D, using rows", lines.len());
            dir = AppDir::Lines;
        }
        if matches!(dir, AppDir::All | AppDir::Grid) && cols.len() < 4 {
            log::debug!("resample: {} columns are too few for 2-D, using columns", cols.len());
            dir = AppDir::Cols;
        }

        if open_end {
            let longest = cols
                .iter()
                .filter_map(|j| self.column(j).map(Column::len))
                .max()
                .unwrap_or(0);
            lines = lines.clamp(0, longest.saturating_sub(1));
        }
        if lines.is_empty() || cols.is_empty() {
            return Err(TableError::ResampleConfig("selection holds no data".into()));
        }

        if dir == AppDir::Grid {
            if cols.len() - 2 != lines.len() {
                return Err(TableError::ResampleConfig(format!(
                    "grid of {} rows needs {} columns, got {}",
                    lines.len(),
                    lines.len() + 2,
                    cols.len()
                )));
            }
            self.resample(&lines, &cols.sub_index(0, Some(2)), samples, AppDir::Cols)?;
            cols = cols.sub_index(2, None);
        }
        let cols = cols.linearize();

        let (dst_x, dst_y) = match dir {
            AppDir::All | AppDir::Grid => (samples, samples),
            AppDir::Cols => (cols.len(), samples),
            AppDir::Lines => (samples, lines.len()),
        };
        self.resample_block(&lines, &cols, dst_x, dst_y)
    }

    fn resample_block(
        &mut self,
        lines: &VectorIndex,
        cols: &VectorIndex,
        dst_x: usize,
        dst_y: usize,
    ) -> Result<(), TableError> {
        let (r0, src_y) = (lines.front(), lines.len());
        let (c0, src_x) = (cols.front(), cols.len());
        let grow_x = dst_x.saturating_sub(src_x);
        let new_lines = self.get_lines(false) + dst_y.saturating_sub(src_y);
        let new_cols = self.columns.len() + grow_x;
        self.check_extent(new_lines - 1, new_cols - 1)?;

        let block = self.run_resampler(lines, cols, dst_x, dst_y)?;

        let mut old = std::mem::take(&mut self.columns);
        let mut columns: Vec<Option<Column>> = Vec::with_capacity(new_cols);
        for k in 0..new_cols {
            if k < c0 {
                columns.push(old.get_mut(k).and_then(Option::take));
            } else if k < c0 + dst_x {
                let x = k - c0;
                // Output columns beyond the source block have no rows outside it.
                let base = match old.get_mut(k) {
                    Some(slot) if x < src_x => slot.take(),
                    _ => None,
                };
                columns.push(Some(splice_column(base, k, r0, src_y, &block, x)));
            } else {
                // Growth moves whole columns; shrinking keeps them in their slots.
                columns.push(old.get_mut(k - grow_x).and_then(Option::take));
            }
        }
        self.columns = columns;

        if dst_x < src_x {
            self.pull_rows_left(r0..r0 + src_y, c0 + dst_x, src_x - dst_x);
        }

        self.invalidate_lines();
        self.mark_modified();
        Ok(())
    }

    /// Within `rows`, move every cell from column `first + by` onwards `by` columns to the left.
    /// Rows outside `rows` are not touched.
    fn pull_rows_left(&mut self, rows: std::ops::Range<usize>, first: usize, by: usize) {
        for k in first..self.columns.len() {
            for i in rows.clone() {
                let value = self.read_mem(i, k + by);
                if !is_missing(value) || self.column(k).is_some() {
                    self.column_mut(k).set(i, value);
                }
            }
        }
    }

    /// Feed the block line by line through the resampler and collect its `dst_y` output lines.
    fn run_resampler(
        &self,
        lines: &VectorIndex,
        cols: &VectorIndex,
        dst_x: usize,
        dst_y: usize,
    ) -> Result<Vec<Vec<Value>>, TableError> {
        let config = ResamplerConfig {
            boundary: BoundaryOp::Clamp,
            kernel: Kernel::Lanczos {
                lobes: self.options().lanczos_lobes,
            },
            filter_scale: 1.0,
            scan_buffer_lines: self.options().scan_buffer_lines,
        };
        let mut resampler = Resampler::new(cols.len(), lines.len(), dst_x, dst_y, config)?;
        let mut out = Vec::with_capacity(dst_y);
        let drain = |resampler: &mut Resampler, out: &mut Vec<Vec<Value>>| {
            while let Some(line) = resampler.get_line() {
                out.push(line.to_vec());
            }
        };

        let mut input = Vec::with_capacity(cols.len());
        for i in lines {
            input.clear();
            input.extend(cols.iter().map(|j| self.read_mem(i, j)));
            if resampler.put_line(&input) {
                continue;
            }
            if resampler.status() != Status::ScanBufferFull {
                return Err(TableError::ResamplerInternal(format!(
                    "line {i} rejected with status {:?}",
                    resampler.status()
                )));
            }
            log::debug!("resample: scan buffer full at line {i}, draining");
            drain(&mut resampler, &mut out);
            if !resampler.put_line(&input) {
                return Err(TableError::ResamplerInternal(format!(
                    "line {i} rejected after draining the scan buffer"
                )));
            }
        }
        drain(&mut resampler, &mut out);

        if out.len() != dst_y {
            return Err(TableError::ResamplerInternal(format!(
                "expected {dst_y} output lines, got {}",
                out.len()
            )));
        }
        Ok(out)
    }
}

/// Rows above the block from `base`, then column `x` of `block`, then the rows of `base` that
/// followed the old block, moved up or down to sit directly after the new one. Without a `base` the column gets the default headline for slot `col`.
fn splice_column(
    base: Option<Column>,
    col: usize,
    r0: usize,
    src_y: usize,
    block: &[Vec<Value>],
    x: usize,
) -> Column {
    let (headline, old) = match base {
        Some(col) => (col.headline().to_owned(), col.values().to_vec()),
        None => (default_headline(col), Vec::new()),
    };
    let tail = old.get(r0 + src_y..).unwrap_or_default();
    let mut values = Vec::with_capacity(r0 + block.len() + tail.len());
    values.extend((0..r0).map(|i| old.get(i).copied().unwrap_or(NAN)));
    values.extend(block.iter().map(|line| line[x]));
    values.extend_from_slice(tail);
    Column::from_values(headline, values)
}
