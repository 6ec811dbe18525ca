//! Gap filling ("retouch") of missing cells.
//!
//! One-dimensional retouching interpolates along single rows or columns. Two-dimensional
//! retouching grows a [`Boundary`] around every missing cell until its edges are complete (or hit
//! the selection), then fills its interior from a [`RetouchRegion`] blended with the local 3x3
//! median. Every missing cell runs its own boundary search.

use crate::error::TableError;
use crate::index::VectorIndex;
use crate::stats::median;
use crate::table::Table;
use crate::types::{is_missing, AppDir, Value};

/// Rectangle `rf..=re` x `cf..=ce` whose interior is to be filled. Coordinates may lie one step
/// outside the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Boundary {
    pub row: i64,
    pub col: i64,
    pub rows: i64,
    pub cols: i64,
}

impl Boundary {
    /// The 3x3 frame around `(row, col)`.
    pub fn around(row: i64, col: i64) -> Self {
        Self {
            row: row - 1,
            col: col - 1,
            rows: 2,
            cols: 2,
        }
    }

    pub fn rf(&self) -> i64 {
        self.row
    }

    pub fn re(&self) -> i64 {
        self.row + self.rows
    }

    pub fn cf(&self) -> i64 {
        self.col
    }

    pub fn ce(&self) -> i64 {
        self.col + self.cols
    }
}

/// Fill model for the `rows x cols` interior of a boundary.
///
/// The model averages a horizontal blend of the left/right edges with a vertical blend of the
/// top/bottom edges. Edge samples that are missing fall back to a constant.
#[derive(Clone, Debug, PartialEq)]
pub struct RetouchRegion {
    rows: usize,
    cols: usize,
    fallback: f64,
    left: Vec<f64>,
    right: Vec<f64>,
    top: Vec<f64>,
    bottom: Vec<f64>,
}

impl RetouchRegion {
    pub fn new(rows: usize, cols: usize, fallback: f64) -> Self {
        Self {
            rows,
            cols,
            fallback,
            left: vec![fallback; rows + 2],
            right: vec![fallback; rows + 2],
            top: vec![fallback; cols + 2],
            bottom: vec![fallback; cols + 2],
        }
    }

    /// Set the four edges including their corners: `left`/`right` hold `rows + 2` samples,
    /// `top`/`bottom` `cols + 2`. Short edges are padded with the fallback.
    pub fn set_boundaries(&mut self, left: &[f64], right: &[f64], top: &[f64], bottom: &[f64]) {
        let fallback = self.fallback;
        let fill = |dst: &mut Vec<f64>, src: &[f64]| {
            for (k, d) in dst.iter_mut().enumerate() {
                *d = src.get(k).copied().filter(|v| !v.is_nan()).unwrap_or(fallback);
            }
        };
        fill(&mut self.left, left);
        fill(&mut self.right, right);
        fill(&mut self.top, top);
        fill(&mut self.bottom, bottom);
    }

    pub fn model(&self, i: usize, j: usize) -> f64 {
        let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
        let tx = (j + 1) as f64 / (self.cols + 1) as f64;
        let ty = (i + 1) as f64 / (self.rows + 1) as f64;
        let horizontal = lerp(self.left[i + 1], self.right[i + 1], tx);
        let vertical = lerp(self.top[j + 1], self.bottom[j + 1], ty);
        0.5 * (horizontal + vertical)
    }

    /// Keep `value` if present, otherwise blend the model with `local_median`.
    pub fn retouch(&self, i: usize, j: usize, value: Value, local_median: f64) -> Value {
        if !is_missing(value) {
            return value;
        }
        let model = self.model(i, j);
        let filled = if local_median.is_nan() {
            model
        } else {
            0.5 * (model + local_median)
        };
        Value::new(filled, 0.0)
    }
}

/// One-dimensional gap filling in place. Returns `true` if any cell changed.
///
/// Interior runs become the arithmetic progression between their neighbours, a leading run copies
/// the first valid value and a trailing run the last one. A line without any valid value is left
/// alone.
pub fn fill_gaps(line: &mut [Value]) -> bool {
    let mut changed = false;
    let mut prev: Option<usize> = None;
    let mut k = 0;
    while k < line.len() {
        if !is_missing(line[k]) {
            prev = Some(k);
            k += 1;
            continue;
        }
        let start = k;
        while k < line.len() && is_missing(line[k]) {
            k += 1;
        }
        let next = (k < line.len()).then_some(k);
        match (prev, next) {
            (Some(p), Some(q)) => {
                let (a, b) = (line[p], line[q]);
                let span = (q - p) as f64;
                for (n, cell) in line.iter_mut().enumerate().take(q).skip(start) {
                    *cell = a + (b - a) * ((n - p) as f64 / span);
                }
            }
            (None, Some(q)) => {
                let b = line[q];
                line[start..q].fill(b);
            }
            (Some(p), None) => {
                let a = line[p];
                line[start..].fill(a);
            }
            (None, None) => continue,
        }
        changed = true;
    }
    changed
}

impl Table {
    /// Fill missing cells of a block. Returns `true` if any cell was filled.
    ///
    /// `All`/`Grid` retouch in two dimensions but fall back to `Lines` for fewer than four rows
    /// and to `Cols` for fewer than four columns. An open-ended row selection stops at the end of
    /// the longest selected column. `Grid` first fills its two axis columns column-wise.
    pub fn retouch(
        &mut self,
        lines: &VectorIndex,
        cols: &VectorIndex,
        dir: AppDir,
    ) -> Result<bool, TableError> {
        lines.validate()?;
        cols.validate()?;
        if !self.is_valid() {
            return Ok(false);
        }
        let (n_lines, n_cols) = (self.get_lines(false), self.get_cols(false));
        let open_end = lines.is_open_end();
        let mut lines = lines.clamp(0, n_lines - 1);
        let mut cols = cols.clamp(0, n_cols - 1);

        let mut dir = dir;
        if matches!(dir, AppDir::All | AppDir::Grid) && lines.len() < 4 {
            log::debug!("retouch: {} rows are too few for 2-D, using rows", lines.len());
            dir = AppDir::Lines;
        }
        if matches!(dir, AppDir::All | AppDir::Grid) && cols.len() < 4 {
            log::debug!("retouch: {} columns are too few for 2-D, using columns", cols.len());
            dir = AppDir::Cols;
        }

        if open_end {
            let longest = cols
                .iter()
                .filter_map(|j| self.column(j).map(|c| c.len()))
                .max()
                .unwrap_or(0);
            if longest == 0 {
                return Ok(false);
            }
            lines = lines.clamp(0, longest - 1);
        }

        let mut changed = false;
        if dir == AppDir::Grid {
            changed |= self.retouch_1d(&lines, &cols.sub_index(0, Some(2)), AppDir::Cols);
            cols = cols.sub_index(2, None);
        }
        changed |= match dir {
            AppDir::All | AppDir::Grid => self.retouch_2d(&lines.linearize(), &cols.linearize()),
            _ => self.retouch_1d(&lines, &cols, dir),
        };

        if changed {
            self.invalidate_lines();
            self.mark_modified();
        }
        Ok(changed)
    }

    fn retouch_1d(&mut self, lines: &VectorIndex, cols: &VectorIndex, dir: AppDir) -> bool {
        let mut changed = false;
        let (outer, inner) = if dir == AppDir::Lines {
            (lines, cols)
        } else {
            (cols, lines)
        };
        for o in outer {
            let cell = |k: usize| if dir == AppDir::Lines { (o, k) } else { (k, o) };
            let mut line: Vec<Value> = inner
                .iter()
                .map(|k| {
                    let (i, j) = cell(k);
                    self.read_mem(i, j)
                })
                .collect();
            let before = line.clone();
            if !fill_gaps(&mut line) {
                continue;
            }
            for ((k, old), new) in inner.iter().zip(before).zip(line) {
                if is_missing(old) && !is_missing(new) {
                    let (i, j) = cell(k);
                    self.column_mut(j).set(i, new);
                }
            }
            changed = true;
        }
        changed
    }

    fn retouch_2d(&mut self, lines: &VectorIndex, cols: &VectorIndex) -> bool {
        let mut changed = false;
        let (i0, i1) = (lines.front() as i64, lines.last() as i64);
        let (j0, j1) = (cols.front() as i64, cols.last() as i64);

        for i in i0..=i1 {
            for j in j0..=j1 {
                if !is_missing(self.read_signed(i, j)) {
                    continue;
                }
                let b = self.find_valid_boundary((i0, i1), (j0, j1), i, j);
                let fallback = median(&mut self.rect_reals(b.rf(), b.re(), b.cf(), b.ce()));
                if fallback.is_nan() {
                    continue;
                }
                let mut region =
                    RetouchRegion::new((b.rows - 1) as usize, (b.cols - 1) as usize, fallback);

                // An edge outside the selection is replaced by the opposite one.
                let l = if b.cf() < j0 { b.ce() } else { b.cf() };
                let r = if b.ce() > j1 { b.cf() } else { b.ce() };
                let t = if b.rf() < i0 { b.re() } else { b.rf() };
                let btm = if b.re() > i1 { b.rf() } else { b.re() };
                region.set_boundaries(
                    &self.rect_reals(b.rf(), b.re(), l, l),
                    &self.rect_reals(b.rf(), b.re(), r, r),
                    &self.rect_reals(t, t, b.cf(), b.ce()),
                    &self.rect_reals(btm, btm, b.cf(), b.ce()),
                );

                for n in b.rf() + 1..b.re() {
                    for m in b.cf() + 1..b.ce() {
                        let local = median(&mut self.rect_reals(n - 1, n + 1, m - 1, m + 1));
                        let value = region.retouch(
                            (n - b.rf() - 1) as usize,
                            (m - b.cf() - 1) as usize,
                            self.read_signed(n, m),
                            local,
                        );
                        self.column_mut(m as usize).set(n as usize, value);
                    }
                }
                changed = true;
            }
        }
        changed
    }

    /// Grow the 3x3 frame around `(i, j)` until each edge holds only valid in-range cells or has
    /// reached the selection limits.
    fn find_valid_boundary(
        &self,
        rows: (i64, i64),
        cols: (i64, i64),
        i: i64,
        j: i64,
    ) -> Boundary {
        let mut b = Boundary::around(i, j);
        loop {
            let mut grown = false;
            if b.cf() > cols.0 && !self.all_valid(b.rf(), b.re(), b.cf(), b.cf()) {
                b.col -= 1;
                b.cols += 1;
                grown = true;
            }
            if b.ce() < cols.1 && !self.all_valid(b.rf(), b.re(), b.ce(), b.ce()) {
                b.cols += 1;
                grown = true;
            }
            if b.rf() > rows.0 && !self.all_valid(b.rf(), b.rf(), b.cf(), b.ce()) {
                b.row -= 1;
                b.rows += 1;
                grown = true;
            }
            if b.re() < rows.1 && !self.all_valid(b.re(), b.re(), b.cf(), b.ce()) {
                b.rows += 1;
                grown = true;
            }
            if !grown {
                return b;
            }
        }
    }

    /// Every in-range cell of the rectangle is valid.
    fn all_valid(&self, r0: i64, r1: i64, c0: i64, c1: i64) -> bool {
        let (n_lines, n_cols) = (self.get_lines(false) as i64, self.get_cols(false) as i64);
        (r0.max(0)..=r1.min(n_lines - 1)).all(|r| {
            (c0.max(0)..=c1.min(n_cols - 1)).all(|c| !is_missing(self.read_signed(r, c)))
        })
    }

    /// Real parts of the rectangle, row-major, NaN for missing or out-of-range cells.
    fn rect_reals(&self, r0: i64, r1: i64, c0: i64, c1: i64) -> Vec<f64> {
        let mut out = Vec::new();
        for r in r0..=r1 {
            for c in c0..=c1 {
                let v = self.read_signed(r, c);
                out.push(if is_missing(v) { f64::NAN } else { v.re });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(values: &[f64]) -> Vec<Value> {
        values.iter().map(|&v| Value::new(v, 0.0)).collect()
    }

    fn reals(values: &[Value]) -> Vec<f64> {
        values.iter().map(|v| v.re).collect()
    }

    #[test]
    fn interior_run_becomes_arithmetic_progression() {
        let mut v = line(&[1.0, f64::NAN, f64::NAN, f64::NAN, 9.0]);
        assert!(fill_gaps(&mut v));
        assert_eq!(reals(&v), vec![1.0, 3.0, 5.0, 7.0, 9.0]);
    }

    #[test]
    fn edge_runs_copy_nearest_value() {
        let mut v = line(&[f64::NAN, f64::NAN, 4.0, 5.0, f64::NAN]);
        assert!(fill_gaps(&mut v));
        assert_eq!(reals(&v), vec![4.0, 4.0, 4.0, 5.0, 5.0]);

        let mut v = line(&[f64::NAN, 2.0]);
        assert!(fill_gaps(&mut v));
        assert_eq!(reals(&v), vec![2.0, 2.0]);
    }

    #[test]
    fn all_missing_line_is_untouched() {
        let mut v = line(&[f64::NAN, f64::NAN]);
        assert!(!fill_gaps(&mut v));
        assert!(v.iter().all(|c| is_missing(*c)));
        let mut v = line(&[1.0, 2.0]);
        assert!(!fill_gaps(&mut v));
    }

    #[test]
    fn region_blends_edges_and_median() {
        let mut region = RetouchRegion::new(1, 1, 0.0);
        region.set_boundaries(&[2.0; 3], &[4.0; 3], &[1.0; 3], &[5.0, f64::NAN, 5.0]);
        // Horizontal blend gives 3; vertical blend between 1 and the fallback 0 gives 0.5.
        assert_eq!(region.model(0, 0), 1.75);
        assert_eq!(region.retouch(0, 0, crate::types::NAN, f64::NAN).re, 1.75);
        assert_eq!(region.retouch(0, 0, crate::types::NAN, 2.25).re, 2.0);
        assert_eq!(region.retouch(0, 0, Value::new(7.0, 0.0), 2.25).re, 7.0);
    }

    #[test]
    fn boundary_edges() {
        let b = Boundary::around(5, 3);
        assert_eq!((b.rf(), b.re(), b.cf(), b.ce()), (4, 6, 2, 4));
    }
}
