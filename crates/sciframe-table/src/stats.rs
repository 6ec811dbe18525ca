//! NaN-aware reductions over rectangular selections.
//!
//! Every reduction resolves open ends against the current extent, then visits the selection in
//! row-major order. Missing cells and out-of-range coordinates are skipped, never reported.

use std::cmp::Ordering;

use crate::index::VectorIndex;
use crate::table::Table;
use crate::types::{is_missing, AppDir, Value, NAN};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpKind {
    Exact,
    /// Smallest value at or above the reference.
    GreaterEq,
    /// Largest value at or below the reference.
    LessEq,
}

/// How [`Table::cmp`] matches and what it returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CmpMode {
    pub kind: CmpKind,
    /// Return the matched value instead of its 1-based position.
    pub return_value: bool,
    /// Return the first qualifying candidate instead of the closest one.
    pub first_match: bool,
}

impl CmpMode {
    pub const EXACT: CmpMode = CmpMode {
        kind: CmpKind::Exact,
        return_value: false,
        first_match: false,
    };

    /// Decode the numeric mode used by the command language: `0` exact, `±1` position, `±2`
    /// value, `±3` first position, `±4` first value. Positive codes search upwards (`>=`),
    /// negative ones downwards (`<=`).
    pub fn from_code(code: i32) -> Self {
        let kind = match code.signum() {
            1 => CmpKind::GreaterEq,
            -1 => CmpKind::LessEq,
            _ => CmpKind::Exact,
        };
        let (return_value, first_match) = match code.unsigned_abs() {
            2 => (true, false),
            3 => (false, true),
            4 => (true, true),
            _ => (false, false),
        };
        Self {
            kind,
            return_value,
            first_match,
        }
    }
}

/// Quantile of ascending `sorted` data by linear interpolation at `(n - 1) * p`.
pub(crate) fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let Some(&last) = sorted.last() else {
        return f64::NAN;
    };
    let index = (sorted.len() - 1) as f64 * p;
    let lhs = index.floor() as usize;
    if lhs + 1 >= sorted.len() {
        return last;
    }
    let delta = index - lhs as f64;
    (1.0 - delta) * sorted[lhs] + delta * sorted[lhs + 1]
}

/// Median of the non-NaN values in `values`. Reorders `values`.
pub(crate) fn median(values: &mut Vec<f64>) -> f64 {
    values.retain(|v| !v.is_nan());
    values.sort_by(f64::total_cmp);
    quantile_sorted(values, 0.5)
}

impl Table {
    fn resolve_selection(
        &self,
        lines: &VectorIndex,
        cols: &VectorIndex,
    ) -> (VectorIndex, VectorIndex) {
        (
            lines.resolve(self.get_lines(false)),
            cols.resolve(self.get_cols(false)),
        )
    }

    /// Valid cells of a resolved selection with their coordinates, row-major.
    fn valid_cells<'a>(
        &'a self,
        lines: &'a VectorIndex,
        cols: &'a VectorIndex,
    ) -> impl Iterator<Item = (usize, usize, Value)> + 'a {
        lines.iter().flat_map(move |i| {
            cols.iter().filter_map(move |j| {
                let v = self.read_mem(i, j);
                (!is_missing(v)).then_some((i, j, v))
            })
        })
    }

    fn valid_values(&self, lines: &VectorIndex, cols: &VectorIndex) -> Vec<Value> {
        let (lines, cols) = self.resolve_selection(lines, cols);
        self.valid_cells(&lines, &cols).map(|(_, _, v)| v).collect()
    }

    fn valid_reals(&self, lines: &VectorIndex, cols: &VectorIndex) -> Vec<f64> {
        let (lines, cols) = self.resolve_selection(lines, cols);
        self.valid_cells(&lines, &cols).map(|(_, _, v)| v.re).collect()
    }

    /// Every in-range coordinate of the selection, missing or not.
    fn in_range_cells(&self, lines: &VectorIndex, cols: &VectorIndex) -> Vec<Value> {
        let (n_lines, n_cols) = (self.get_lines(false), self.get_cols(false));
        let (lines, cols) = self.resolve_selection(lines, cols);
        let mut out = Vec::new();
        for i in lines.iter().filter(|&i| i < n_lines) {
            for j in cols.iter().filter(|&j| j < n_cols) {
                out.push(self.read_mem(i, j));
            }
        }
        out
    }

    pub fn sum(&self, lines: &VectorIndex, cols: &VectorIndex) -> Value {
        if !self.is_valid() {
            return NAN;
        }
        self.valid_values(lines, cols).into_iter().sum()
    }

    pub fn prd(&self, lines: &VectorIndex, cols: &VectorIndex) -> Value {
        if !self.is_valid() {
            return NAN;
        }
        self.valid_values(lines, cols).into_iter().product()
    }

    pub fn avg(&self, lines: &VectorIndex, cols: &VectorIndex) -> Value {
        let values = self.valid_values(lines, cols);
        if values.is_empty() {
            return NAN;
        }
        let n = values.len() as f64;
        values.into_iter().sum::<Value>() / n
    }

    /// Population standard deviation (divides by the number of valid cells).
    pub fn std(&self, lines: &VectorIndex, cols: &VectorIndex) -> Value {
        let values = self.valid_values(lines, cols);
        if values.is_empty() {
            return NAN;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<Value>() / n;
        let sq: Value = values.iter().map(|&v| (mean - v) * (mean - v)).sum();
        (sq / n).sqrt()
    }

    /// Cell with the smallest real part; the first one wins ties.
    pub fn min(&self, lines: &VectorIndex, cols: &VectorIndex) -> Value {
        self.extremum(lines, cols, Ordering::Less)
    }

    /// Cell with the largest real part; the first one wins ties.
    pub fn max(&self, lines: &VectorIndex, cols: &VectorIndex) -> Value {
        self.extremum(lines, cols, Ordering::Greater)
    }

    fn extremum(&self, lines: &VectorIndex, cols: &VectorIndex, want: Ordering) -> Value {
        self.valid_values(lines, cols)
            .into_iter()
            .reduce(|best, v| {
                if v.re.total_cmp(&best.re) == want {
                    v
                } else {
                    best
                }
            })
            .unwrap_or(NAN)
    }

    pub fn med(&self, lines: &VectorIndex, cols: &VectorIndex) -> Value {
        let mut values = self.valid_reals(lines, cols);
        Value::new(median(&mut values), 0.0)
    }

    /// The `p` quantile for `0 < p < 1`; NaN outside that interval.
    pub fn pct(&self, lines: &VectorIndex, cols: &VectorIndex, p: f64) -> Value {
        if !(p > 0.0 && p < 1.0) {
            return NAN;
        }
        let mut values = self.valid_reals(lines, cols);
        values.sort_by(f64::total_cmp);
        Value::new(quantile_sorted(&values, p), 0.0)
    }

    /// Number of valid cells.
    pub fn num(&self, lines: &VectorIndex, cols: &VectorIndex) -> usize {
        let (lines, cols) = self.resolve_selection(lines, cols);
        self.valid_cells(&lines, &cols).count()
    }

    /// Number of in-range coordinates, valid or not.
    pub fn cnt(&self, lines: &VectorIndex, cols: &VectorIndex) -> usize {
        if !self.is_valid() {
            return 0;
        }
        self.in_range_cells(lines, cols).len()
    }

    /// `true` if there is at least one in-range cell and none is missing or zero.
    pub fn and(&self, lines: &VectorIndex, cols: &VectorIndex) -> bool {
        if !self.is_valid() {
            return false;
        }
        let cells = self.in_range_cells(lines, cols);
        !cells.is_empty() && cells.iter().all(|&v| !is_missing(v) && v != Value::new(0.0, 0.0))
    }

    /// `true` if any in-range cell is missing or non-zero.
    pub fn or(&self, lines: &VectorIndex, cols: &VectorIndex) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.in_range_cells(lines, cols).into_iter().any(truthy)
    }

    /// `true` if exactly one in-range cell is missing or non-zero.
    pub fn xor(&self, lines: &VectorIndex, cols: &VectorIndex) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.in_range_cells(lines, cols)
            .into_iter()
            .filter(|&v| truthy(v))
            .take(2)
            .count()
            == 1
    }

    /// Euclidean norm of the valid cells.
    pub fn norm(&self, lines: &VectorIndex, cols: &VectorIndex) -> Value {
        if !self.is_valid() {
            return NAN;
        }
        let sq: f64 = self
            .valid_values(lines, cols)
            .into_iter()
            .map(|v| v.norm_sqr())
            .sum();
        Value::new(sq.sqrt(), 0.0)
    }

    /// Locate `reference` in the selection.
    ///
    /// An exactly equal cell always wins immediately. Otherwise, for `GreaterEq`/`LessEq`, the
    /// closest qualifying cell is kept and later cells only replace it when strictly closer (or,
    /// with `first_match`, the first qualifying cell is returned). Positions are 1-based: the
    /// column when the row selection is a single row, the row otherwise.
    pub fn cmp(
        &self,
        lines: &VectorIndex,
        cols: &VectorIndex,
        reference: Value,
        mode: CmpMode,
    ) -> Value {
        if !self.is_valid() {
            return NAN;
        }
        let (lines, cols) = self.resolve_selection(lines, cols);
        let single_line = lines.front() == lines.last();
        let answer = |i: usize, j: usize, v: Value| {
            if mode.return_value {
                v
            } else {
                let pos = if single_line { j } else { i };
                Value::new((pos + 1) as f64, 0.0)
            }
        };

        let target = reference.re;
        let mut best: Option<(usize, usize, Value)> = None;
        for (i, j, v) in self.valid_cells(&lines, &cols) {
            if v.re == target {
                return answer(i, j, v);
            }
            let qualifies = match mode.kind {
                CmpKind::Exact => false,
                CmpKind::GreaterEq => v.re > target,
                CmpKind::LessEq => v.re < target,
            };
            if !qualifies {
                continue;
            }
            if mode.first_match {
                return answer(i, j, v);
            }
            let closer = match (best, mode.kind) {
                (None, _) => true,
                (Some((_, _, b)), CmpKind::GreaterEq) => v.re < b.re,
                (Some((_, _, b)), _) => v.re > b.re,
            };
            if closer {
                best = Some((i, j, v));
            }
        }

        best.map_or(NAN, |(i, j, v)| answer(i, j, v))
    }

    /// Extents of the table or of selected rows/columns.
    ///
    /// `All` gives `[lines, cols]`, `Grid` `[lines, cols - 2]`. `Lines` reports, per selected row,
    /// the last valid column + 1; `Cols` the length of each selected column.
    pub fn size(&self, index: &VectorIndex, dir: AppDir) -> Vec<f64> {
        if !self.is_valid() {
            return vec![0.0, 0.0];
        }
        let (n_lines, n_cols) = (self.get_lines(false), self.get_cols(false));
        let sizes: Vec<f64> = match dir {
            AppDir::All => return vec![n_lines as f64, n_cols as f64],
            AppDir::Grid => return vec![n_lines as f64, n_cols.saturating_sub(2) as f64],
            AppDir::Lines => index
                .resolve(n_lines)
                .iter()
                .filter(|&i| i < n_lines)
                .filter_map(|i| {
                    (0..n_cols)
                        .rev()
                        .find(|&j| self.is_valid_element(i, j))
                        .map(|j| (j + 1) as f64)
                })
                .collect(),
            AppDir::Cols => index
                .resolve(n_cols)
                .iter()
                .filter(|&j| j < n_cols)
                .map(|j| self.column(j).map_or(0, |c| c.len()) as f64)
                .collect(),
        };
        if sizes.is_empty() {
            vec![f64::NAN]
        } else {
            sizes
        }
    }

    /// 1-based position of the first minimum; see [`Table::maxpos`].
    pub fn minpos(&self, index: &VectorIndex, dir: AppDir) -> Vec<f64> {
        self.extremum_pos(index, dir, Ordering::Less)
    }

    /// 1-based position of the first maximum.
    ///
    /// `Cols` gives the row per selected column, `Lines` the column per selected row. `All` and
    /// `Grid` give `[row, col]` of the global extremum across the selected rows; `Grid` ignores
    /// the two axis columns.
    pub fn maxpos(&self, index: &VectorIndex, dir: AppDir) -> Vec<f64> {
        self.extremum_pos(index, dir, Ordering::Greater)
    }

    fn extremum_pos(&self, index: &VectorIndex, dir: AppDir, want: Ordering) -> Vec<f64> {
        if !self.is_valid() {
            return vec![f64::NAN];
        }
        let (n_lines, n_cols) = (self.get_lines(false), self.get_cols(false));
        let first_col = if dir == AppDir::Grid { 2 } else { 0 };
        let better = |v: f64, best: f64| v.total_cmp(&best) == want;

        if dir == AppDir::Cols {
            let lines = VectorIndex::all().resolve(n_lines);
            let pos: Vec<f64> = index
                .resolve(n_cols)
                .iter()
                .filter(|&j| j < n_cols)
                .map(|j| {
                    let col = VectorIndex::single(j);
                    let mut best: Option<(usize, f64)> = None;
                    for (i, _, v) in self.valid_cells(&lines, &col) {
                        if best.map_or(true, |(_, b)| better(v.re, b)) {
                            best = Some((i, v.re));
                        }
                    }
                    best.map_or(f64::NAN, |(i, _)| (i + 1) as f64)
                })
                .collect();
            return if pos.is_empty() { vec![f64::NAN] } else { pos };
        }

        let cols = VectorIndex::open_end(first_col).resolve(n_cols);
        let mut per_row = Vec::new();
        let mut global: Option<(usize, usize, f64)> = None;
        for i in index.resolve(n_lines).iter().filter(|&i| i < n_lines) {
            let line = VectorIndex::single(i);
            let mut best: Option<(usize, f64)> = None;
            for (_, j, v) in self.valid_cells(&line, &cols) {
                if best.map_or(true, |(_, b)| better(v.re, b)) {
                    best = Some((j, v.re));
                }
            }
            match best {
                Some((j, b)) => {
                    per_row.push((j + 1) as f64);
                    if global.map_or(true, |(_, _, g)| better(b, g)) {
                        global = Some((i, j, b));
                    }
                }
                None => per_row.push(f64::NAN),
            }
        }

        match dir {
            AppDir::All | AppDir::Grid => match global {
                Some((i, j, _)) => vec![(i + 1) as f64, (j + 1) as f64],
                None => vec![f64::NAN],
            },
            _ if per_row.is_empty() => vec![f64::NAN],
            _ => per_row,
        }
    }
}

/// Missing or non-zero.
fn truthy(v: Value) -> bool {
    is_missing(v) || v != Value::new(0.0, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let data = [1.0, 2.0, 4.0, 8.0];
        assert_eq!(quantile_sorted(&data, 0.5), 3.0);
        assert_eq!(quantile_sorted(&data, 0.0), 1.0);
        assert_eq!(quantile_sorted(&data, 1.0), 8.0);
        assert!((quantile_sorted(&data, 0.25) - 1.75).abs() < 1e-12);
        assert!(quantile_sorted(&[], 0.5).is_nan());
    }

    #[test]
    fn median_ignores_nan() {
        let mut v = vec![f64::NAN, 5.0, 1.0, 3.0];
        assert_eq!(median(&mut v), 3.0);
        let mut v = vec![f64::NAN];
        assert!(median(&mut v).is_nan());
    }

    #[test]
    fn cmp_codes_decode() {
        assert_eq!(CmpMode::from_code(0), CmpMode::EXACT);
        let m = CmpMode::from_code(-4);
        assert_eq!(m.kind, CmpKind::LessEq);
        assert!(m.return_value && m.first_match);
        let m = CmpMode::from_code(1);
        assert_eq!(m.kind, CmpKind::GreaterEq);
        assert!(!m.return_value && !m.first_match);
    }
}
