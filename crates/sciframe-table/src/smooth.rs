use crate::error::TableError;
use crate::index::VectorIndex;
use crate::table::Table;
use crate::types::{is_missing, AppDir, Value};

/// Convolution window used by [`Table::smooth`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmoothFilter {
    /// Equal weights.
    Average,
    /// Weights falling linearly from the centre: `h + 1 - |k|` for a half width `h`.
    WeightedLinear,
    /// Gaussian weights with `sigma = alpha * h / 2`.
    Gaussian,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothOptions {
    pub filter: SmoothFilter,
    /// Window height in rows. Even sizes are widened by one.
    pub rows: usize,
    /// Window width in columns. Even sizes are widened by one.
    pub cols: usize,
    /// Width scale of the Gaussian window.
    pub alpha: f64,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self {
            filter: SmoothFilter::WeightedLinear,
            rows: 3,
            cols: 1,
            alpha: 1.0,
        }
    }
}

impl SmoothFilter {
    /// Unnormalized weights of a window of `size` taps, `size` odd.
    fn weights(self, size: usize, alpha: f64) -> Vec<f64> {
        let h = (size / 2) as f64;
        (0..size)
            .map(|n| {
                let k = (n as f64 - h).abs();
                match self {
                    Self::Average => 1.0,
                    Self::WeightedLinear => h + 1.0 - k,
                    Self::Gaussian if h == 0.0 => 1.0,
                    Self::Gaussian => {
                        let sigma = alpha * h / 2.0;
                        (-(k * k) / (2.0 * sigma * sigma)).exp()
                    }
                }
            })
            .collect()
    }
}

fn odd(size: usize) -> usize {
    size.max(1) | 1
}

/// Convolve `line` with `weights`, repeating the end cells past both ends.
///
/// Missing cells stay missing and contribute nothing; the weights of the cells that do
/// contribute are renormalized.
fn convolve(line: &[Value], weights: &[f64]) -> Vec<Value> {
    let h = weights.len() / 2;
    let last = line.len().saturating_sub(1);
    line.iter()
        .enumerate()
        .map(|(i, &center)| {
            if is_missing(center) {
                return center;
            }
            let mut sum = Value::new(0.0, 0.0);
            let mut total = 0.0;
            for (n, &w) in weights.iter().enumerate() {
                let x = line[(i + n).saturating_sub(h).min(last)];
                if !is_missing(x) {
                    sum += x * w;
                    total += w;
                }
            }
            sum / total
        })
        .collect()
}

/// `p - shift` reflected back into `0..len` at both ends.
fn mirror(p: usize, shift: usize, len: usize) -> usize {
    let last = len - 1;
    let p = if p < shift { shift - p } else { p - shift };
    if p > last {
        (2 * last).saturating_sub(p)
    } else {
        p
    }
}

/// Two-dimensional counterpart of [`convolve`] with the outer product of `row_weights` and
/// `col_weights`, mirroring the block at its edges.
fn convolve_2d(grid: &[Vec<Value>], row_weights: &[f64], col_weights: &[f64]) -> Vec<Vec<Value>> {
    let (hr, hc) = (row_weights.len() / 2, col_weights.len() / 2);
    let height = grid.len();
    let width = grid.first().map_or(0, Vec::len);
    (0..height)
        .map(|i| {
            (0..width)
                .map(|j| {
                    let center = grid[i][j];
                    if is_missing(center) {
                        return center;
                    }
                    let mut sum = Value::new(0.0, 0.0);
                    let mut total = 0.0;
                    for (n, &a) in row_weights.iter().enumerate() {
                        let row = &grid[mirror(i + n, hr, height)];
                        for (m, &b) in col_weights.iter().enumerate() {
                            let x = row[mirror(j + m, hc, width)];
                            if !is_missing(x) {
                                let w = a * b;
                                sum += x * w;
                                total += w;
                            }
                        }
                    }
                    sum / total
                })
                .collect()
        })
        .collect()
}

impl Table {
    /// Smooth a block with a convolution window.
    ///
    /// `Cols` smooths along each column and `Lines` along each row, both with a window of
    /// `max(rows, cols)` taps. `All`/`Grid` first retouch the block and then apply a
    /// `rows x cols` window; a window of height or width one takes the other size. They fall
    /// back to `Lines` for fewer than four rows and to `Cols` for fewer than four columns, and
    /// `Grid` smooths its two axis columns column-wise first. Missing cells are neither filled
    /// nor used by the 1-D filters.
    pub fn smooth(
        &mut self,
        lines: &VectorIndex,
        cols: &VectorIndex,
        options: &SmoothOptions,
        dir: AppDir,
    ) -> Result<(), TableError> {
        if !self.is_valid() {
            return Err(TableError::SmoothConfig("table holds no data".into()));
        }
        lines.validate()?;
        cols.validate()?;
        if options.filter == SmoothFilter::Gaussian
            && !(options.alpha.is_finite() && options.alpha > 0.0)
        {
            return Err(TableError::SmoothConfig(format!(
                "gaussian width scale must be positive, got {}",
                options.alpha
            )));
        }

        let (n_lines, n_cols) = (self.get_lines(false), self.get_cols(false));
        let open_end = lines.is_open_end();
        let mut lines = lines.clamp(0, n_lines - 1);
        let mut cols = cols.clamp(0, n_cols - 1);

        let mut dir = dir;
        if matches!(dir, AppDir::All | AppDir::Grid) && lines.len() < 4 {
            log::debug!("smooth: {} rows are too few for 2-D, using rows", lines.len());
            dir = AppDir::Lines;
        }
        if matches!(dir, AppDir::All | AppDir::Grid) && cols.len() < 4 {
            log::debug!("smooth: {} columns are too few for 2-D, using columns", cols.len());
            dir = AppDir::Cols;
        }

        let (height, width) = match dir {
            AppDir::All | AppDir::Grid => match (options.rows, options.cols) {
                (1, c) => (c, c),
                (r, 1) => (r, r),
                rc => rc,
            },
            _ => (options.rows.max(options.cols), 1),
        };
        let (height, width) = (odd(height), odd(width));
        let too_large = match dir {
            AppDir::Cols => height >= n_lines,
            AppDir::Lines => height >= n_cols,
            AppDir::All | AppDir::Grid => height >= n_lines || width >= n_cols,
        };
        if too_large {
            return Err(TableError::SmoothConfig(format!(
                "window of {height} x {width} does not fit a table of {n_lines} x {n_cols}"
            )));
        }

        if open_end {
            let longest = cols
                .iter()
                .filter_map(|j| self.column(j).map(|c| c.len()))
                .max()
                .unwrap_or(0);
            if longest == 0 {
                return Ok(());
            }
            lines = lines.clamp(0, longest - 1);
        }

        if dir == AppDir::Grid {
            self.smooth(&lines, &cols.sub_index(0, Some(2)), options, AppDir::Cols)?;
            cols = cols.sub_index(2, None);
        }

        match dir {
            AppDir::All | AppDir::Grid => {
                let (lines, cols) = (lines.linearize(), cols.linearize());
                self.retouch(&lines, &cols, AppDir::All)?;
                let row_weights = options.filter.weights(height, options.alpha);
                let col_weights = options.filter.weights(width, options.alpha);
                self.smooth_2d(&lines, &cols, &row_weights, &col_weights);
            }
            _ => {
                let weights = options.filter.weights(height, options.alpha);
                self.smooth_1d(&lines, &cols, dir, &weights);
            }
        }

        self.mark_modified();
        Ok(())
    }

    fn smooth_1d(&mut self, lines: &VectorIndex, cols: &VectorIndex, dir: AppDir, weights: &[f64]) {
        let (outer, inner) = if dir == AppDir::Lines {
            (lines, cols)
        } else {
            (cols, lines)
        };
        for o in outer {
            let cell = |k: usize| if dir == AppDir::Lines { (o, k) } else { (k, o) };
            let line: Vec<Value> = inner
                .iter()
                .map(|k| {
                    let (i, j) = cell(k);
                    self.read_mem(i, j)
                })
                .collect();
            let smoothed = convolve(&line, weights);
            for ((k, old), new) in inner.iter().zip(line).zip(smoothed) {
                if !is_missing(old) {
                    let (i, j) = cell(k);
                    self.column_mut(j).set(i, new);
                }
            }
        }
    }

    fn smooth_2d(
        &mut self,
        lines: &VectorIndex,
        cols: &VectorIndex,
        row_weights: &[f64],
        col_weights: &[f64],
    ) {
        let grid: Vec<Vec<Value>> = lines
            .iter()
            .map(|i| cols.iter().map(|j| self.read_mem(i, j)).collect())
            .collect();
        let smoothed = convolve_2d(&grid, row_weights, col_weights);
        for ((i, old_row), new_row) in lines.iter().zip(&grid).zip(smoothed) {
            for ((j, old), new) in cols.iter().zip(old_row).zip(new_row) {
                if !is_missing(*old) {
                    self.column_mut(j).set(i, new);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_sizes_are_made_odd() {
        assert_eq!(odd(0), 1);
        assert_eq!(odd(4), 5);
        assert_eq!(odd(5), 5);
    }

    #[test]
    fn weights_peak_in_the_centre() {
        assert_eq!(SmoothFilter::WeightedLinear.weights(5, 1.0), vec![1.0, 2.0, 3.0, 2.0, 1.0]);
        assert_eq!(SmoothFilter::Average.weights(3, 1.0), vec![1.0; 3]);
        let g = SmoothFilter::Gaussian.weights(5, 1.0);
        assert_eq!(g[2], 1.0);
        assert_eq!(g[1], g[3]);
        assert!(g[0] < g[1]);
    }

    #[test]
    fn mirror_reflects_at_both_ends() {
        assert_eq!(mirror(0, 1, 4), 1);
        assert_eq!(mirror(1, 1, 4), 0);
        assert_eq!(mirror(5, 1, 4), 2);
        assert_eq!(mirror(0, 9, 4), 0);
    }
}
