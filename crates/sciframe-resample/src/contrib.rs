use crate::error::ResampleError;
use crate::kernel::Kernel;

/// How kernel taps falling outside the source extent are mapped back into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryOp {
    /// Repeat the first/last sample.
    #[default]
    Clamp,
    /// Treat the source as periodic.
    Wrap,
    /// Mirror around the edge samples.
    Reflect,
}

impl BoundaryOp {
    pub(crate) fn map(self, j: i64, len: usize) -> usize {
        let len_i = len as i64;
        let n = if j < 0 {
            match self {
                BoundaryOp::Reflect => (-j).min(len_i - 1),
                BoundaryOp::Wrap => j.rem_euclid(len_i),
                BoundaryOp::Clamp => 0,
            }
        } else if j >= len_i {
            match self {
                BoundaryOp::Reflect => ((len_i - j) + (len_i - 1)).max(0),
                BoundaryOp::Wrap => j.rem_euclid(len_i),
                BoundaryOp::Clamp => len_i - 1,
            }
        } else {
            j
        };
        n as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Contrib {
    pub pixel: usize,
    pub weight: f64,
}

/// Per-output-sample list of weighted source taps along one axis.
#[derive(Debug, Clone)]
pub(crate) struct ContribList {
    rows: Vec<Vec<Contrib>>,
}

impl ContribList {
    pub(crate) fn build(
        src: usize,
        dst: usize,
        boundary: BoundaryOp,
        kernel: Kernel,
        filter_scale: f64,
    ) -> Result<Self, ResampleError> {
        const NUDGE: f64 = 0.5;

        let scale = dst as f64 / src as f64;
        let downsampling = scale < 1.0;
        let half_width = if downsampling {
            kernel.support() / scale * filter_scale
        } else {
            kernel.support() * filter_scale
        };
        let tap_weight = |center: f64, j: i64| {
            let dist = center - j as f64;
            if downsampling {
                kernel.weight(dist * scale / filter_scale)
            } else {
                kernel.weight(dist / filter_scale)
            }
        };

        let mut rows = Vec::with_capacity(dst);
        for i in 0..dst {
            let center = (i as f64 + NUDGE) / scale - NUDGE;
            let left = (center - half_width).floor() as i64;
            let right = (center + half_width).ceil() as i64;

            let raw_total: f64 = (left..=right).map(|j| tap_weight(center, j)).sum();
            if raw_total == 0.0 || !raw_total.is_finite() {
                return Err(ResampleError::DegenerateKernel { index: i });
            }
            let norm = 1.0 / raw_total;

            let mut taps = Vec::with_capacity((right - left + 1) as usize);
            let mut total = 0.0;
            let mut max_k = None;
            let mut max_w = f64::NEG_INFINITY;
            for j in left..=right {
                let weight = tap_weight(center, j) * norm;
                if weight == 0.0 {
                    continue;
                }
                if weight > max_w {
                    max_w = weight;
                    max_k = Some(taps.len());
                }
                total += weight;
                taps.push(Contrib {
                    pixel: boundary.map(j, src),
                    weight,
                });
            }

            let Some(max_k) = max_k else {
                return Err(ResampleError::DegenerateKernel { index: i });
            };
            // Push the rounding residue onto the dominant tap so every row sums to exactly one.
            if total != 1.0 {
                taps[max_k].weight += 1.0 - total;
            }
            rows.push(taps);
        }

        Ok(Self { rows })
    }

    pub(crate) fn row(&self, i: usize) -> &[Contrib] {
        &self.rows[i]
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &[Contrib]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Widest span of source samples referenced by a single output sample.
    pub(crate) fn max_span(&self) -> usize {
        self.rows
            .iter()
            .filter_map(|taps| {
                let lo = taps.iter().map(|c| c.pixel).min()?;
                let hi = taps.iter().map(|c| c.pixel).max()?;
                Some(hi - lo + 1)
            })
            .max()
            .unwrap_or(1)
    }
}
