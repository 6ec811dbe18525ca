use num_complex::Complex64;

use crate::contrib::{BoundaryOp, ContribList};
use crate::error::ResampleError;
use crate::kernel::Kernel;

/// A single sample. Weights are real; samples may carry an imaginary part.
pub type Sample = Complex64;

/// Default number of x-resampled source lines that may be parked at once.
pub const DEFAULT_SCAN_BUFFER_LINES: usize = 16_384;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResamplerConfig {
    pub boundary: BoundaryOp,
    pub kernel: Kernel,
    /// Values above 1 blur, values below 1 sharpen.
    pub filter_scale: f64,
    /// Upper bound on parked source lines. Raised to the widest vertical kernel window when it
    /// would otherwise be impossible to complete a destination line.
    pub scan_buffer_lines: usize,
}

impl Default for ResamplerConfig {
    fn default() -> Self {
        Self {
            boundary: BoundaryOp::Clamp,
            kernel: Kernel::LANCZOS6,
            filter_scale: 1.0,
            scan_buffer_lines: DEFAULT_SCAN_BUFFER_LINES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Okay,
    /// No free slot for the offered line; drain with [`Resampler::get_line`] and retry it.
    ScanBufferFull,
    /// Every source line has already been accepted.
    SourceExhausted,
    /// The offered line did not have `src_x` samples.
    BadLineLength,
}

#[derive(Debug)]
struct ScanSlot {
    src_y: Option<usize>,
    line: Vec<Sample>,
}

#[derive(Debug)]
pub struct Resampler {
    src_x: usize,
    src_y: usize,
    dst_x: usize,
    dst_y: usize,
    clist_x: ContribList,
    clist_y: ContribList,
    /// Outstanding destination taps per source line.
    src_y_count: Vec<usize>,
    /// Scan buffer slot holding each source line, if parked.
    src_y_slot: Vec<Option<usize>>,
    slots: Vec<ScanSlot>,
    capacity: usize,
    cur_src_y: usize,
    cur_dst_y: usize,
    dst_buf: Vec<Sample>,
    status: Status,
}

impl Resampler {
    pub fn new(
        src_x: usize,
        src_y: usize,
        dst_x: usize,
        dst_y: usize,
        config: ResamplerConfig,
    ) -> Result<Self, ResampleError> {
        if src_x == 0 || src_y == 0 || dst_x == 0 || dst_y == 0 {
            return Err(ResampleError::InvalidDimensions {
                src_x,
                src_y,
                dst_x,
                dst_y,
            });
        }
        if !config.kernel.is_valid() {
            return Err(ResampleError::InvalidKernel);
        }

        let clist_x = ContribList::build(
            src_x,
            dst_x,
            config.boundary,
            config.kernel,
            config.filter_scale,
        )?;
        let clist_y = ContribList::build(
            src_y,
            dst_y,
            config.boundary,
            config.kernel,
            config.filter_scale,
        )?;

        let mut src_y_count = vec![0usize; src_y];
        for taps in clist_y.rows() {
            for c in taps {
                src_y_count[c.pixel] += 1;
            }
        }

        let window = clist_y.max_span();
        let capacity = config.scan_buffer_lines.max(window).min(src_y);
        if capacity > config.scan_buffer_lines {
            log::debug!(
                "scan buffer raised from {} to {capacity} lines (kernel window {window})",
                config.scan_buffer_lines
            );
        }

        Ok(Self {
            src_x,
            src_y,
            dst_x,
            dst_y,
            clist_x,
            clist_y,
            src_y_count,
            src_y_slot: vec![None; src_y],
            slots: Vec::new(),
            capacity,
            cur_src_y: 0,
            cur_dst_y: 0,
            dst_buf: vec![Sample::new(0.0, 0.0); dst_x],
            status: Status::Okay,
        })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn src_dimensions(&self) -> (usize, usize) {
        (self.src_x, self.src_y)
    }

    pub fn dst_dimensions(&self) -> (usize, usize) {
        (self.dst_x, self.dst_y)
    }

    pub fn scan_buffer_lines(&self) -> usize {
        self.capacity
    }

    /// Offer the next source line. Returns `false` if it was not accepted; see [`Status`].
    pub fn put_line(&mut self, src: &[Sample]) -> bool {
        if self.cur_src_y >= self.src_y {
            self.status = Status::SourceExhausted;
            return false;
        }
        if src.len() != self.src_x {
            self.status = Status::BadLineLength;
            return false;
        }

        let y = self.cur_src_y;
        if self.src_y_count[y] == 0 {
            // Nothing downstream reads this line.
            self.cur_src_y += 1;
            self.status = Status::Okay;
            return true;
        }

        let slot = match self.slots.iter().position(|s| s.src_y.is_none()) {
            Some(slot) => slot,
            None if self.slots.len() < self.capacity => {
                self.slots.push(ScanSlot {
                    src_y: None,
                    line: vec![Sample::new(0.0, 0.0); self.dst_x],
                });
                self.slots.len() - 1
            }
            None => {
                self.status = Status::ScanBufferFull;
                return false;
            }
        };

        let line = &mut self.slots[slot].line;
        for (x, out) in line.iter_mut().enumerate() {
            *out = self
                .clist_x
                .row(x)
                .iter()
                .map(|c| src[c.pixel] * c.weight)
                .sum();
        }
        self.slots[slot].src_y = Some(y);
        self.src_y_slot[y] = Some(slot);
        self.cur_src_y += 1;
        self.status = Status::Okay;
        true
    }

    /// Produce the next destination line if all of its source lines have been offered.
    pub fn get_line(&mut self) -> Option<&[Sample]> {
        if self.cur_dst_y >= self.dst_y {
            return None;
        }
        let taps = self.clist_y.row(self.cur_dst_y);
        if taps.iter().any(|c| self.src_y_slot[c.pixel].is_none()) {
            return None;
        }

        self.dst_buf.fill(Sample::new(0.0, 0.0));
        for c in taps {
            let Some(slot) = self.src_y_slot[c.pixel] else {
                continue;
            };
            for (out, s) in self.dst_buf.iter_mut().zip(&self.slots[slot].line) {
                *out += *s * c.weight;
            }
            self.src_y_count[c.pixel] -= 1;
            if self.src_y_count[c.pixel] == 0 {
                self.slots[slot].src_y = None;
                self.src_y_slot[c.pixel] = None;
            }
        }

        self.cur_dst_y += 1;
        Some(&self.dst_buf)
    }
}
