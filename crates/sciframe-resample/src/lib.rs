//! Streaming separable resampler for rectangular sample blocks.
//!
//! The resampler consumes source lines one at a time and produces destination lines as soon as
//! every source line contributing to them has been seen. Source lines are resampled along the
//! line axis when they are accepted and parked in a bounded *scan buffer* until all destination
//! lines depending on them have been emitted.
//!
//! Callers drive it with two calls:
//! - [`Resampler::put_line`] returns `false` with [`Status::ScanBufferFull`] when no buffer slot
//!   is free. The caller must then drain output with [`Resampler::get_line`] and retry the same
//!   source line.
//! - [`Resampler::get_line`] returns `None` once no complete destination line is available.
//!
//! Reconstruction uses a Lanczos windowed-sinc kernel ([`Kernel`]); out-of-range taps are mapped
//! back into the source according to a [`BoundaryOp`].

#![forbid(unsafe_code)]

mod contrib;
mod error;
mod kernel;
mod resampler;

pub use crate::contrib::BoundaryOp;
pub use crate::error::ResampleError;
pub use crate::kernel::Kernel;
pub use crate::resampler::{Resampler, ResamplerConfig, Sample, Status, DEFAULT_SCAN_BUFFER_LINES};
