use thiserror::Error;

/// Errors raised while configuring a [`crate::Resampler`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResampleError {
    #[error("cannot resample {src_x}x{src_y} samples into {dst_x}x{dst_y} samples")]
    InvalidDimensions {
        src_x: usize,
        src_y: usize,
        dst_x: usize,
        dst_y: usize,
    },
    #[error("kernel has no support for output sample {index}")]
    DegenerateKernel { index: usize },
    #[error("kernel lobe count must be positive")]
    InvalidKernel,
}
