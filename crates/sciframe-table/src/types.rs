use num_complex::Complex64;

/// A single table cell. Missing cells are NaN.
pub type Value = Complex64;

/// The missing-value marker.
pub const NAN: Value = Value::new(f64::NAN, 0.0);

/// Returns `true` when either component of `v` is NaN.
#[inline]
pub fn is_missing(v: Value) -> bool {
    v.re.is_nan() || v.im.is_nan()
}

/// Direction in which a block operation is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppDir {
    /// The whole block at once.
    All,
    /// Each row independently (scanning across its columns).
    Lines,
    /// Each column independently (scanning down its rows).
    Cols,
    /// A grid block: the first two columns hold the x/y axis values, the rest is the z matrix.
    Grid,
}
