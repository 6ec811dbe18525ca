use std::f64::consts::PI;

/// Reconstruction kernel used to weight source samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    /// `sinc(x) * sinc(x / lobes)` for `|x| < lobes`, zero outside.
    Lanczos { lobes: u32 },
}

impl Kernel {
    pub const LANCZOS3: Kernel = Kernel::Lanczos { lobes: 3 };
    pub const LANCZOS6: Kernel = Kernel::Lanczos { lobes: 6 };

    /// Half width of the kernel in source samples (at scale 1).
    pub fn support(&self) -> f64 {
        match *self {
            Kernel::Lanczos { lobes } => f64::from(lobes),
        }
    }

    pub fn weight(&self, t: f64) -> f64 {
        match *self {
            Kernel::Lanczos { lobes } => {
                let t = t.abs();
                let a = f64::from(lobes);
                if t < a {
                    clean(sinc(t) * sinc(t / a))
                } else {
                    0.0
                }
            }
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        match *self {
            Kernel::Lanczos { lobes } => lobes > 0,
        }
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::LANCZOS6
    }
}

fn sinc(x: f64) -> f64 {
    let x = x * PI;
    // Series expansion near zero avoids the 0/0 and keeps the kernel smooth.
    if x.abs() < 0.01 {
        return 1.0 + x * x * (-1.0 / 6.0 + x * x / 120.0);
    }
    x.sin() / x
}

/// Flush tiny weights (e.g. `sin(k * pi)` residue at integer taps) to exactly zero.
fn clean(t: f64) -> f64 {
    const EPSILON: f64 = 0.000_012_5;
    if t.abs() < EPSILON {
        0.0
    } else {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanczos_is_one_at_origin_and_zero_at_integer_taps() {
        let k = Kernel::LANCZOS6;
        assert_eq!(k.weight(0.0), 1.0);
        for tap in 1..12 {
            assert_eq!(k.weight(tap as f64), 0.0, "tap {tap}");
            assert_eq!(k.weight(-(tap as f64)), 0.0, "tap -{tap}");
        }
    }

    #[test]
    fn lanczos_vanishes_outside_support() {
        let k = Kernel::LANCZOS3;
        assert_eq!(k.support(), 3.0);
        assert_eq!(k.weight(3.0), 0.0);
        assert_eq!(k.weight(7.25), 0.0);
        assert!(k.weight(0.5) > 0.5);
        assert!(k.weight(1.5) < 0.0);
    }
}
