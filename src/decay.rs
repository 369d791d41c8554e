use crate::assert_interval;

/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f32) -> f32;
}

/// v(t) = max(v<sub>i</sub> * r<sup>t</sup>, v<sub>f</sub>)
///
/// Evaluated at integer `t`, this is the value obtained by multiplying `vi` by `rate` `t` times
/// and flooring the result at `vf`. With `rate <= 1` it never increases.
#[derive(Debug, Clone, PartialEq)]
pub struct Multiplicative {
    rate: f32,
    vi: f32,
    vf: f32,
}

impl Multiplicative {
    /// **Panics** if `rate`, `vi` or `vf` is not in the interval `[0,1]`, or if `vf` is greater than `vi`
    pub fn new(rate: f32, vi: f32, vf: f32) -> Self {
        assert_interval!(rate, 0.0, 1.0);
        assert_interval!(vi, 0.0, 1.0);
        assert_interval!(vf, 0.0, 1.0);
        assert!(vi >= vf, "Initial value must not be less than the floor.");
        Self { rate, vi, vf }
    }

    /// A schedule that always evaluates to `value`
    pub fn pinned(value: f32) -> Self {
        Self::new(1.0, value, value)
    }

    pub fn floor(&self) -> f32 {
        self.vf
    }
}

impl Default for Multiplicative {
    fn default() -> Self {
        Self {
            rate: 0.995,
            vi: 1.0,
            vf: 0.01,
        }
    }
}

impl Decay for Multiplicative {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { rate, vi, vf } = self;
        (vi * rate.powf(t)).max(vf)
    }
}
