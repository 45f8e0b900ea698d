//! Master-clock tick counts.

use std::fmt;

/// A count of master clock ticks.
///
/// Used both as an absolute timestamp and as a delay. Subtraction saturates
/// at zero so "time until" computations never wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Smallest tick count `>= self` that is a multiple of `period`.
    ///
    /// A zero period leaves the value unchanged.
    #[must_use]
    pub const fn align_up(self, period: u64) -> Self {
        if period == 0 {
            return self;
        }
        Self(self.0.div_ceil(period) * period)
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}t", self.0)
    }
}

impl From<u64> for Ticks {
    fn from(count: u64) -> Self {
        Self(count)
    }
}

impl core::ops::Add for Ticks {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Ticks {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl core::ops::Sub for Ticks {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

#[cfg(test)]
mod tests {
    use super::Ticks;

    #[test]
    fn align_up_rounds_to_next_multiple() {
        assert_eq!(Ticks::new(0).align_up(10), Ticks::new(0));
        assert_eq!(Ticks::new(1).align_up(10), Ticks::new(10));
        assert_eq!(Ticks::new(10).align_up(10), Ticks::new(10));
        assert_eq!(Ticks::new(11).align_up(10), Ticks::new(20));
    }

    #[test]
    fn align_up_with_zero_period_is_identity() {
        assert_eq!(Ticks::new(7).align_up(0), Ticks::new(7));
    }

    #[test]
    fn subtraction_saturates() {
        assert_eq!(Ticks::new(3) - Ticks::new(5), Ticks::ZERO);
    }
}
