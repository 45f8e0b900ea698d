//! Crystal and divided clock rates.

/// A clock source described by its frequency.
///
/// Peripherals clocked from a divider (a sound chip's output sample rate,
/// for one) are derived with [`MasterClock::divided`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MasterClock {
    /// Frequency in Hz.
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Clock produced by dividing this one by `divisor` (integer division).
    #[must_use]
    pub const fn divided(self, divisor: u64) -> Self {
        Self {
            frequency_hz: self.frequency_hz / divisor,
        }
    }
}
