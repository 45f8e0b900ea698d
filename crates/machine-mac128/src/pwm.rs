//! Floppy spindle speed from the sound/PWM buffer.
//!
//! The low byte of each sound-buffer word drives a 6-bit LFSR counter that
//! sets a pulse length. The ROM dithers between two lengths over ten
//! pulses, so averaging 100 pulses gives an index in 0..=399 that maps to
//! an 11..=410 slot pulse out of 420. The drive manual specifies the RPM
//! as linear in duty cycle between 9.4% (342.5 RPM) and 91% (702.5 RPM).

use log::info;

/// Pulse length for each LFSR start value.
pub const VALUE_TO_LENGTH: [u8; 64] = [
    0, 1, 59, 2, 60, 40, 54, 3, //
    61, 32, 49, 41, 55, 19, 35, 4, //
    62, 52, 30, 33, 50, 12, 14, 42, //
    56, 16, 27, 20, 36, 23, 44, 5, //
    63, 58, 39, 53, 31, 48, 18, 34, //
    51, 29, 11, 13, 15, 26, 22, 43, //
    57, 38, 47, 17, 28, 10, 25, 21, //
    37, 46, 9, 24, 45, 8, 7, 6, //
];

/// Pulses averaged per speed estimate.
pub const WINDOW: u32 = 100;
/// Speed assumed before the first estimate (0% duty).
pub const IDLE_RPM: f32 = 302.5;

/// Speed for a window's dithered index (0..=399).
#[must_use]
pub fn index_to_rpm(index: u32) -> f32 {
    let duty = (f64::from(index) / 419.0) as f32;
    ((f64::from(duty) - 0.094) * (702.5 - 342.5) / (0.91 - 0.094) + 342.5) as f32
}

/// Dithered index for a window with pulse-length total `sum` over `count` pulses.
#[must_use]
pub fn window_index(sum: u32, count: u32) -> u32 {
    let index = i64::from(sum / (count / 10)) - 11;
    index.clamp(0, 399) as u32
}

#[derive(Debug, Clone)]
pub struct FloppyPwm {
    length_sum: u32,
    pulses: u32,
    /// Last two estimates, oldest first.
    history: [f32; 2],
}

impl Default for FloppyPwm {
    fn default() -> Self {
        Self::new()
    }
}

impl FloppyPwm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            length_sum: 0,
            pulses: 0,
            history: [IDLE_RPM; 2],
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Most recent estimate, applied to a drive when it is selected.
    #[must_use]
    pub fn current_rpm(&self) -> f32 {
        self.history[1]
    }

    /// Pulses accumulated in the open window.
    #[must_use]
    pub fn pending_pulses(&self) -> u32 {
        self.pulses
    }

    /// Feed one PWM byte. Returns a speed to apply to the motor.
    ///
    /// A speed is returned only when the closing window agrees with the
    /// previous window and that one differed from the window before it.
    pub fn push(&mut self, value: u8) -> Option<f32> {
        self.length_sum += u32::from(VALUE_TO_LENGTH[usize::from(value & 0x3F)]);
        self.pulses += 1;
        if self.pulses < WINDOW {
            return None;
        }

        let index = window_index(self.length_sum, self.pulses);
        let rpm = index_to_rpm(index);
        let [older, previous] = self.history;
        let commit = rpm == previous && previous != older;
        if commit {
            info!(
                "PWM index {index:3} duty cycle {:5.1}% rpm {rpm}",
                100.0 * f64::from(index) / 419.0
            );
        }

        self.history = [previous, rpm];
        self.length_sum = 0;
        self.pulses = 0;
        commit.then_some(rpm)
    }
}
