//! Interfaces to the chips the glue talks to.
//!
//! The CPU core, VIA, SCC, IWM/SWIM, drives, RTC, ADB transceiver, DAC
//! and raster generator are separate devices. The glue only needs the
//! handful of calls below, so it takes them as trait objects and the
//! machine composition root decides what sits behind each one.

use emu_core::Ticks;

/// The 68000 as seen by the glue.
pub trait MainCpu {
    /// Cycles executed since power-on.
    fn total_cycles(&self) -> u64;
    /// Add `delta` to the remaining cycle budget. Negative values burn
    /// cycles (wait states), advancing `total_cycles`.
    fn adjust_icount(&mut self, delta: i64);
    /// Drive an interrupt priority line.
    fn set_irq_line(&mut self, level: u8, asserted: bool);
}

/// 6522 VIA register port and control inputs.
pub trait Via {
    fn read(&mut self, reg: u8) -> u8;
    fn write(&mut self, reg: u8, data: u8);
    fn write_ca1(&mut self, state: bool);
    fn write_ca2(&mut self, state: bool);
    fn write_pb6(&mut self, state: bool);
}

/// Z8530 SCC register port and the DCD inputs used for mouse quadrature.
pub trait Scc {
    /// `offset` is the word offset into the SCC read window.
    fn read(&mut self, offset: u32) -> u8;
    /// `offset` is the word offset into the SCC write window.
    fn write(&mut self, offset: u32, data: u8);
    fn dcda_w(&mut self, state: bool);
    fn dcdb_w(&mut self, state: bool);
}

/// IWM or SWIM floppy controller.
pub trait FloppyController {
    fn read(&mut self, reg: u8) -> u8;
    fn write(&mut self, reg: u8, data: u8);
    /// Bring the controller's bit stream up to the current time.
    fn sync(&mut self);
    /// Attach drive 0, drive 1 or nothing.
    fn set_floppy(&mut self, drive: Option<usize>);
}

/// A floppy drive mechanism.
pub trait FloppyDrive {
    /// Whether the spindle speed follows the PWM control (Sony 800K style).
    fn is_variable_speed(&self) -> bool;
    fn set_rpm(&mut self, rpm: f32);
    /// Head select.
    fn ss_w(&mut self, head: bool);
    /// Stepper phases.
    fn seek_phase_w(&mut self, phases: u8);
}

/// RTC serial interface on VIA port B.
pub trait RealTimeClock {
    fn data_r(&self) -> bool;
    fn ce_w(&mut self, state: bool);
    fn data_w(&mut self, state: bool);
    fn clk_w(&mut self, state: bool);
}

/// ADB transceiver on SE-class boards.
pub trait AdbTransceiver {
    /// Once-per-frame housekeeping.
    fn vblank(&mut self);
    /// Transaction state from VIA PB4-PB5.
    fn new_action(&mut self, state: u8);
    /// Two-bit state reported on VIA PB4-PB5 input.
    fn state(&self) -> u8;
}

/// 8-bit sound DAC with an analogue volume stage.
pub trait SoundDac {
    fn write(&mut self, sample: u8);
    fn set_output_gain(&mut self, gain: f32);
}

/// Raster timing queries.
pub trait ScreenTiming {
    fn vpos(&self) -> u32;
    fn vblank(&self) -> bool;
    /// Total lines per frame.
    fn height(&self) -> u32;
    /// Delay until the beam next reaches (`line`, `hpos`).
    fn time_until_pos(&self, line: u32, hpos: u32) -> Ticks;
}

/// Raw mouse hardware.
pub trait MouseInputs {
    fn button(&self) -> bool;
    /// Absolute 8-bit X position (wraps).
    fn x(&self) -> u8;
    /// Absolute 8-bit Y position (wraps).
    fn y(&self) -> u8;
}
