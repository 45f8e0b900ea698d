//! Logic-board glue for the compact 68000 Macintosh family.
//!
//! Covers the 128K, 512K, 512Ke, Plus, SE, SE FDHD and Classic boards
//! (plus the Unitron clones): the boot ROM overlay, interrupt priority,
//! VIA wait states, the per-line beam/sound/mouse timer, the floppy
//! spindle PWM decoder and mouse quadrature.
//!
//! The CPU and the peripheral chips are not part of this crate. [`Mac128`]
//! holds the glue state; a [`MacBus`] borrows it together with the
//! peripherals for the duration of a bus access or timer callback, the
//! same way a CPU core borrows its bus.
//!
//! The `serde` feature derives `Serialize`/`Deserialize` on the
//! configuration types. The crate's own tests always build with it.

pub mod bus;
pub mod config;
mod glue;
pub mod interrupts;
pub mod memory;
pub mod mouse;
pub mod peripherals;
pub mod pwm;
pub mod scsi;
pub mod via_sync;
pub mod video;

use emu_core::{Observable, TimerQueue, Value};

pub use crate::bus::MacBus;
pub use crate::config::{
    ConfigError, MacConfig, MacModel, MemoryMap, ModelCapabilities, OverlayPolicy,
    PointerInterface, ScsiKind, ViaRouting,
};
pub use crate::interrupts::{InterruptArbiter, IrqChange};
pub use crate::memory::Memory;
pub use crate::mouse::QuadratureMouse;
pub use crate::pwm::FloppyPwm;
pub use crate::scsi::ScsiPort;
pub use crate::video::{MacRaster, MacTimer};

/// VIA frames counted per one-second CA2 toggle.
pub const VBLANKS_PER_SECOND: u8 = 60;

/// Glue state for one machine.
#[derive(Debug, Clone)]
pub struct Mac128 {
    model: MacModel,
    caps: ModelCapabilities,
    pub memory: Memory,
    pub irq: InterruptArbiter,
    pub pwm: FloppyPwm,
    pub mouse: QuadratureMouse,
    pub timers: TimerQueue<MacTimer>,

    /// VIA PA6: primary framebuffer selected.
    screen_buffer: bool,
    /// VIA PA3: primary sound buffer selected.
    main_sound_buffer: bool,
    /// VIA PB7 low.
    sound_enabled: bool,
    /// VIA PA0-PA2.
    volume: u8,
    gain: f32,

    vblank_count: u8,
    ca2: bool,
    adb_irq_pending: bool,
    /// SE VIA PA4: external drive selected.
    drive_select: bool,
    /// SE VIA PB6 low.
    scsi_irq_enable: bool,
    scsi_irq: bool,
    scsi_drq: bool,

    head_select: bool,
    devsel: u8,
    cur_floppy: Option<usize>,
}

impl Mac128 {
    /// Build the glue for a validated configuration. RAM starts cleared.
    pub fn new(config: &MacConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let caps = config.model.capabilities();
        Ok(Self {
            model: config.model,
            caps,
            memory: Memory::new(&config.rom, config.effective_ram(), caps.overlay),
            irq: InterruptArbiter::new(),
            pwm: FloppyPwm::new(),
            mouse: QuadratureMouse::new(),
            timers: TimerQueue::new(),
            screen_buffer: true,
            main_sound_buffer: true,
            sound_enabled: false,
            volume: 3,
            gain: 0.0,
            vblank_count: 0,
            ca2: false,
            adb_irq_pending: false,
            drive_select: false,
            scsi_irq_enable: false,
            scsi_irq: false,
            scsi_drq: false,
            head_select: false,
            devsel: 0,
            cur_floppy: None,
        })
    }

    #[must_use]
    pub fn model(&self) -> MacModel {
        self.model
    }

    #[must_use]
    pub fn capabilities(&self) -> ModelCapabilities {
        self.caps
    }

    #[must_use]
    pub fn overlay(&self) -> bool {
        self.memory.overlay
    }

    /// Primary framebuffer selected (VIA PA6).
    #[must_use]
    pub fn screen_buffer(&self) -> bool {
        self.screen_buffer
    }

    #[must_use]
    pub fn main_sound_buffer(&self) -> bool {
        self.main_sound_buffer
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    #[must_use]
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Gain last applied to the DAC.
    #[must_use]
    pub fn output_gain(&self) -> f32 {
        self.gain
    }

    /// Drive attached to the floppy controller, if any.
    #[must_use]
    pub fn selected_drive(&self) -> Option<usize> {
        self.cur_floppy
    }

    /// DAC gain for the current sound enable and volume latches.
    #[must_use]
    pub fn volume_gain(&self) -> f32 {
        if self.sound_enabled {
            8.0 / f32::from(self.volume + 1)
        } else {
            0.0
        }
    }

    /// Serialise the currently selected framebuffer (1 byte per pixel).
    pub fn render_frame(&self, out: &mut [u8]) {
        video::render_frame(&self.memory, self.screen_buffer, out);
    }
}

const QUERY_PATHS: &[&str] = &[
    "model",
    "overlay",
    "irq.level",
    "irq.via",
    "irq.scc",
    "irq.scsi",
    "scsi.drq",
    "scsi.irq_enable",
    "pwm.rpm",
    "pwm.pulses",
    "mouse.pending_x",
    "mouse.pending_y",
    "screen_buffer",
    "sound.main_buffer",
    "sound.enabled",
    "sound.volume",
    "sound.gain",
    "floppy.drive",
    "floppy.head",
    "adb.irq_pending",
];

impl Observable for Mac128 {
    fn query(&self, path: &str) -> Option<Value> {
        let (via, scc, scsi) = self.irq.inputs();
        let value: Value = match path {
            "model" => self.model.name().into(),
            "overlay" => self.memory.overlay.into(),
            "irq.level" => self.irq.asserted().unwrap_or(0).into(),
            "irq.via" => via.into(),
            "irq.scc" => scc.into(),
            "irq.scsi" => scsi.into(),
            "scsi.drq" => self.scsi_drq.into(),
            "scsi.irq_enable" => self.scsi_irq_enable.into(),
            "pwm.rpm" => self.pwm.current_rpm().into(),
            "pwm.pulses" => self.pwm.pending_pulses().into(),
            "mouse.pending_x" => self.mouse.pending().0.into(),
            "mouse.pending_y" => self.mouse.pending().1.into(),
            "screen_buffer" => self.screen_buffer.into(),
            "sound.main_buffer" => self.main_sound_buffer.into(),
            "sound.enabled" => self.sound_enabled.into(),
            "sound.volume" => self.volume.into(),
            "sound.gain" => self.gain.into(),
            "floppy.drive" => self
                .cur_floppy
                .map_or_else(|| Value::from("none"), |d| Value::U8(d as u8)),
            "floppy.head" => self.head_select.into(),
            "adb.irq_pending" => self.adb_irq_pending.into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
