//! Yamaha YMF278B (OPL4) FM + wavetable sound chip.
//!
//! An OPL3-compatible FM section and a 24-voice wavetable engine playing
//! 8, 12 or 16-bit samples from up to 4 MB of external memory. The chip
//! outputs one stereo frame on each of its three output pin pairs every
//! 768 master clocks (44.1 kHz at 33.8688 MHz).
//!
//! # Host ports (offset & 7)
//!
//! | Offset | Write                      | Read                          |
//! |--------|----------------------------|-------------------------------|
//! | 0      | FM address, bank 0         | Status                        |
//! | 1      | FM data                    | FM register readback          |
//! | 2      | FM address, bank 1         | -                             |
//! | 3      | FM data                    | FM register readback          |
//! | 4      | PCM address                | -                             |
//! | 5      | PCM data (NEW2 only)       | PCM register (NEW2 only)      |
//!
//! # PCM registers
//!
//! | Reg       | Function                                          |
//! |-----------|---------------------------------------------------|
//! | $00-$01   | LSI test                                          |
//! | $02       | Wave table header bank (bits 2-4), memory mode    |
//! | $03-$05   | Sideband memory address (22 bits)                 |
//! | $06       | Sideband memory data, auto-increment              |
//! | $08-$1F   | Wave number low 8 bits (loads the wave header)    |
//! | $20-$37   | F-number low 7 bits, wave number bit 8            |
//! | $38-$4F   | Octave, pseudo-reverb, F-number high 3 bits       |
//! | $50-$67   | Total level, level direct                         |
//! | $68-$7F   | Key on, damp, LFO reset, output pin, pan          |
//! | $80-$97   | LFO, vibrato                                      |
//! | $98-$AF   | Attack rate, decay 1 rate                         |
//! | $B0-$C7   | Decay level, decay 2 rate                         |
//! | $C8-$DF   | Rate correction, release rate                     |
//! | $E0-$F7   | Tremolo                                           |
//! | $F8       | FM mix level (left bits 0-2, right bits 3-5)      |
//! | $F9       | Wavetable mix level                               |
//!
//! # Outputs
//!
//! [`Frame`] holds six channels: DO2 left/right (FM channels 0/1 plus
//! the wavetable DO2 bus, scaled by the mix levels), DO0 left/right (FM
//! channels 2/3) and DO1 left/right (wavetable voices routed to DO1).

#![allow(clippy::cast_precision_loss)]

pub mod fm;
pub mod memory;
mod registers;
pub mod slot;
pub mod tables;

use emu_core::{MasterClock, Observable, Ticks, TimerQueue, Value};
use log::warn;
use thiserror::Error;

pub use crate::fm::{FmEngine, FmResampler, Opl3Registers, STATUS_BUSY, STATUS_LD};
pub use crate::memory::{WaveMemory, WaveRam};
pub use crate::slot::{EnvelopePhase, SampleFormat, VoiceSlot};
pub use crate::tables::Tables;

use crate::fm::OUTPUT_DIVIDER;
use crate::memory::ADDRESS_MASK;

/// Nominal master clock.
pub const NOMINAL_CLOCK: u32 = 33_868_800;

/// Number of wavetable voices.
pub const SLOTS: usize = 24;

/// Output channels per frame.
pub const OUTPUTS: usize = 6;

/// One output sample on every pin: DO2 L/R, DO0 L/R, DO1 L/R.
pub type Frame = [f32; OUTPUTS];

/// Master clocks BUSY stays set after an FM port write.
pub const FM_BUSY_CLOCKS: u64 = 56;
/// Master clocks BUSY stays set after a PCM port write.
pub const PCM_BUSY_CLOCKS: u64 = 88;
/// Master clocks LD stays set after a wave header load.
pub const LD_CLOCKS: u64 = 10;

/// Chip register 2 reads back with the device id in bits 5-7.
const DEVICE_ID: u8 = 0x20;

/// Fixed-point scale of the mixed DO2 outputs.
const MIX_SCALE: f32 = 65536.0 * 32768.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Ymf278bError {
    #[error("wave memory of {0} bytes is not a power of two up to 4 MB")]
    MemorySize(usize),
    #[error("clock of {0} Hz is below one output sample per second")]
    ClockTooLow(u32),
}

/// Output frames per second for a master clock.
fn output_rate(clock: u32) -> u32 {
    MasterClock::new(u64::from(clock))
        .divided(u64::from(OUTPUT_DIVIDER))
        .frequency_hz as u32
}

/// Status flag timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusTimer {
    BusyClear,
    LdClear,
}

/// The YMF278B with its wave memory and FM engine.
pub struct Ymf278b<M, F = Opl3Registers> {
    memory: M,
    fm: F,
    tables: Tables,
    slots: [VoiceSlot; SLOTS],
    pcmregs: [u8; 256],

    wavetblhdr: u8,
    memmode: u8,
    memadr: u32,

    fm_l: u8,
    fm_r: u8,
    pcm_l: u8,
    pcm_r: u8,

    /// Latched FM address.
    port_ab: u8,
    /// Latched PCM address.
    port_c: u8,
    /// FM bank of the latched address.
    lastport: bool,
    /// Report the OPL4 id on the next status read.
    next_status_id: bool,

    resampler: FmResampler,
    clock: u32,
    rate: u32,
    /// Master-clock time base for the status flags.
    timers: TimerQueue<StatusTimer>,
}

impl<M: WaveMemory> Ymf278b<M, Opl3Registers> {
    /// Chip with a register-only FM section.
    pub fn with_memory(clock: u32, memory: M) -> Result<Self, Ymf278bError> {
        Self::new(clock, memory, Opl3Registers::new())
    }
}

impl<M: WaveMemory, F: FmEngine> Ymf278b<M, F> {
    /// Build and reset the chip.
    pub fn new(clock: u32, memory: M, fm: F) -> Result<Self, Ymf278bError> {
        let rate = output_rate(clock);
        if rate == 0 {
            return Err(Ymf278bError::ClockTooLow(clock));
        }
        let mut chip = Self {
            memory,
            fm,
            tables: Tables::build(),
            slots: std::array::from_fn(|_| VoiceSlot::new()),
            pcmregs: [0; 256],
            wavetblhdr: 0,
            memmode: 0,
            memadr: 0,
            fm_l: 0,
            fm_r: 0,
            pcm_l: 0,
            pcm_r: 0,
            port_ab: 0,
            port_c: 0,
            lastport: false,
            next_status_id: false,
            resampler: FmResampler::new(),
            clock,
            rate,
            timers: TimerQueue::new(),
        };
        chip.reset();
        Ok(chip)
    }

    /// Power-on register state. All voices end silent.
    pub fn reset(&mut self) {
        for reg in 0..8 {
            self.write_pcm_register(reg, 0);
        }
        for reg in (8..=0xFF).rev() {
            self.write_pcm_register(reg, 0);
        }
        self.write_pcm_register(0xF8, 0x1B);

        self.port_ab = 0;
        self.port_c = 0;
        self.lastport = false;
        self.next_status_id = false;
        self.memadr = 0;

        for slot in &mut self.slots {
            slot.lfo = 0;
            slot.vib = 0;
            slot.ar = 0;
            slot.d1r = 0;
            slot.dl = 0;
            slot.d2r = 0;
            slot.rc = 0;
            slot.rr = 0;
            slot.am = 0;
            slot.start = 0;
            slot.loop_addr = 0;
            slot.end_addr = 0;
            slot.enter(EnvelopePhase::ReleaseDone, &self.tables);
        }

        self.timers.cancel(StatusTimer::BusyClear);
        self.timers.cancel(StatusTimer::LdClear);
        self.fm.reset();
        self.resampler.reset();
    }

    /// Change the master clock. The output rate follows as `clock / 768`.
    pub fn set_clock(&mut self, clock: u32) -> Result<(), Ymf278bError> {
        let rate = output_rate(clock);
        if rate == 0 {
            return Err(Ymf278bError::ClockTooLow(clock));
        }
        self.clock = clock;
        self.rate = rate;
        self.resampler.reset();
        Ok(())
    }

    #[must_use]
    pub fn clock(&self) -> u32 {
        self.clock
    }

    /// Output frames per second.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.rate
    }

    /// Master clocks elapsed.
    #[must_use]
    pub fn now(&self) -> Ticks {
        self.timers.now()
    }

    /// Let `clocks` master clocks pass, expiring BUSY and LD.
    pub fn advance_clocks(&mut self, clocks: u64) {
        let target = self.timers.now() + Ticks::new(clocks);
        while let Some(fired) = self.timers.pop_due(target) {
            match fired.id {
                StatusTimer::BusyClear => self.fm.set_reset_status(0, STATUS_BUSY),
                StatusTimer::LdClear => self.fm.set_reset_status(0, STATUS_LD),
            }
        }
        self.timers.advance_to(target);
    }

    fn start_busy(&mut self, clocks: u64) {
        self.fm.set_reset_status(STATUS_BUSY, 0);
        self.timers
            .adjust(StatusTimer::BusyClear, Ticks::new(clocks), 0);
    }

    pub(crate) fn start_load(&mut self) {
        self.fm.set_reset_status(STATUS_LD, 0);
        self.timers
            .adjust(StatusTimer::LdClear, Ticks::new(LD_CLOCKS), 0);
    }

    fn fm_address(&self) -> u16 {
        u16::from(self.port_ab) | (u16::from(self.lastport) << 8)
    }

    pub(crate) fn read_byte(&self, addr: u32) -> u8 {
        self.memory.read_byte(addr & ADDRESS_MASK)
    }

    /// Host write.
    pub fn write(&mut self, offset: u8, data: u8) {
        match offset & 7 {
            0 | 2 => {
                self.start_busy(FM_BUSY_CLOCKS);
                self.port_ab = data;
                self.lastport = offset & 2 != 0;
            }
            1 | 3 => {
                self.start_busy(FM_BUSY_CLOCKS);
                let was_new2 = self.fm.new2_flag();
                self.fm.write(self.fm_address(), data);
                // Only the first status read after NEW2 turns on reports
                // the id bit.
                if !was_new2 && self.fm.new2_flag() {
                    self.next_status_id = true;
                }
            }
            4 => {
                self.start_busy(PCM_BUSY_CLOCKS);
                self.port_c = data;
            }
            5 => {
                if !self.fm.new2_flag() {
                    return;
                }
                self.start_busy(PCM_BUSY_CLOCKS);
                self.write_pcm_register(self.port_c, data);
            }
            _ => warn!("Unexpected YMF278B write at offset {offset:X} = {data:02X}"),
        }
    }

    /// Host read. Status reads and PCM register 6 have side effects.
    pub fn read(&mut self, offset: u8) -> u8 {
        match offset & 7 {
            0 => {
                let mut status = self.fm.status();
                if !self.fm.new2_flag() {
                    // OPL2/OPL3 mode hides BUSY and LD.
                    status &= !(STATUS_BUSY | STATUS_LD);
                    if !self.fm.new_flag() {
                        status |= 0x06;
                    }
                } else if self.next_status_id {
                    status |= 0x02;
                    self.next_status_id = false;
                }
                status
            }
            1 | 3 => self.fm.read(self.fm_address()),
            5 => {
                if !self.fm.new2_flag() {
                    return 0;
                }
                match self.port_c {
                    2 => (self.pcmregs[2] & 0x1F) | DEVICE_ID,
                    6 => {
                        let data = self.read_byte(self.memadr);
                        self.memadr = (self.memadr + 1) & ADDRESS_MASK;
                        data
                    }
                    reg => self.pcmregs[usize::from(reg)],
                }
            }
            _ => {
                warn!("Unexpected YMF278B read at offset {offset:X}");
                0
            }
        }
    }

    /// Produce one output frame and advance time by one sample period.
    pub fn generate_sample(&mut self) -> Frame {
        let mut mix = [0i32; 4];
        for slot in &mut self.slots {
            if !slot.active {
                continue;
            }
            let sample = i32::from(slot.fetch(&self.memory));
            let left = (sample * self.tables.volume[slot.attenuation(&self.tables.pan_left)]) >> 17;
            let right =
                (sample * self.tables.volume[slot.attenuation(&self.tables.pan_right)]) >> 17;
            let bus = if slot.ch { 2 } else { 0 };
            mix[bus] += left;
            mix[bus + 1] += right;
            slot.advance(&self.tables);
        }

        for _ in 0..self.resampler.step() {
            self.fm.clock();
        }
        let fm = self.fm.output();

        let level = |code: u8| self.tables.mix_level[usize::from(code)] as f32 / MIX_SCALE;
        let frame = [
            mix[0] as f32 * level(self.pcm_l) + fm[0] as f32 * level(self.fm_l),
            mix[1] as f32 * level(self.pcm_r) + fm[1] as f32 * level(self.fm_r),
            fm[2] as f32 / 32768.0,
            fm[3] as f32 / 32768.0,
            mix[2] as f32 / 32768.0,
            mix[3] as f32 / 32768.0,
        ];

        self.advance_clocks(u64::from(OUTPUT_DIVIDER));
        frame
    }

    /// Fill `out` with consecutive frames.
    pub fn render(&mut self, out: &mut [Frame]) {
        for frame in out {
            *frame = self.generate_sample();
        }
    }

    #[must_use]
    pub fn slot(&self, n: usize) -> &VoiceSlot {
        &self.slots[n]
    }

    #[must_use]
    pub fn slots(&self) -> &[VoiceSlot; SLOTS] {
        &self.slots
    }

    /// Last value written to a PCM register.
    #[must_use]
    pub fn pcm_register(&self, reg: u8) -> u8 {
        self.pcmregs[usize::from(reg)]
    }

    /// Sideband memory address.
    #[must_use]
    pub fn memory_address(&self) -> u32 {
        self.memadr
    }

    /// Wave table header bank for waves 384-511; 0 keeps them in bank 0.
    #[must_use]
    pub fn header_bank(&self) -> u8 {
        self.wavetblhdr
    }

    /// Memory mode bits of register 2. Latched only.
    #[must_use]
    pub fn memory_mode(&self) -> u8 {
        self.memmode
    }

    /// FM and wavetable mix codes as (fm left, fm right, pcm left, pcm right).
    #[must_use]
    pub fn mix_codes(&self) -> (u8, u8, u8, u8) {
        (self.fm_l, self.fm_r, self.pcm_l, self.pcm_r)
    }

    #[must_use]
    pub fn resampler(&self) -> FmResampler {
        self.resampler
    }

    #[must_use]
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    #[must_use]
    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    #[must_use]
    pub fn fm(&self) -> &F {
        &self.fm
    }

    pub fn fm_mut(&mut self) -> &mut F {
        &mut self.fm
    }
}

const QUERY_PATHS: &[&str] = &[
    "clock",
    "sample_rate",
    "status",
    "new",
    "new2",
    "memory.address",
    "memory.mode",
    "memory.header_bank",
    "port.fm_address",
    "port.pcm_address",
    "mix.fm_l",
    "mix.fm_r",
    "mix.pcm_l",
    "mix.pcm_r",
    "fm.resampler_pos",
    "slot.<n>.active",
    "slot.<n>.key_on",
    "slot.<n>.phase",
    "slot.<n>.env_vol",
    "slot.<n>.wave",
    "slot.<n>.octave",
    "slot.<n>.f_number",
    "slot.<n>.position",
    "pcm.<n>",
];

impl<M: WaveMemory, F: FmEngine> Ymf278b<M, F> {
    fn query_slot(&self, path: &str) -> Option<Value> {
        let (index, field) = path.split_once('.')?;
        let slot = self.slots.get(index.parse::<usize>().ok()?)?;
        let value: Value = match field {
            "active" => slot.active.into(),
            "key_on" => slot.key_on.into(),
            "phase" => slot.env_phase.name().into(),
            "env_vol" => slot.env_vol.into(),
            "wave" => slot.wave.into(),
            "octave" => slot.octave.into(),
            "f_number" => slot.f_number.into(),
            "position" => slot.stepptr.into(),
            _ => return None,
        };
        Some(value)
    }
}

impl<M: WaveMemory, F: FmEngine> Observable for Ymf278b<M, F> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("slot.") {
            return self.query_slot(rest);
        }
        if let Some(reg) = path.strip_prefix("pcm.") {
            let reg = reg.parse::<u8>().ok()?;
            return Some(self.pcmregs[usize::from(reg)].into());
        }
        let value: Value = match path {
            "clock" => self.clock.into(),
            "sample_rate" => self.rate.into(),
            "status" => self.fm.status().into(),
            "new" => self.fm.new_flag().into(),
            "new2" => self.fm.new2_flag().into(),
            "memory.address" => self.memadr.into(),
            "memory.mode" => self.memmode.into(),
            "memory.header_bank" => self.wavetblhdr.into(),
            "port.fm_address" => self.fm_address().into(),
            "port.pcm_address" => self.port_c.into(),
            "mix.fm_l" => self.fm_l.into(),
            "mix.fm_r" => self.fm_r.into(),
            "mix.pcm_l" => self.pcm_l.into(),
            "mix.pcm_r" => self.pcm_r.into(),
            "fm.resampler_pos" => self.resampler.position().into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
