//! One wavetable voice: pitch accumulator, sample fetch and envelope.
//!
//! Envelope volume is an attenuation in 0.375 dB units with 23
//! fractional bits: `0` is full level and `256 << 23` is silence. The
//! attack phase counts it down, every other phase counts it up towards a
//! limit. A phase ends when the running volume reaches or passes its
//! limit, which is checked as a signed difference so the attack's
//! wrap below zero also ends the phase.

use crate::memory::WaveMemory;
use crate::tables::Tables;

/// Silence, and the envelope's full-scale limit.
pub const ENV_SILENT: u32 = 256 << 23;

/// Pseudo-reverb takes over once the envelope is below -18 dB.
const PREVERB_THRESHOLD: u32 = (6 * 8) << 23;

/// Effective rate used while damping.
const DAMP_RATE: usize = 56;
/// Effective rate used once pseudo-reverb has latched.
const PREVERB_RATE: usize = 5;

/// Octave code that mutes a voice.
pub const OCTAVE_MUTE: u8 = 8;

/// Envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopePhase {
    Attack,
    Decay1,
    Decay2,
    /// Decay 2 reached silence.
    Decay2Done,
    Release,
    /// Release reached silence.
    ReleaseDone,
}

impl EnvelopePhase {
    /// Phase entered when the current one reaches its limit. The two
    /// silent phases are terminal.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Attack => Self::Decay1,
            Self::Decay1 => Self::Decay2,
            Self::Decay2 | Self::Decay2Done => Self::Decay2Done,
            Self::Release => Self::ReleaseDone,
            Self::ReleaseDone => Self::ReleaseDone,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Decay1 => "decay1",
            Self::Decay2 => "decay2",
            Self::Decay2Done => "decay2-done",
            Self::Release => "release",
            Self::ReleaseDone => "release-done",
        }
    }
}

/// Wave data word size, from the top two bits of the wave header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    Bits8,
    /// Two samples packed in three bytes.
    Bits12,
    Bits16,
    /// Reserved code; plays silence.
    Reserved,
}

impl SampleFormat {
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 3 {
            0 => Self::Bits8,
            1 => Self::Bits12,
            2 => Self::Bits16,
            _ => Self::Reserved,
        }
    }
}

/// State of one of the 24 wavetable voices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSlot {
    /// Wave table number (9 bits).
    pub(crate) wave: u16,
    /// F-number (10 bits).
    pub(crate) f_number: u16,
    /// Octave, 4-bit two's complement.
    pub(crate) octave: u8,
    pub(crate) preverb: bool,
    pub(crate) damp: bool,
    /// Output pin: true = DO1, false = DO2.
    pub(crate) ch: bool,
    /// Level direct (latched only).
    pub(crate) ld: bool,
    /// Total level, 7 bits.
    pub(crate) tl: u8,
    pub(crate) pan: u8,
    pub(crate) lfo: u8,
    pub(crate) vib: u8,
    pub(crate) am: u8,

    pub(crate) ar: u8,
    pub(crate) d1r: u8,
    pub(crate) dl: u8,
    pub(crate) d2r: u8,
    pub(crate) rc: u8,
    pub(crate) rr: u8,

    /// Phase increment, 16.16.
    pub(crate) step: u32,
    /// Sample position, 16.16.
    pub(crate) stepptr: u32,

    pub(crate) active: bool,
    pub(crate) key_on: bool,
    pub(crate) format: SampleFormat,
    pub(crate) start: u32,
    /// Loop point, 16.16.
    pub(crate) loop_addr: u32,
    /// End point, 16.16.
    pub(crate) end_addr: u32,

    pub(crate) env_phase: EnvelopePhase,
    pub(crate) env_vol: u32,
    pub(crate) env_vol_step: u32,
    pub(crate) env_vol_lim: u32,
    pub(crate) env_preverb: bool,
}

impl Default for VoiceSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Sign-extend a 4-bit octave code.
fn signed_octave(octave: u8) -> i32 {
    i32::from((octave << 4) as i8 >> 4)
}

impl VoiceSlot {
    #[must_use]
    pub fn new() -> Self {
        Self {
            wave: 0,
            f_number: 0,
            octave: 0,
            preverb: false,
            damp: false,
            ch: false,
            ld: false,
            tl: 0,
            pan: 0,
            lfo: 0,
            vib: 0,
            am: 0,
            ar: 0,
            d1r: 0,
            dl: 0,
            d2r: 0,
            rc: 0,
            rr: 0,
            step: 0,
            stepptr: 0,
            active: false,
            key_on: false,
            format: SampleFormat::Bits8,
            start: 0,
            loop_addr: 0,
            end_addr: 0,
            env_phase: EnvelopePhase::ReleaseDone,
            env_vol: ENV_SILENT,
            env_vol_step: 0,
            env_vol_lim: 0,
            env_preverb: false,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn key_on(&self) -> bool {
        self.key_on
    }

    #[must_use]
    pub fn wave(&self) -> u16 {
        self.wave
    }

    #[must_use]
    pub fn f_number(&self) -> u16 {
        self.f_number
    }

    #[must_use]
    pub fn octave(&self) -> u8 {
        self.octave
    }

    #[must_use]
    pub fn total_level(&self) -> u8 {
        self.tl
    }

    #[must_use]
    pub fn pan(&self) -> u8 {
        self.pan
    }

    #[must_use]
    pub fn format(&self) -> SampleFormat {
        self.format
    }

    #[must_use]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[must_use]
    pub fn loop_addr(&self) -> u32 {
        self.loop_addr
    }

    #[must_use]
    pub fn end_addr(&self) -> u32 {
        self.end_addr
    }

    #[must_use]
    pub fn step(&self) -> u32 {
        self.step
    }

    #[must_use]
    pub fn position(&self) -> u32 {
        self.stepptr
    }

    #[must_use]
    pub fn env_phase(&self) -> EnvelopePhase {
        self.env_phase
    }

    #[must_use]
    pub fn env_volume(&self) -> u32 {
        self.env_vol
    }

    #[must_use]
    pub fn env_limit(&self) -> u32 {
        self.env_vol_lim
    }

    #[must_use]
    pub fn env_step(&self) -> u32 {
        self.env_vol_step
    }

    #[must_use]
    pub fn preverb_latched(&self) -> bool {
        self.env_preverb
    }

    /// Level-direct bit from register group 3. Latched only.
    #[must_use]
    pub fn level_direct(&self) -> bool {
        self.ld
    }

    /// True when routed to the DO1 pins.
    #[must_use]
    pub fn routed_to_do1(&self) -> bool {
        self.ch
    }

    /// LFO speed, vibrato depth and tremolo depth. Latched only.
    #[must_use]
    pub fn modulation(&self) -> (u8, u8, u8) {
        (self.lfo, self.vib, self.am)
    }

    /// Effective rate (0-63) for a 4-bit rate code, with the rate
    /// correction scaling by octave and F-number bit 9.
    #[must_use]
    pub fn compute_rate(&self, val: u8) -> usize {
        match val {
            0 => return 0,
            15 => return 63,
            _ => {}
        }
        let val = i32::from(val);
        let res = if self.rc == 15 {
            val * 4
        } else {
            (signed_octave(self.octave) + i32::from(self.rc)) * 2
                + i32::from(self.f_number & 0x200 != 0)
                + val * 4
        };
        res.clamp(0, 63) as usize
    }

    /// Per-sample volume increment for a decay-type phase.
    fn decay_step(&mut self, tables: &Tables, val: u8) -> u32 {
        let rate = if self.damp {
            DAMP_RATE
        } else if self.preverb && self.env_vol > PREVERB_THRESHOLD {
            self.env_preverb = true;
            PREVERB_RATE
        } else {
            self.compute_rate(val)
        };
        if rate < 4 {
            0
        } else {
            ENV_SILENT / tables.lut_dr[rate]
        }
    }

    /// Phase increment from F-number and octave.
    pub(crate) fn compute_freq_step(&mut self) {
        let step = (u32::from(self.f_number) | 1024) << (signed_octave(self.octave) + 8);
        self.step = step >> 3;
    }

    /// Enter the envelope phase in `env_phase`, loading its step and limit.
    /// Phases with nothing to do fall through to the next one.
    pub(crate) fn compute_envelope(&mut self, tables: &Tables) {
        loop {
            match self.env_phase {
                EnvelopePhase::Attack => {
                    let rate = self.compute_rate(self.ar);
                    self.env_vol = ENV_SILENT;
                    self.env_vol_lim = ENV_SILENT - 1;
                    if rate == 63 {
                        self.env_vol = 0;
                        self.env_phase = EnvelopePhase::Decay1;
                        continue;
                    }
                    self.env_vol_step = if rate < 4 {
                        0
                    } else {
                        !(ENV_SILENT / tables.lut_ar[rate])
                    };
                }
                EnvelopePhase::Decay1 => {
                    if self.dl == 0 {
                        self.env_phase = EnvelopePhase::Decay2;
                        continue;
                    }
                    self.env_vol_step = self.decay_step(tables, self.d1r);
                    self.env_vol_lim = (u32::from(self.dl) * 8) << 23;
                }
                EnvelopePhase::Decay2 => {
                    self.env_vol_step = self.decay_step(tables, self.d2r);
                    self.env_vol_lim = ENV_SILENT;
                }
                EnvelopePhase::Release => {
                    self.env_vol_step = self.decay_step(tables, self.rr);
                    self.env_vol_lim = ENV_SILENT;
                }
                EnvelopePhase::Decay2Done | EnvelopePhase::ReleaseDone => {
                    self.env_vol = ENV_SILENT;
                    self.env_vol_step = 0;
                    self.env_vol_lim = 0;
                    self.active = false;
                }
            }
            return;
        }
    }

    /// Key-on: restart from the beginning of the sample in attack.
    pub(crate) fn retrigger(&mut self, tables: &Tables) {
        if self.octave != OCTAVE_MUTE {
            self.active = true;
        }
        self.stepptr = 0;
        self.env_phase = EnvelopePhase::Attack;
        self.env_preverb = false;
        self.compute_freq_step();
        self.compute_envelope(tables);
    }

    /// Force the envelope into `phase` and evaluate it.
    pub(crate) fn enter(&mut self, phase: EnvelopePhase, tables: &Tables) {
        self.env_phase = phase;
        self.compute_envelope(tables);
    }

    /// Sample at the current position, after applying the loop.
    pub(crate) fn fetch<M: WaveMemory + ?Sized>(&mut self, memory: &M) -> i16 {
        if self.stepptr >= self.end_addr {
            // Pathological loop/end pairs can leave the position past the
            // end; the next sample wraps again.
            self.stepptr = self
                .stepptr
                .wrapping_sub(self.end_addr)
                .wrapping_add(self.loop_addr);
        }

        let byte = |offset: u32| u16::from(memory.read_byte(self.start.wrapping_add(offset)));
        let word = match self.format {
            SampleFormat::Bits8 => byte(self.stepptr >> 16) << 8,
            SampleFormat::Bits12 => {
                let base = (self.stepptr >> 17) * 3;
                if self.stepptr & 0x1_0000 != 0 {
                    (byte(base + 2) << 8) | (byte(base + 1) & 0xF0)
                } else {
                    (byte(base) << 8) | ((byte(base + 1) << 4) & 0xF0)
                }
            }
            SampleFormat::Bits16 => {
                let base = (self.stepptr >> 16) * 2;
                (byte(base) << 8) | byte(base + 1)
            }
            SampleFormat::Reserved => 0,
        };
        word as i16
    }

    /// Advance pitch and envelope by one output sample.
    pub(crate) fn advance(&mut self, tables: &Tables) {
        self.stepptr = self.stepptr.wrapping_add(self.step);

        self.env_vol = self.env_vol.wrapping_add(self.env_vol_step);
        if self.env_vol.wrapping_sub(self.env_vol_lim) as i32 >= 0 {
            self.env_phase = self.env_phase.next();
            self.compute_envelope(tables);
        } else if self.preverb
            && !self.env_preverb
            && self.env_phase != EnvelopePhase::Attack
            && self.env_vol > PREVERB_THRESHOLD
        {
            self.compute_envelope(tables);
        }
    }

    /// Attenuation index into the volume table for one side.
    pub(crate) fn attenuation(&self, pan: &[i32; 16]) -> usize {
        usize::from(self.tl) + pan[usize::from(self.pan)] as usize + (self.env_vol >> 23) as usize
    }
}
