//! FM side of the chip and its clock-domain bridge.
//!
//! The FM operators are clocked at `clock / (19 * 36)` while the chip
//! outputs at `clock / 768`, so the FM engine runs about 12% faster than
//! the output stream. [`FmResampler`] tracks the fractional difference as
//! a 0.24 fixed-point phase and requests an extra FM clock each time it
//! overflows. There is no interpolation between FM samples.

/// Status bit 0: a register write is still being absorbed.
pub const STATUS_BUSY: u8 = 0x01;
/// Status bit 1: a wave header load is in progress.
pub const STATUS_LD: u8 = 0x02;

/// FM operator clock prescaler.
pub const FM_PRESCALE: u32 = 19;
/// FM operator slots per sample.
pub const FM_OPERATORS: u32 = 36;
/// Master clocks per output sample.
pub const OUTPUT_DIVIDER: u32 = 768;

/// Extra FM clocks per output sample, as a 0.24 fraction.
pub const FM_STEP: u32 = (((1u64 << 24) * (OUTPUT_DIVIDER - FM_PRESCALE * FM_OPERATORS) as u64)
    / (FM_PRESCALE * FM_OPERATORS) as u64) as u32;

/// OPL3-compatible FM engine inside the chip.
///
/// Addresses are 9 bits: bit 8 selects the second register bank.
pub trait FmEngine {
    fn write(&mut self, address: u16, data: u8);

    /// Register readback.
    fn read(&self, address: u16) -> u8;

    fn status(&self) -> u8;

    /// Set then clear status bits.
    fn set_reset_status(&mut self, set: u8, reset: u8);

    /// OPL3 mode (register 0x105 bit 0).
    fn new_flag(&self) -> bool;

    /// OPL4 mode (register 0x105 bit 1). Gates the wavetable ports.
    fn new2_flag(&self) -> bool;

    /// Advance one FM sample.
    fn clock(&mut self);

    /// Current outputs for FM channels 0-3, clipped to 16 bits.
    fn output(&self) -> [i32; 4];

    fn reset(&mut self);
}

/// Register file of the FM section without tone generation.
///
/// Tracks every register, the NEW/NEW2 mode bits and the status byte so
/// host-side detection and the wavetable ports behave, and outputs
/// silence.
#[derive(Debug, Clone)]
pub struct Opl3Registers {
    regs: [u8; 0x200],
    status: u8,
    clocks: u64,
}

/// Timer control register. Bit 7 clears the IRQ and timer flags.
const REG_TIMER_CONTROL: u16 = 0x004;
/// OPL3/OPL4 mode register.
const REG_NEW: u16 = 0x105;

const STATUS_IRQ: u8 = 0x80;
const STATUS_TIMER_A: u8 = 0x40;
const STATUS_TIMER_B: u8 = 0x20;

impl Default for Opl3Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Opl3Registers {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: [0; 0x200],
            status: 0,
            clocks: 0,
        }
    }

    /// FM samples clocked since the last reset.
    #[must_use]
    pub fn clocks(&self) -> u64 {
        self.clocks
    }
}

impl FmEngine for Opl3Registers {
    fn write(&mut self, address: u16, data: u8) {
        let address = address & 0x1FF;
        if address == REG_TIMER_CONTROL && data & 0x80 != 0 {
            self.status &= !(STATUS_IRQ | STATUS_TIMER_A | STATUS_TIMER_B);
            return;
        }
        self.regs[address as usize] = data;
    }

    fn read(&self, address: u16) -> u8 {
        self.regs[(address & 0x1FF) as usize]
    }

    fn status(&self) -> u8 {
        self.status
    }

    fn set_reset_status(&mut self, set: u8, reset: u8) {
        self.status = (self.status | set) & !reset;
    }

    fn new_flag(&self) -> bool {
        self.regs[REG_NEW as usize] & 0x01 != 0
    }

    fn new2_flag(&self) -> bool {
        self.regs[REG_NEW as usize] & 0x02 != 0
    }

    fn clock(&mut self) {
        self.clocks += 1;
    }

    fn output(&self) -> [i32; 4] {
        [0; 4]
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Fractional phase between the FM and output sample rates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FmResampler {
    pos: u32,
}

impl FmResampler {
    #[must_use]
    pub const fn new() -> Self {
        Self { pos: 0 }
    }

    /// Phase in 1/2^24 FM samples.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.pos
    }

    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Advance one output sample; returns how many times to clock the FM
    /// engine (1 or 2).
    pub fn step(&mut self) -> u32 {
        self.pos += FM_STEP;
        if self.pos & (1 << 24) != 0 {
            self.pos &= 0xFF_FFFF;
            2
        } else {
            1
        }
    }
}
