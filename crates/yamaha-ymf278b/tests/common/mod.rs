#![allow(dead_code)]

use yamaha_ymf278b::{NOMINAL_CLOCK, WaveRam, Ymf278b};

pub const SAMPLE_BASE: u32 = 0x1000;

/// Wave table header fields, before encoding.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    /// 0 = 8-bit, 1 = 12-bit, 2 = 16-bit.
    pub format: u8,
    pub start: u32,
    /// Loop point in samples.
    pub loop_point: u16,
    /// End point in samples.
    pub end: u16,
    pub lfo_vib: u8,
    pub ar_d1r: u8,
    pub dl_d2r: u8,
    pub rc_rr: u8,
    pub am: u8,
}

impl Header {
    /// Instant attack, hold at full level, fast release.
    pub fn sustained(start: u32, loop_point: u16, end: u16) -> Self {
        Self {
            format: 0,
            start,
            loop_point,
            end,
            lfo_vib: 0,
            ar_d1r: 0xF0,
            dl_d2r: 0x00,
            rc_rr: 0xFF,
            am: 0,
        }
    }

    pub fn encode(&self) -> [u8; 12] {
        let end = self.end.wrapping_neg();
        [
            (self.format << 6) | ((self.start >> 16) as u8 & 0x3F),
            (self.start >> 8) as u8,
            self.start as u8,
            (self.loop_point >> 8) as u8,
            self.loop_point as u8,
            (end >> 8) as u8,
            end as u8,
            self.lfo_vib,
            self.ar_d1r,
            self.dl_d2r,
            self.rc_rr,
            self.am,
        ]
    }
}

pub type Chip = Ymf278b<WaveRam>;

/// Chip in OPL4 mode with `size` bytes of wave RAM.
pub fn chip_with_ram(size: usize) -> Chip {
    let ram = WaveRam::new(size).expect("power-of-two size");
    let mut chip = Ymf278b::with_memory(NOMINAL_CLOCK, ram).expect("nominal clock");
    chip.write(2, 0x05);
    chip.write(3, 0x03);
    // Consume the one-shot id bit.
    chip.read(0);
    chip
}

pub fn chip() -> Chip {
    chip_with_ram(0x1_0000)
}

pub fn pcm_write(chip: &mut Chip, reg: u8, data: u8) {
    chip.write(4, reg);
    chip.write(5, data);
}

/// Store a header for wave table `wave` in bank 0.
pub fn store_header(chip: &mut Chip, wave: u32, header: &Header) {
    chip.memory_mut().load(wave * 12, &header.encode());
}

/// Load wave `wave` (below 256) into `slot` and key it on with `pan_bits`
/// (pan, output pin, damp) in register group 4.
pub fn key_on(chip: &mut Chip, slot: u8, wave: u8, pan_bits: u8) {
    pcm_write(chip, 0x08 + slot, wave);
    pcm_write(chip, 0x68 + slot, 0x80 | pan_bits);
}

pub fn key_off(chip: &mut Chip, slot: u8) {
    pcm_write(chip, 0x68 + slot, 0x00);
}

/// Octave and F-number for `slot`.
pub fn set_pitch(chip: &mut Chip, slot: u8, octave: u8, f_number: u16) {
    pcm_write(chip, 0x20 + slot, ((f_number & 0x7F) << 1) as u8);
    pcm_write(chip, 0x38 + slot, (octave << 4) | ((f_number >> 7) as u8 & 7));
}
