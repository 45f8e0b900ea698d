//! PCM register decoder.
//!
//! Registers $08-$F7 are ten groups of 24, one register per voice in
//! each group. Writes that change pitch or envelope rates on a sounding
//! voice take effect immediately.

use log::{debug, trace};

use crate::fm::FmEngine;
use crate::memory::{ADDRESS_MASK, WaveMemory};
use crate::slot::{EnvelopePhase, OCTAVE_MUTE, SampleFormat};
use crate::{SLOTS, Ymf278b};

const SLOT_BASE: u8 = 0x08;
const SLOT_LAST: u8 = 0xF7;

/// Bytes per wave table header.
const HEADER_LEN: u32 = 12;
/// Waves from here up are looked up in the header bank from register 2.
const BANKED_WAVES: u16 = 384;
/// Size of one header bank.
const HEADER_BANK_SIZE: u32 = 0x8_0000;

impl<M: WaveMemory, F: FmEngine> Ymf278b<M, F> {
    /// Write a PCM register and latch the value for readback.
    pub(crate) fn write_pcm_register(&mut self, reg: u8, data: u8) {
        let mut data = data;
        if (SLOT_BASE..=SLOT_LAST).contains(&reg) {
            let index = reg - SLOT_BASE;
            self.write_slot_register(
                usize::from(index) % SLOTS,
                index / SLOTS as u8,
                reg,
                data,
            );
        } else {
            match reg {
                0x00 | 0x01 | 0x04 | 0x07 => {}
                0x02 => {
                    self.wavetblhdr = (data >> 2) & 7;
                    self.memmode = data & 3;
                }
                0x03 => data &= 0x3F,
                0x05 => {
                    self.memadr = (u32::from(self.pcmregs[3]) << 16)
                        | (u32::from(self.pcmregs[4]) << 8)
                        | u32::from(data);
                }
                0x06 => {
                    self.memory.write_byte(self.memadr, data);
                    self.memadr = (self.memadr + 1) & ADDRESS_MASK;
                }
                0xF8 => {
                    self.fm_l = data & 7;
                    self.fm_r = (data >> 3) & 7;
                }
                0xF9 => {
                    self.pcm_l = data & 7;
                    self.pcm_r = (data >> 3) & 7;
                }
                _ => debug!("YMF278B PCM register write {reg:02X} = {data:02X}"),
            }
        }
        self.pcmregs[usize::from(reg)] = data;
    }

    fn write_slot_register(&mut self, snum: usize, group: u8, reg: u8, data: u8) {
        let old = self.pcmregs[usize::from(reg)];
        let tables = &self.tables;
        let slot = &mut self.slots[snum];
        match group {
            0 => {
                slot.wave = (slot.wave & 0x100) | u16::from(data);
                self.load_header(snum);
            }
            1 => {
                slot.wave = (slot.wave & 0xFF) | (u16::from(data & 1) << 8);
                slot.f_number = (slot.f_number & 0x380) | u16::from(data >> 1);
                if slot.active && (data ^ old) & 0xFE != 0 {
                    slot.compute_freq_step();
                    slot.compute_envelope(tables);
                }
            }
            2 => {
                slot.f_number = (slot.f_number & 0x07F) | (u16::from(data & 7) << 7);
                slot.preverb = data & 0x08 != 0;
                slot.octave = data >> 4;
                if data != old {
                    // May switch on a silent voice; its envelope puts it
                    // back to sleep if there is nothing to play.
                    slot.active = slot.octave != OCTAVE_MUTE;
                    if slot.active {
                        slot.env_preverb = false;
                        slot.compute_freq_step();
                        slot.compute_envelope(tables);
                    }
                }
            }
            3 => {
                slot.tl = data >> 1;
                slot.ld = data & 1 != 0;
            }
            4 => {
                slot.ch = data & 0x10 != 0;
                slot.pan = data & 0x0F;
                slot.damp = data & 0x40 != 0;
                // Bit 5 (LFO reset) is not modelled.
                if data & 0x80 != 0 {
                    if slot.key_on {
                        if (data ^ old) & 0x40 != 0 {
                            slot.compute_envelope(tables);
                        }
                    } else {
                        slot.retrigger(tables);
                        slot.key_on = true;
                    }
                } else {
                    if slot.active {
                        slot.enter(EnvelopePhase::Release, tables);
                    }
                    slot.key_on = false;
                }
            }
            5 => {
                slot.lfo = (data >> 3) & 7;
                slot.vib = data & 7;
            }
            6 => {
                slot.ar = data >> 4;
                slot.d1r = data & 0x0F;
                if slot.active && data != old {
                    slot.compute_envelope(tables);
                }
            }
            7 => {
                slot.dl = data >> 4;
                slot.d2r = data & 0x0F;
                if slot.active && data != old {
                    slot.compute_envelope(tables);
                }
            }
            8 => {
                slot.rc = data >> 4;
                slot.rr = data & 0x0F;
                if slot.active && data != old {
                    slot.compute_envelope(tables);
                }
            }
            _ => slot.am = data & 7,
        }
    }

    /// Fetch the 12-byte header for the slot's wave number.
    ///
    /// | Byte | Contents                                        |
    /// |------|-------------------------------------------------|
    /// | 0    | Format (bits 6-7), start address bits 16-21     |
    /// | 1-2  | Start address bits 0-15                         |
    /// | 3-4  | Loop point                                      |
    /// | 5-6  | End point, two's complement                     |
    /// | 7-11 | Registers for groups 5-9                        |
    fn load_header(&mut self, snum: usize) {
        let wave = self.slots[snum].wave;
        let offset = if wave < BANKED_WAVES || self.wavetblhdr == 0 {
            u32::from(wave) * HEADER_LEN
        } else {
            u32::from(self.wavetblhdr) * HEADER_BANK_SIZE
                + u32::from(wave - BANKED_WAVES) * HEADER_LEN
        };
        trace!("YMF278B slot {snum} loads wave {wave} header from {offset:06X}");
        let mut header = [0u8; HEADER_LEN as usize];
        for (i, byte) in header.iter_mut().enumerate() {
            *byte = self.read_byte(offset + i as u32);
        }

        let slot = &mut self.slots[snum];
        slot.format = SampleFormat::from_code(header[0] >> 6);
        slot.start = u32::from(header[2])
            | (u32::from(header[1]) << 8)
            | (u32::from(header[0] & 0x3F) << 16);
        slot.loop_addr = (u32::from(header[4]) << 16) | (u32::from(header[3]) << 24);
        slot.end_addr = ((u32::from(header[6]) << 16) | (u32::from(header[5]) << 24))
            .wrapping_sub(0x1_0000)
            ^ 0xFFFF_0000;

        for (group, &byte) in (5u8..).zip(&header[7..]) {
            self.write_pcm_register(SLOT_BASE + snum as u8 + group * SLOTS as u8, byte);
        }

        self.start_load();

        let tables = &self.tables;
        let slot = &mut self.slots[snum];
        if slot.key_on {
            slot.retrigger(tables);
        } else if slot.active {
            slot.enter(EnvelopePhase::ReleaseDone, tables);
        }
    }
}
