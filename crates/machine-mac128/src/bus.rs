//! 68000 address decoding.
//!
//! | Range             | Early        | Plus         | SE           |
//! |-------------------|--------------|--------------|--------------|
//! | $000000-$3FFFFF   | RAM/overlay  | RAM/overlay  | RAM/overlay* |
//! | $400000-$4FFFFF   | ROM          | ROM          | ROM          |
//! | $500000-$5FFFFF   | ROM mirror   | SCSI (from $580000) | SCSI (from $580000) |
//! | $600000-$6FFFFF   | RAM          | -            | -            |
//! | $800000-$9FFFFF   | SCC read     | SCC read     | SCC read (from $900000) |
//! | $A00000-$BFFFFF   | SCC write    | SCC write    | SCC write (from $B00000) |
//! | $C00000-$DFFFFF   | IWM          | IWM          | IWM/SWIM (from $D00000) |
//! | $E80000-$EFFFFF   | VIA          | VIA          | VIA          |
//! | $FFFFF0-$FFFFFF   | autovector   | autovector   | autovector   |
//!
//! \* any SE write to the low window clears the overlay.
//!
//! Accesses are word-sized with a byte-lane `mem_mask`; handlers receive
//! the word offset from the start of their window.

use crate::config::MemoryMap;
use crate::peripherals::{
    AdbTransceiver, FloppyController, FloppyDrive, MainCpu, MouseInputs, RealTimeClock, Scc,
    ScreenTiming, SoundDac, Via,
};
use crate::scsi::ScsiPort;
use crate::via_sync;
use crate::Mac128;
use log::{debug, warn};

/// Mask for the 24-bit 68000 address bus.
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Low,
    Rom,
    Ram,
    Scsi,
    SccRead,
    SccWrite,
    Iwm,
    Via,
    Autovector,
}

struct Window {
    start: u32,
    end: u32,
    region: Region,
}

const fn window(start: u32, end: u32, region: Region) -> Window {
    Window { start, end, region }
}

const EARLY_MAP: &[Window] = &[
    window(0x00_0000, 0x3F_FFFF, Region::Low),
    window(0x40_0000, 0x5F_FFFF, Region::Rom),
    window(0x60_0000, 0x6F_FFFF, Region::Ram),
    window(0x80_0000, 0x9F_FFFF, Region::SccRead),
    window(0xA0_0000, 0xBF_FFFF, Region::SccWrite),
    window(0xC0_0000, 0xDF_FFFF, Region::Iwm),
    window(0xE8_0000, 0xEF_FFFF, Region::Via),
    window(0xFF_FFF0, 0xFF_FFFF, Region::Autovector),
];

const PLUS_MAP: &[Window] = &[
    window(0x00_0000, 0x3F_FFFF, Region::Low),
    window(0x40_0000, 0x4F_FFFF, Region::Rom),
    window(0x58_0000, 0x5F_FFFF, Region::Scsi),
    window(0x80_0000, 0x9F_FFFF, Region::SccRead),
    window(0xA0_0000, 0xBF_FFFF, Region::SccWrite),
    window(0xC0_0000, 0xDF_FFFF, Region::Iwm),
    window(0xE8_0000, 0xEF_FFFF, Region::Via),
    window(0xFF_FFF0, 0xFF_FFFF, Region::Autovector),
];

const SE_MAP: &[Window] = &[
    window(0x00_0000, 0x3F_FFFF, Region::Low),
    window(0x40_0000, 0x4F_FFFF, Region::Rom),
    window(0x58_0000, 0x5F_FFFF, Region::Scsi),
    window(0x90_0000, 0x9F_FFFF, Region::SccRead),
    window(0xB0_0000, 0xBF_FFFF, Region::SccWrite),
    window(0xD0_0000, 0xDF_FFFF, Region::Iwm),
    window(0xE8_0000, 0xEF_FFFF, Region::Via),
    window(0xFF_FFF0, 0xFF_FFFF, Region::Autovector),
];

/// Region and word offset within it for a byte address.
fn decode(map: MemoryMap, addr: u32) -> Option<(Region, u32)> {
    let table = match map {
        MemoryMap::Early => EARLY_MAP,
        MemoryMap::Plus => PLUS_MAP,
        MemoryMap::Se => SE_MAP,
    };
    let addr = addr & ADDRESS_MASK;
    table
        .iter()
        .find(|w| (w.start..=w.end).contains(&addr))
        .map(|w| (w.region, (addr - w.start) >> 1))
}

#[inline]
fn peripheral_reg(offset: u32) -> u8 {
    ((offset >> 8) & 0x0F) as u8
}

/// The glue plus every device it talks to, borrowed for one access or callback.
pub struct MacBus<'a> {
    pub mac: &'a mut Mac128,
    pub cpu: &'a mut dyn MainCpu,
    pub via: &'a mut dyn Via,
    pub scc: &'a mut dyn Scc,
    pub iwm: &'a mut dyn FloppyController,
    pub drives: [Option<&'a mut dyn FloppyDrive>; 2],
    pub scsi: ScsiPort<'a>,
    /// Present on SE-class boards only.
    pub adb: Option<&'a mut dyn AdbTransceiver>,
    pub rtc: &'a mut dyn RealTimeClock,
    pub dac: &'a mut dyn SoundDac,
    pub screen: &'a dyn ScreenTiming,
    pub mouse: &'a dyn MouseInputs,
}

impl MacBus<'_> {
    /// Read a word (or the strobed byte lanes of it) at byte address `addr`.
    pub fn read_word(&mut self, addr: u32, mem_mask: u16) -> u16 {
        let Some((region, offset)) = decode(self.mac.caps.memory_map, addr) else {
            warn!("Read from unmapped address: {:06X}", addr & ADDRESS_MASK);
            return 0;
        };
        match region {
            Region::Low => self.mac.memory.read_low(offset),
            Region::Rom => self.mac.memory.read_rom(offset),
            Region::Ram => self.mac.memory.read_ram(offset),
            Region::Scsi => {
                let drq = self.mac.scsi_drq;
                self.scsi.read(offset, mem_mask, drq).unwrap_or_else(|| {
                    warn!("Read from absent SCSI controller: {addr:06X}");
                    0
                })
            }
            Region::SccRead => {
                // Byte-wide on the upper data lines only.
                if mem_mask & 0xFF00 == 0 {
                    return 0;
                }
                u16::from(self.scc.read(offset)) << 8
            }
            Region::SccWrite => {
                warn!("Read from SCC write window: {addr:06X}");
                0
            }
            Region::Iwm => {
                let value = u16::from(self.iwm.read(peripheral_reg(offset)));
                (value << 8) | value
            }
            Region::Via => {
                let reg = peripheral_reg(offset);
                let via = &mut *self.via;
                let value = via_sync::synced(&mut *self.cpu, || via.read(reg));
                u16::from_be_bytes([value, value])
            }
            Region::Autovector => {
                debug!("Autovector read at {addr:06X}");
                0
            }
        }
    }

    /// Write the strobed byte lanes of `data` at byte address `addr`.
    pub fn write_word(&mut self, addr: u32, data: u16, mem_mask: u16) {
        let Some((region, offset)) = decode(self.mac.caps.memory_map, addr) else {
            warn!(
                "Write to unmapped address: {:06X} = {data:04X}",
                addr & ADDRESS_MASK
            );
            return;
        };
        match region {
            Region::Low => self.mac.memory.write_low(offset, data, mem_mask),
            Region::Rom => debug!("Write to ROM ignored: {addr:06X} = {data:04X}"),
            Region::Ram => self.mac.memory.write_ram(offset, data, mem_mask),
            Region::Scsi => {
                let drq = self.mac.scsi_drq;
                if !self.scsi.write(offset, data, drq) {
                    warn!("Write to absent SCSI controller: {addr:06X} = {data:04X}");
                }
            }
            Region::SccRead => warn!("Write to SCC read window: {addr:06X} = {data:04X}"),
            Region::SccWrite => {
                // Byte-wide on the lower data lines only.
                if mem_mask & 0x00FF != 0 {
                    self.scc.write(offset, data as u8);
                }
            }
            Region::Iwm => {
                let value = if mem_mask & 0x00FF != 0 {
                    data as u8
                } else {
                    (data >> 8) as u8
                };
                self.iwm.write(peripheral_reg(offset), value);
            }
            Region::Via => {
                let reg = peripheral_reg(offset);
                let via = &mut *self.via;
                via_sync::synced(&mut *self.cpu, || via.write(reg, (data >> 8) as u8));
            }
            Region::Autovector => debug!("Autovector write at {addr:06X} = {data:04X}"),
        }
    }

    /// Byte read helper: even addresses use the upper lane.
    pub fn read_byte(&mut self, addr: u32) -> u8 {
        if addr & 1 == 0 {
            (self.read_word(addr & !1, 0xFF00) >> 8) as u8
        } else {
            self.read_word(addr & !1, 0x00FF) as u8
        }
    }

    /// Byte write helper. The byte is smeared across both lanes as the
    /// 68000 does.
    pub fn write_byte(&mut self, addr: u32, value: u8) {
        let data = u16::from_be_bytes([value, value]);
        let mask = if addr & 1 == 0 { 0xFF00 } else { 0x00FF };
        self.write_word(addr & !1, data, mask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn early_map_mirrors_rom_and_has_ram_window() {
        assert_eq!(decode(MemoryMap::Early, 0x50_0002), Some((Region::Rom, 0x8_0001)));
        assert_eq!(decode(MemoryMap::Early, 0x60_0010), Some((Region::Ram, 8)));
        assert_eq!(decode(MemoryMap::Early, 0x58_0000), Some((Region::Rom, 0xC_0000)));
    }

    #[test]
    fn plus_map_has_scsi_and_no_ram_window() {
        assert_eq!(decode(MemoryMap::Plus, 0x58_0010), Some((Region::Scsi, 8)));
        assert_eq!(decode(MemoryMap::Plus, 0x50_0000), None);
        assert_eq!(decode(MemoryMap::Plus, 0x60_0000), None);
    }

    #[test]
    fn se_map_moves_scc_and_iwm() {
        assert_eq!(decode(MemoryMap::Se, 0x80_0000), None);
        assert_eq!(decode(MemoryMap::Se, 0x90_0000), Some((Region::SccRead, 0)));
        assert_eq!(decode(MemoryMap::Se, 0xA0_0000), None);
        assert_eq!(decode(MemoryMap::Se, 0xB0_0002), Some((Region::SccWrite, 1)));
        assert_eq!(decode(MemoryMap::Se, 0xC0_0000), None);
        assert_eq!(decode(MemoryMap::Se, 0xD0_0000), Some((Region::Iwm, 0)));
    }

    #[test]
    fn addresses_wrap_to_24_bits() {
        assert_eq!(decode(MemoryMap::Plus, 0xFF40_0000), Some((Region::Rom, 0)));
        assert_eq!(decode(MemoryMap::Plus, 0x00FF_FFFE), Some((Region::Autovector, 7)));
    }

    #[test]
    fn via_register_spacing_is_512_bytes() {
        let (_, offset) = decode(MemoryMap::Early, 0xEF_FE00).expect("VIA window");
        assert_eq!(peripheral_reg(offset), 0x0F);
        let (_, offset) = decode(MemoryMap::Early, 0xE8_0200).expect("VIA window");
        assert_eq!(peripheral_reg(offset), 0x01);
    }
}
