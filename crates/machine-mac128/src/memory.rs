//! RAM, ROM and the boot overlay.
//!
//! Storage is kept as 16-bit words indexed by word offset, the unit the
//! 68000 bus presents. Byte strobes arrive as a `mem_mask` (0xFF00 for the
//! even byte, 0x00FF for the odd byte, 0xFFFF for a word) and writes merge
//! only the strobed lanes. Addresses wrap by masking, never by bounds
//! checks: a 128K machine sees its RAM repeated across the window.

use crate::config::OverlayPolicy;

#[derive(Debug, Clone)]
pub struct Memory {
    ram: Vec<u16>,
    ram_mask: u32,
    rom: Vec<u16>,
    rom_mask: u32,
    /// ROM is visible at $000000 instead of RAM.
    pub overlay: bool,
    policy: OverlayPolicy,
}

/// Merge `data` into `old` on the lanes selected by `mem_mask`.
#[inline]
#[must_use]
pub const fn combine(old: u16, data: u16, mem_mask: u16) -> u16 {
    (old & !mem_mask) | (data & mem_mask)
}

impl Memory {
    /// Build from a big-endian ROM image and a RAM size in bytes.
    ///
    /// The ROM length is expected to be an even power of two (checked by
    /// `MacConfig::validate`).
    #[must_use]
    pub fn new(rom_image: &[u8], ram_bytes: usize, policy: OverlayPolicy) -> Self {
        let rom: Vec<u16> = rom_image
            .chunks(2)
            .map(|pair| {
                let hi = pair[0];
                let lo = pair.get(1).copied().unwrap_or(0);
                u16::from_be_bytes([hi, lo])
            })
            .collect();
        let ram_words = (ram_bytes / 2).max(1);
        Self {
            rom_mask: (rom.len().max(1) as u32).wrapping_sub(1),
            rom: if rom.is_empty() { vec![0] } else { rom },
            ram: vec![0; ram_words],
            ram_mask: (ram_words as u32).wrapping_sub(1),
            overlay: true,
            policy,
        }
    }

    /// Size of RAM in words.
    #[must_use]
    pub fn ram_words(&self) -> u32 {
        self.ram.len() as u32
    }

    #[must_use]
    pub fn ram(&self) -> &[u16] {
        &self.ram
    }

    pub fn clear_ram(&mut self) {
        self.ram.fill(0);
    }

    /// RAM word at a wrapped word offset.
    #[inline]
    #[must_use]
    pub fn read_ram(&self, offset: u32) -> u16 {
        self.ram[(offset & self.ram_mask) as usize]
    }

    /// Unconditional RAM write (the $600000 window ignores the overlay).
    #[inline]
    pub fn write_ram(&mut self, offset: u32, data: u16, mem_mask: u16) {
        let slot = &mut self.ram[(offset & self.ram_mask) as usize];
        *slot = combine(*slot, data, mem_mask);
    }

    #[inline]
    #[must_use]
    pub fn read_rom(&self, offset: u32) -> u16 {
        self.rom[(offset & self.rom_mask) as usize]
    }

    /// Read from the low window, honouring the overlay.
    #[must_use]
    pub fn read_low(&self, offset: u32) -> u16 {
        if self.overlay {
            self.read_rom(offset)
        } else {
            self.read_ram(offset)
        }
    }

    /// Write to the low window.
    ///
    /// Under [`OverlayPolicy::ViaControlled`] the write is dropped while the
    /// overlay is up. Under [`OverlayPolicy::ClearOnRamWrite`] the write
    /// drops the overlay and lands in RAM.
    pub fn write_low(&mut self, offset: u32, data: u16, mem_mask: u16) {
        match self.policy {
            OverlayPolicy::ViaControlled => {
                if !self.overlay {
                    self.write_ram(offset, data, mem_mask);
                }
            }
            OverlayPolicy::ClearOnRamWrite => {
                self.overlay = false;
                self.write_ram(offset, data, mem_mask);
            }
        }
    }
}
