//! External wave-data memory.
//!
//! The chip drives a 22-bit byte address bus (4 MB) shared by header
//! fetches, sample playback and the host's sideband access through
//! PCM registers 3-6.

use crate::Ymf278bError;

/// Mask for the 22-bit wave memory bus.
pub const ADDRESS_MASK: u32 = 0x3F_FFFF;

/// Byte-addressable wave memory seen by the chip.
pub trait WaveMemory {
    fn read_byte(&self, addr: u32) -> u8;

    /// Sideband write from PCM register 6. ROM ignores it.
    fn write_byte(&mut self, _addr: u32, _data: u8) {}
}

/// Wave RAM (or a ROM image loaded into RAM), mirrored across the bus.
#[derive(Debug, Clone)]
pub struct WaveRam {
    data: Vec<u8>,
    mask: u32,
}

impl WaveRam {
    /// Zero-filled memory of `size` bytes. The size must be a power of
    /// two no larger than 4 MB.
    pub fn new(size: usize) -> Result<Self, Ymf278bError> {
        if !size.is_power_of_two() || size > ADDRESS_MASK as usize + 1 {
            return Err(Ymf278bError::MemorySize(size));
        }
        Ok(Self {
            data: vec![0; size],
            mask: (size - 1) as u32,
        })
    }

    /// Memory initialised from an image. Images that are not a power of
    /// two are padded with zeros up to the next one.
    pub fn from_image(image: &[u8]) -> Result<Self, Ymf278bError> {
        let mut ram = Self::new(image.len().max(1).next_power_of_two())?;
        ram.data[..image.len()].copy_from_slice(image);
        Ok(ram)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Copy `bytes` in at `addr`, wrapping at the end of memory.
    pub fn load(&mut self, addr: u32, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.write_byte(addr.wrapping_add(i as u32), b);
        }
    }
}

impl WaveMemory for WaveRam {
    fn read_byte(&self, addr: u32) -> u8 {
        self.data[(addr & ADDRESS_MASK & self.mask) as usize]
    }

    fn write_byte(&mut self, addr: u32, data: u8) {
        self.data[(addr & ADDRESS_MASK & self.mask) as usize] = data;
    }
}

impl<T: WaveMemory + ?Sized> WaveMemory for &mut T {
    fn read_byte(&self, addr: u32) -> u8 {
        (**self).read_byte(addr)
    }

    fn write_byte(&mut self, addr: u32, data: u8) {
        (**self).write_byte(addr, data);
    }
}
