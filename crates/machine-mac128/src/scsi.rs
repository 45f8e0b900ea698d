//! SCSI controller bridging.
//!
//! The Plus and the SE fit different NCR 5380 front ends. [`ScsiPort`]
//! picks the access rules for whichever one the model carries so the bus
//! decoder only ever calls `read`/`write`.

/// NCR 5380 with pseudo-DMA (Plus).
pub trait Ncr5380n {
    fn read(&mut self, reg: u8) -> u8;
    fn write(&mut self, reg: u8, data: u8);
    fn dma_r(&mut self) -> u8;
    fn dma_w(&mut self, data: u8);
}

/// NCR 5380 register interface (SE).
pub trait Ncr5380 {
    fn read_reg(&mut self, reg: u8) -> u8;
    fn write_reg(&mut self, reg: u8, data: u8);
}

/// Current-data read that holds DTACK until the target is ready.
pub const CURDATA_DTACK: u8 = 0x10;
/// Output-data write that holds DTACK until the target is ready.
pub const OUTDATA_DTACK: u8 = 0x11;

/// Word offsets at or above this hit the pseudo-DMA decode.
const DMA_WINDOW: u32 = 0x100;

#[inline]
fn register(offset: u32) -> u8 {
    ((offset >> 3) & 0x0F) as u8
}

/// Controller wired into the SCSI window.
pub enum ScsiPort<'a> {
    Absent,
    Ncr5380n(&'a mut dyn Ncr5380n),
    Ncr5380(&'a mut dyn Ncr5380),
}

impl ScsiPort<'_> {
    /// Read at word `offset` within the window. `None` when nothing is fitted.
    pub fn read(&mut self, offset: u32, mem_mask: u16, drq: bool) -> Option<u16> {
        let reg = register(offset);
        match self {
            ScsiPort::Absent => None,
            ScsiPort::Ncr5380n(chip) => {
                let value = if offset >= DMA_WINDOW && drq {
                    chip.dma_r()
                } else {
                    chip.read(reg)
                };
                let value = u16::from(value);
                Some(if mem_mask & 0x00FF != 0 { value } else { value << 8 })
            }
            ScsiPort::Ncr5380(chip) => {
                let reg = if reg == 6 && offset == 0x130 {
                    CURDATA_DTACK
                } else {
                    reg
                };
                Some(u16::from(chip.read_reg(reg)) << 8)
            }
        }
    }

    /// Write at word `offset`. Returns `false` when nothing is fitted.
    pub fn write(&mut self, offset: u32, data: u16, drq: bool) -> bool {
        let reg = register(offset);
        match self {
            ScsiPort::Absent => false,
            ScsiPort::Ncr5380n(chip) => {
                // Byte writes are smeared across both lanes, so the low byte
                // is valid for either strobe.
                if offset >= DMA_WINDOW && drq {
                    chip.dma_w(data as u8);
                }
                chip.write(reg, data as u8);
                true
            }
            ScsiPort::Ncr5380(chip) => {
                let reg = if reg == 0 && offset == DMA_WINDOW {
                    OUTDATA_DTACK
                } else {
                    reg
                };
                chip.write_reg(reg, data as u8);
                true
            }
        }
    }
}
