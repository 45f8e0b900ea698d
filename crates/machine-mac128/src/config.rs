//! Model selection and per-model capabilities.
//!
//! The compact Macs share one glue design, but later boards differ in how
//! the boot overlay is cleared, where the serial and floppy chips decode,
//! which SCSI part is fitted, and how VIA port B is wired. Those
//! differences live in [`ModelCapabilities`] so the glue logic reads one
//! record instead of matching on the model everywhere.

use thiserror::Error;

const KB: usize = 1024;

/// Supported machine variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MacModel {
    /// Macintosh 128K (1984).
    Mac128k,
    /// Macintosh 512K (1984).
    Mac512k,
    /// Macintosh 512Ke: 512K board with the Plus ROM.
    Mac512ke,
    /// Unitron Mac 512 clone.
    Unitron512,
    /// Macintosh Plus (1986).
    MacPlus,
    /// Unitron 1024 clone of the Plus.
    Unitron1024,
    /// Macintosh SE (1987).
    MacSe,
    /// Macintosh SE with the FDHD SWIM controller.
    MacSeFdhd,
    /// Macintosh Classic (1990).
    MacClassic,
}

/// Address decoding layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemoryMap {
    /// 128K/512K boards: ROM mirrored at $500000, RAM window at $600000.
    Early,
    /// Plus boards: SCSI at $580000, no RAM window at $600000.
    Plus,
    /// SE boards: SCC and SWIM decode moved up, SCSI via the legacy part.
    Se,
}

/// How the boot-time ROM overlay at $000000 is turned off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverlayPolicy {
    /// VIA port A bit 4 drives the overlay; RAM writes under overlay are lost.
    ViaControlled,
    /// Any write into the low RAM window clears the overlay and lands.
    ClearOnRamWrite,
}

/// SCSI controller fitted to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScsiKind {
    None,
    /// NCR 5380 with pseudo-DMA on the upper half of the window.
    Ncr5380n,
    /// NCR 5380 with DTACK-synchronised data pseudo-registers.
    Ncr5380,
}

/// Pointer device hookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointerInterface {
    /// Mouse quadrature into SCC DCD lines and VIA port B.
    Quadrature,
    /// Apple Desktop Bus transceiver hanging off VIA port B.
    Adb,
}

/// VIA port handler set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViaRouting {
    /// PA3 sound buffer, PA4 overlay, PB3-PB5 mouse.
    Classic,
    /// PA4 drive select, PB3-PB5 ADB, PB6 SCSI IRQ enable.
    Se,
}

/// Static behaviour switches for one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelCapabilities {
    pub memory_map: MemoryMap,
    pub overlay: OverlayPolicy,
    pub scsi: ScsiKind,
    pub pointer: PointerInterface,
    pub via: ViaRouting,
    /// Installed RAM when none is requested, in bytes.
    pub default_ram: usize,
    /// RAM sizes the board accepts, in bytes.
    pub ram_options: &'static [usize],
}

const EARLY_128K: &[usize] = &[128 * KB];
const EARLY_512K: &[usize] = &[512 * KB];
const PLUS_RAM: &[usize] = &[KB * KB, 2 * KB * KB, 2560 * KB, 4 * KB * KB];
const SE_RAM: &[usize] = &[2 * KB * KB, 2560 * KB, 4 * KB * KB];

impl MacModel {
    pub const ALL: [MacModel; 9] = [
        MacModel::Mac128k,
        MacModel::Mac512k,
        MacModel::Mac512ke,
        MacModel::Unitron512,
        MacModel::MacPlus,
        MacModel::Unitron1024,
        MacModel::MacSe,
        MacModel::MacSeFdhd,
        MacModel::MacClassic,
    ];

    #[must_use]
    pub const fn capabilities(self) -> ModelCapabilities {
        match self {
            Self::Mac128k => ModelCapabilities {
                memory_map: MemoryMap::Early,
                overlay: OverlayPolicy::ViaControlled,
                scsi: ScsiKind::None,
                pointer: PointerInterface::Quadrature,
                via: ViaRouting::Classic,
                default_ram: 128 * KB,
                ram_options: EARLY_128K,
            },
            Self::Mac512k | Self::Mac512ke | Self::Unitron512 => ModelCapabilities {
                memory_map: MemoryMap::Early,
                overlay: OverlayPolicy::ViaControlled,
                scsi: ScsiKind::None,
                pointer: PointerInterface::Quadrature,
                via: ViaRouting::Classic,
                default_ram: 512 * KB,
                ram_options: EARLY_512K,
            },
            Self::MacPlus | Self::Unitron1024 => ModelCapabilities {
                memory_map: MemoryMap::Plus,
                overlay: OverlayPolicy::ViaControlled,
                scsi: ScsiKind::Ncr5380n,
                pointer: PointerInterface::Quadrature,
                via: ViaRouting::Classic,
                default_ram: 4 * KB * KB,
                ram_options: PLUS_RAM,
            },
            Self::MacSe | Self::MacSeFdhd | Self::MacClassic => ModelCapabilities {
                memory_map: MemoryMap::Se,
                overlay: OverlayPolicy::ClearOnRamWrite,
                scsi: ScsiKind::Ncr5380,
                pointer: PointerInterface::Adb,
                via: ViaRouting::Se,
                default_ram: 4 * KB * KB,
                ram_options: SE_RAM,
            },
        }
    }

    /// Human-readable product name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mac128k => "Macintosh 128k",
            Self::Mac512k => "Macintosh 512k",
            Self::Mac512ke => "Macintosh 512ke",
            Self::Unitron512 => "Mac 512 (Unitron)",
            Self::MacPlus => "Macintosh Plus",
            Self::Unitron1024 => "Unitron 1024",
            Self::MacSe => "Macintosh SE",
            Self::MacSeFdhd => "Macintosh SE (FDHD)",
            Self::MacClassic => "Macintosh Classic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("boot ROM must be a non-empty power-of-two size, got {0} bytes")]
    RomSize(usize),
    #[error("{model} does not support {ram} bytes of RAM")]
    RamSize { model: &'static str, ram: usize },
}

/// Machine construction parameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacConfig {
    pub model: MacModel,
    /// Boot ROM image, big-endian bytes.
    pub rom: Vec<u8>,
    /// RAM size in bytes; `None` picks the model default.
    pub ram_size: Option<usize>,
}

impl MacConfig {
    #[must_use]
    pub fn new(model: MacModel, rom: Vec<u8>) -> Self {
        Self {
            model,
            rom,
            ram_size: None,
        }
    }

    #[must_use]
    pub fn with_ram(mut self, bytes: usize) -> Self {
        self.ram_size = Some(bytes);
        self
    }

    /// Installed RAM after applying the model default.
    #[must_use]
    pub fn effective_ram(&self) -> usize {
        self.ram_size
            .unwrap_or_else(|| self.model.capabilities().default_ram)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let len = self.rom.len();
        if len < 2 || !len.is_power_of_two() {
            return Err(ConfigError::RomSize(len));
        }
        let ram = self.effective_ram();
        if !self.model.capabilities().ram_options.contains(&ram) {
            return Err(ConfigError::RamSize {
                model: self.model.name(),
                ram,
            });
        }
        Ok(())
    }
}
