//! Raster timing, the sound buffer pull and framebuffer serialisation.
//!
//! The compact Mac has no video or sound DMA controller. The beam counter
//! fetches framebuffer words during the visible part of each line and one
//! sound-buffer word per line during horizontal blank. Both buffers sit at
//! fixed distances below the top of RAM, with an alternate copy selected
//! by VIA port A.
//!
//! | Buffer            | Offset below top of RAM (bytes) |
//! |-------------------|---------------------------------|
//! | Screen, primary   | $5900                           |
//! | Screen, alternate | $D900                           |
//! | Sound, primary    | $0300                           |
//! | Sound, alternate  | $5F00                           |

use crate::memory::Memory;
use crate::peripherals::ScreenTiming;
use emu_core::Ticks;

/// Visible pixels per line.
pub const H_VISIBLE: u32 = 512;
/// Visible lines per frame.
pub const V_VISIBLE: u32 = 342;
/// Pixel clocks per line including blanking.
pub const H_TOTAL: u32 = 704;
/// Lines per frame including blanking.
pub const V_TOTAL: u32 = 370;

/// CPU cycles per pixel.
pub const PIXELS_PER_CYCLE: u32 = 2;
/// CPU cycles per line.
pub const LINE_CYCLES: u64 = (H_TOTAL / PIXELS_PER_CYCLE) as u64;
/// CPU cycles per frame.
pub const FRAME_CYCLES: u64 = LINE_CYCLES * V_TOTAL as u64;

const SCREEN_PRIMARY_WORDS: u32 = 0x5900 >> 1;
const SCREEN_ALTERNATE_WORDS: u32 = 0xD900 >> 1;
const SOUND_PRIMARY_WORDS: u32 = 0x0300 >> 1;
const SOUND_ALTERNATE_WORDS: u32 = 0x5F00 >> 1;

/// Timers owned by the glue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacTimer {
    /// Fires once per line; `param` is the line number.
    Scanline,
    /// Fires at the end of the visible part of a line.
    HBlank,
}

/// Word offset of the sound buffer.
#[must_use]
pub fn sound_buffer_base(ram_words: u32, primary: bool) -> u32 {
    ram_words.wrapping_sub(if primary {
        SOUND_PRIMARY_WORDS
    } else {
        SOUND_ALTERNATE_WORDS
    })
}

/// Word offset of the framebuffer.
#[must_use]
pub fn framebuffer_base(ram_words: u32, primary: bool) -> u32 {
    ram_words.wrapping_sub(if primary {
        SCREEN_PRIMARY_WORDS
    } else {
        SCREEN_ALTERNATE_WORDS
    })
}

/// Sound-buffer word fetched on `line`.
#[must_use]
pub fn sound_word(memory: &Memory, primary: bool, line: u32) -> u16 {
    memory.read_ram(sound_buffer_base(memory.ram_words(), primary).wrapping_add(line))
}

/// Serialise the visible frame into one byte per pixel (1 = black).
///
/// `out` must hold at least `H_VISIBLE * V_VISIBLE` bytes.
pub fn render_frame(memory: &Memory, primary: bool, out: &mut [u8]) {
    let mut word_addr = framebuffer_base(memory.ram_words(), primary);
    let pixels = out.chunks_exact_mut(16).take((H_VISIBLE * V_VISIBLE / 16) as usize);
    for chunk in pixels {
        let word = memory.read_ram(word_addr);
        word_addr = word_addr.wrapping_add(1);
        for (bit, pixel) in chunk.iter_mut().enumerate() {
            *pixel = ((word >> (15 - bit)) & 1) as u8;
        }
    }
}

/// Beam position derived from the CPU cycle count.
///
/// The frame starts at cycle 0 with line 0, pixel 0 and repeats every
/// [`FRAME_CYCLES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MacRaster {
    now: Ticks,
}

impl MacRaster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&mut self, now: Ticks) {
        self.now = now;
    }

    #[must_use]
    pub fn now(&self) -> Ticks {
        self.now
    }

    #[must_use]
    pub fn hpos(&self) -> u32 {
        ((self.now.get() % LINE_CYCLES) as u32) * PIXELS_PER_CYCLE
    }
}

impl ScreenTiming for MacRaster {
    fn vpos(&self) -> u32 {
        ((self.now.get() % FRAME_CYCLES) / LINE_CYCLES) as u32
    }

    fn vblank(&self) -> bool {
        self.vpos() >= V_VISIBLE
    }

    fn height(&self) -> u32 {
        V_TOTAL
    }

    fn time_until_pos(&self, line: u32, hpos: u32) -> Ticks {
        let current = self.now.get() % FRAME_CYCLES;
        let line = u64::from(line % V_TOTAL);
        let mut target = line * LINE_CYCLES + u64::from(hpos / PIXELS_PER_CYCLE);
        if target <= current {
            target += FRAME_CYCLES;
        }
        Ticks::new(target - current)
    }
}
