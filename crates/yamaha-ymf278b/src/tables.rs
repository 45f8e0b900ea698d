//! Rate, attenuation and pan lookup tables.
//!
//! Attenuation is counted in 0.375 dB units throughout the wavetable
//! path: 8 units are -3 dB and 256 units are -96 dB (silence).

#![allow(clippy::cast_precision_loss)]

/// Attenuation index range of the volume table. Indices of 256 and above
/// are silent; the extra room absorbs TL + pan + envelope sums.
pub const VOLUME_ENTRIES: usize = 1024;

/// Precomputed tables, built once per chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    /// Attack duration per effective rate.
    pub lut_ar: [u32; 64],
    /// Decay/release duration per effective rate.
    pub lut_dr: [u32; 64],
    /// Linear gain (1.0 = 65536) per attenuation index.
    pub volume: [i32; VOLUME_ENTRIES],
    /// Left attenuation per pan code.
    pub pan_left: [i32; 16],
    /// Right attenuation per pan code.
    pub pan_right: [i32; 16],
    /// Output mix gain per 3-bit mix code. Code 7 mutes.
    pub mix_level: [i32; 8],
}

impl Tables {
    #[must_use]
    pub fn build() -> Self {
        let mut lut_dr = [0u32; 64];
        let mut lut_ar = [0u32; 64];
        for i in 0..64u32 {
            lut_dr[i as usize] = match i {
                0..=3 => 0,
                4..=59 => (15 << (21 - i / 4)) / (4 + i % 4),
                _ => 15 << 4,
            };
            lut_ar[i as usize] = match i {
                0..=3 | 63 => 0,
                4..=59 => (67 << (15 - i / 4)) / (4 + i % 4),
                _ => 17,
            };
        }

        let mut volume = [0i32; VOLUME_ENTRIES];
        for (i, v) in volume.iter_mut().take(256).enumerate() {
            *v = (65536.0 * 2f64.powf((-0.375 / 6.0) * i as f64)) as i32;
        }

        let mut pan_left = [0i32; 16];
        let mut pan_right = [0i32; 16];
        for i in 0..16i32 {
            pan_left[i as usize] = match i {
                0..=6 => i * 8,
                7 | 8 => 256,
                _ => 0,
            };
            pan_right[i as usize] = match i {
                0..=7 => 0,
                8 | 9 => 256,
                _ => (16 - i) * 8,
            };
        }

        // 3 dB steps with 13 units of headroom.
        let mut mix_level = [0i32; 8];
        for (i, level) in mix_level.iter_mut().take(7).enumerate() {
            *level = volume[8 * i + 13];
        }

        Self {
            lut_ar,
            lut_dr,
            volume,
            pan_left,
            pan_right,
            mix_level,
        }
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self::build()
    }
}
