//! Mouse quadrature generation.
//!
//! The mouse reports each axis as two phase-shifted square waves. The
//! first phase of each axis is wired to an SCC DCD input (which interrupts
//! on every edge); the second phase is read back on VIA port B to tell
//! the direction. The host mouse is sampled as an absolute 8-bit position,
//! so movement is accumulated and replayed at one edge per poll per axis.

/// Edges to drive onto the SCC DCD inputs after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DcdEdges {
    /// Level for DCD A (X axis), if the X axis stepped.
    pub x: Option<bool>,
    /// Level for DCD B (Y axis), if the Y axis stepped.
    pub y: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct QuadratureMouse {
    /// Last absolute sample per axis.
    last_raw: [u8; 2],
    /// Movement not yet replayed as edges.
    pending: [i32; 2],
    /// Direction phase, read on VIA PB4 (X) and PB5 (Y).
    phase_b: [bool; 2],
    /// Level of the DCD phase.
    phase_a: [bool; 2],
}

/// Signed delta between two 8-bit samples, assuming the shorter way round.
#[must_use]
pub fn wrapped_delta(old: u8, new: u8) -> i32 {
    let diff = i32::from(new) - i32::from(old);
    if diff > 0x80 {
        diff - 0x100
    } else if diff < -0x80 {
        diff + 0x100
    } else {
        diff
    }
}

impl QuadratureMouse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction bits for VIA port B: (X2, Y2).
    #[must_use]
    pub fn direction_bits(&self) -> (bool, bool) {
        (self.phase_b[0], self.phase_b[1])
    }

    /// Movement still queued per axis.
    #[must_use]
    pub fn pending(&self) -> (i32, i32) {
        (self.pending[0], self.pending[1])
    }

    /// Sample the host position and emit at most one edge per axis.
    pub fn poll(&mut self, raw_x: u8, raw_y: u8) -> DcdEdges {
        for (axis, raw) in [raw_x, raw_y].into_iter().enumerate() {
            if raw != self.last_raw[axis] {
                self.pending[axis] += wrapped_delta(self.last_raw[axis], raw);
                self.last_raw[axis] = raw;
            }
        }

        let x = self.drain(0);
        // Y phase order is the mirror of X.
        let y = -self.drain(1);

        DcdEdges {
            x: self.step(0, x),
            y: self.step(1, y),
        }
    }

    fn drain(&mut self, axis: usize) -> i32 {
        let pending = &mut self.pending[axis];
        match (*pending).signum() {
            -1 => {
                *pending += 1;
                -1
            }
            1 => {
                *pending -= 1;
                1
            }
            _ => 0,
        }
    }

    fn step(&mut self, axis: usize, direction: i32) -> Option<bool> {
        if direction == 0 {
            return None;
        }
        let level = self.phase_a[axis];
        self.phase_b[axis] = if direction < 0 { !level } else { level };
        self.phase_a[axis] = !level;
        Some(level)
    }
}
