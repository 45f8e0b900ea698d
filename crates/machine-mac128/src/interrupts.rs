//! 68000 interrupt priority fan-in.
//!
//! | Source        | IPL |
//! |---------------|-----|
//! | SCC or SCSI   | 2   |
//! | VIA           | 1   |
//!
//! Only one level is driven at a time. Every input change clears the
//! level taken last, then asserts the newly computed one.

use crate::peripherals::MainCpu;

/// Level raised for the VIA.
pub const VIA_LEVEL: u8 = 1;
/// Level raised for the SCC and the SCSI controller.
pub const SCC_SCSI_LEVEL: u8 = 2;

/// Line operations produced by one arbiter evaluation, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IrqChange {
    pub clear: Option<u8>,
    pub assert: Option<u8>,
}

impl IrqChange {
    /// Drive the change onto the CPU: clear first, then assert.
    pub fn apply(self, cpu: &mut dyn MainCpu) {
        if let Some(level) = self.clear {
            cpu.set_irq_line(level, false);
        }
        if let Some(level) = self.assert {
            cpu.set_irq_line(level, true);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InterruptArbiter {
    via: bool,
    scc: bool,
    scsi: bool,
    taken: Option<u8>,
}

impl InterruptArbiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_via(&mut self, state: bool) -> IrqChange {
        self.via = state;
        self.field()
    }

    pub fn set_scc(&mut self, state: bool) -> IrqChange {
        self.scc = state;
        self.field()
    }

    pub fn set_scsi(&mut self, state: bool) -> IrqChange {
        self.scsi = state;
        self.field()
    }

    /// Level computed from the current inputs.
    #[must_use]
    pub fn pending_level(&self) -> Option<u8> {
        if self.scc || self.scsi {
            Some(SCC_SCSI_LEVEL)
        } else if self.via {
            Some(VIA_LEVEL)
        } else {
            None
        }
    }

    /// Level currently driven onto the CPU.
    #[must_use]
    pub fn asserted(&self) -> Option<u8> {
        self.taken
    }

    #[must_use]
    pub fn inputs(&self) -> (bool, bool, bool) {
        (self.via, self.scc, self.scsi)
    }

    /// Forget the driven level. Inputs belong to their devices and persist.
    pub fn reset(&mut self) {
        self.taken = None;
    }

    fn field(&mut self) -> IrqChange {
        let change = IrqChange {
            clear: self.taken.take(),
            assert: self.pending_level(),
        };
        self.taken = change.assert;
        change
    }
}
