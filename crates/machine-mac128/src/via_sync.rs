//! VIA access wait states.
//!
//! The VIA is clocked from the 68000 E clock (CPU clock / 10) and answers
//! on VPA. The CPU sees VPA two cycles into the access, then waits for the
//! next rising E edge, which falls on an absolute cycle count divisible by
//! ten. The access ends four cycles later when E drops.

use crate::peripherals::MainCpu;
use emu_core::Ticks;

/// CPU cycles per E clock.
pub const E_CLOCK_DIVIDER: u64 = 10;
/// Cycles from the start of the bus cycle until VPA is sampled.
pub const VPA_LATENCY: u64 = 2;
/// Cycles from the E edge to the end of the access.
pub const VIA_ACCESS_CYCLES: u64 = 4;

/// Wait cycles inserted before the VIA sees an access started at `cycle`.
#[must_use]
pub const fn wait_cycles(cycle: u64) -> u64 {
    let edge = Ticks::new(cycle + VPA_LATENCY).align_up(E_CLOCK_DIVIDER);
    edge.get() - cycle
}

/// Stall the CPU up to the E edge.
pub fn sync_start(cpu: &mut dyn MainCpu) {
    let wait = wait_cycles(cpu.total_cycles());
    cpu.adjust_icount(-(wait as i64));
}

/// Account for the tail of the E-clock access.
pub fn sync_end(cpu: &mut dyn MainCpu) {
    cpu.adjust_icount(-(VIA_ACCESS_CYCLES as i64));
}

/// Run one VIA register access bracketed by the wait states.
pub fn synced<R>(cpu: &mut dyn MainCpu, access: impl FnOnce() -> R) -> R {
    sync_start(cpu);
    let result = access();
    sync_end(cpu);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_reaches_next_e_edge_past_vpa() {
        assert_eq!(wait_cycles(0), 10);
        assert_eq!(wait_cycles(7), 3);
        assert_eq!(wait_cycles(8), 2);
        assert_eq!(wait_cycles(9), 11);
        assert_eq!(wait_cycles(10), 10);
    }

    #[test]
    fn wait_is_at_least_vpa_latency() {
        for cycle in 0..100 {
            let wait = wait_cycles(cycle);
            assert!((VPA_LATENCY..VPA_LATENCY + E_CLOCK_DIVIDER).contains(&wait));
        }
    }
}
