//! Shared building blocks for the chip and machine crates.
//!
//! Time is counted in master-clock ticks. Devices that run from a divided
//! clock express their rate through [`MasterClock::divided`], and deferred
//! work is queued on a [`TimerQueue`] rather than polled.

mod clock;
mod observable;
mod ticks;
mod timer;

pub use clock::MasterClock;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
pub use timer::{Fired, TimerQueue};
