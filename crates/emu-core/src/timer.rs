//! One-shot timers keyed by identity.
//!
//! Each timer id has at most one pending expiry. Re-arming an id replaces
//! its previous expiry, which is how per-scanline and busy-flag timers are
//! driven: the callback that fires re-arms itself for the next event.

use crate::Ticks;

/// A timer that has reached its expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: T,
    /// Value supplied when the timer was armed (e.g. the scanline number).
    pub param: u32,
    /// Absolute expiry time.
    pub at: Ticks,
}

#[derive(Debug, Clone)]
struct Armed<T> {
    id: T,
    due: Ticks,
    param: u32,
    seq: u64,
}

/// Time-ordered set of pending one-shot timers.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Ticks,
    armed: Vec<Armed<T>>,
    next_seq: u64,
}

impl<T: Copy + PartialEq> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + PartialEq> TimerQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Ticks::ZERO,
            armed: Vec::new(),
            next_seq: 0,
        }
    }

    /// Current time as seen by the queue.
    #[must_use]
    pub fn now(&self) -> Ticks {
        self.now
    }

    /// Arm `id` to fire `delay` ticks from now, replacing any pending expiry.
    pub fn adjust(&mut self, id: T, delay: Ticks, param: u32) {
        self.cancel(id);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.armed.push(Armed {
            id,
            due: self.now + delay,
            param,
            seq,
        });
    }

    pub fn cancel(&mut self, id: T) {
        self.armed.retain(|t| t.id != id);
    }

    #[must_use]
    pub fn is_armed(&self, id: T) -> bool {
        self.armed.iter().any(|t| t.id == id)
    }

    /// Absolute expiry of `id`, if armed.
    #[must_use]
    pub fn due(&self, id: T) -> Option<Ticks> {
        self.armed.iter().find(|t| t.id == id).map(|t| t.due)
    }

    /// Earliest pending expiry.
    #[must_use]
    pub fn next_due(&self) -> Option<Ticks> {
        self.armed.iter().map(|t| t.due).min()
    }

    /// Remove and return the earliest timer due at or before `limit`.
    ///
    /// Current time moves to the timer's expiry. Timers with equal expiry
    /// fire in the order they were armed.
    pub fn pop_due(&mut self, limit: Ticks) -> Option<Fired<T>> {
        let (index, _) = self
            .armed
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(_, t)| (t.due, t.seq))?;
        let timer = self.armed.swap_remove(index);
        if timer.due > self.now {
            self.now = timer.due;
        }
        Some(Fired {
            id: timer.id,
            param: timer.param,
            at: timer.due,
        })
    }

    /// Move current time forward without firing anything.
    pub fn advance_to(&mut self, time: Ticks) {
        if time > self.now {
            self.now = time;
        }
    }
}
