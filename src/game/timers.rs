//! Timer seam between the state machine and whatever drives time.
//!
//! The game owns at most one live handle per `Timer` kind and talks to a
//! `Scheduler` to start and cancel repeating timers. The browser backs this
//! with `setInterval`; `VirtualScheduler` runs the same contract on a virtual
//! millisecond clock so whole rounds can be replayed in tests.

/// The two periodic actions of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Mole relocation, interval taken from the difficulty's speed schedule.
    Spawn,
    /// One-second countdown.
    Countdown,
}

/// Opaque id of a started timer (the interval id in the browser).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub i32);

pub trait Scheduler {
    /// Starts a repeating timer; first fire after one full interval. `None`
    /// when the platform refused, in which case the game runs without it.
    fn start(&mut self, timer: Timer, interval_ms: u32) -> Option<TimerHandle>;
    /// Cancels synchronously: a cancelled handle never fires again.
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Clone, Copy, Debug)]
struct VirtualTimer {
    handle: TimerHandle,
    timer: Timer,
    interval_ms: u64,
    next_due_ms: u64,
}

/// Deterministic scheduler on a virtual clock. Timers due at the same instant
/// fire in the order they were started.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now_ms: u64,
    next_id: i32,
    live: Vec<VirtualTimer>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, timer: Timer) -> bool {
        self.live.iter().any(|t| t.timer == timer)
    }

    /// Interval of the live timer of this kind, if any.
    pub fn interval_of(&self, timer: Timer) -> Option<u32> {
        self.live
            .iter()
            .find(|t| t.timer == timer)
            .map(|t| t.interval_ms as u32)
    }

    /// Removes the earliest timer due at or before `until_ms`, moves the clock
    /// to its due time and re-arms it one interval later.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, Timer)> {
        let due = self
            .live
            .iter_mut()
            .filter(|t| t.next_due_ms <= until_ms)
            .min_by_key(|t| (t.next_due_ms, t.handle.0))?;
        self.now_ms = self.now_ms.max(due.next_due_ms);
        due.next_due_ms += due.interval_ms;
        Some((due.handle, due.timer))
    }

    /// Moves the clock forward once nothing else is due.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

impl Scheduler for VirtualScheduler {
    fn start(&mut self, timer: Timer, interval_ms: u32) -> Option<TimerHandle> {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        // A zero interval would never let the clock move.
        let interval_ms = u64::from(interval_ms.max(1));
        self.live.push(VirtualTimer {
            handle,
            timer,
            interval_ms,
            next_due_ms: self.now_ms + interval_ms,
        });
        Some(handle)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.live.retain(|t| t.handle != handle);
    }
}
