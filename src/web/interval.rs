// `setInterval`-backed scheduler. One long-lived closure per timer kind is
// registered with every interval, so cancelling never drops a closure that
// might be running.
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::game::{Scheduler, Timer, TimerHandle};

pub struct IntervalScheduler {
    window: Window,
    callbacks: [Closure<dyn FnMut()>; 2],
    live: [Option<TimerHandle>; 2],
}

fn slot(timer: Timer) -> usize {
    match timer {
        Timer::Spawn => 0,
        Timer::Countdown => 1,
    }
}

impl IntervalScheduler {
    /// `on_fire` is invoked from the browser event loop with the kind that fired.
    pub fn new(window: Window, on_fire: fn(Timer)) -> Self {
        let spawn = Closure::wrap(Box::new(move || on_fire(Timer::Spawn)) as Box<dyn FnMut()>);
        let countdown =
            Closure::wrap(Box::new(move || on_fire(Timer::Countdown)) as Box<dyn FnMut()>);
        Self { window, callbacks: [spawn, countdown], live: [None, None] }
    }

    /// Handle of the interval currently registered for `timer`.
    pub fn live_handle(&self, timer: Timer) -> Option<TimerHandle> {
        self.live[slot(timer)]
    }
}

impl Scheduler for IntervalScheduler {
    fn start(&mut self, timer: Timer, interval_ms: u32) -> Option<TimerHandle> {
        let idx = slot(timer);
        let timeout = i32::try_from(interval_ms).unwrap_or(i32::MAX);
        match self.window.set_interval_with_callback_and_timeout_and_arguments_0(
            self.callbacks[idx].as_ref().unchecked_ref(),
            timeout,
        ) {
            Ok(id) => {
                let handle = TimerHandle(id);
                self.live[idx] = Some(handle);
                Some(handle)
            }
            Err(err) => {
                log::error!("setInterval failed for {timer:?}: {err:?}");
                None
            }
        }
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.window.clear_interval_with_handle(handle.0);
        for live in &mut self.live {
            if *live == Some(handle) {
                *live = None;
            }
        }
    }
}
