// src/timer.rs

use crate::session::Mode;
use log::{debug, trace};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
    mpsc::Sender,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { mode: Mode, remaining: u64 },
    Finished(Mode),
}

struct Flags {
    remaining: AtomicU64,
    paused: AtomicBool,
    cancelled: AtomicBool,
}

/**
 * Counts a period down on a background thread, one `unit` per step.
 */
pub struct Countdown {
    mode: Mode,
    flags: Arc<Flags>,
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn start(mode: Mode, seconds: u64, unit: Duration, events: Sender<TimerEvent>) -> Self {
        let flags: Arc<Flags> = Arc::new(Flags {
            remaining: AtomicU64::new(seconds),
            paused: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
        });
        let worker: Arc<Flags> = Arc::clone(&flags);
        debug!("Starting {} countdown of {}s", mode, seconds);
        let handle: JoinHandle<()> = thread::spawn(move || run(mode, unit, &worker, &events));
        Self {
            mode,
            flags,
            handle: Some(handle),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn remaining(&self) -> u64 {
        self.flags.remaining.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.flags.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.flags.paused.store(false, Ordering::SeqCst);
    }

    pub fn cancel(&self) {
        self.flags.cancelled.store(true, Ordering::SeqCst);
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(mode: Mode, unit: Duration, flags: &Flags, events: &Sender<TimerEvent>) {
    // Paused and cancelled are re-checked at this granularity while sleeping.
    let poll: Duration = (unit / 10).max(Duration::from_millis(1)).min(unit);
    while flags.remaining.load(Ordering::SeqCst) > 0 {
        if !sleep_unit(unit, poll, flags) {
            trace!("{} countdown cancelled", mode);
            return;
        }
        let remaining: u64 = flags.remaining.fetch_sub(1, Ordering::SeqCst) - 1;
        if events.send(TimerEvent::Tick { mode, remaining }).is_err() {
            return;
        }
    }
    let _ = events.send(TimerEvent::Finished(mode));
}

/// Sleeps for one unit of unpaused time. Returns false when cancelled.
fn sleep_unit(unit: Duration, poll: Duration, flags: &Flags) -> bool {
    let mut slept: Duration = Duration::ZERO;
    while slept < unit {
        if flags.cancelled.load(Ordering::SeqCst) {
            return false;
        }
        let step: Duration = poll.min(unit - slept);
        thread::sleep(step);
        if !flags.paused.load(Ordering::SeqCst) {
            slept += step;
        }
    }
    !flags.cancelled.load(Ordering::SeqCst)
}
