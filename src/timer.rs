use std::time::{Duration, Instant};

use cpu_time::ThreadTime;

/// A monotonic tick counter in nanoseconds.
pub trait TickSource {
    fn now(&self) -> u64;
}

/// Wall-clock time since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        WallClock {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for WallClock {
    fn now(&self) -> u64 {
        duration_nanos(self.origin.elapsed())
    }
}

/// CPU time consumed by the calling thread. Time spent blocked or
/// descheduled does not count, so it must be read from the thread doing
/// the work.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadCpuClock;

impl TickSource for ThreadCpuClock {
    fn now(&self) -> u64 {
        duration_nanos(ThreadTime::now().as_duration())
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Resumable cumulative stopwatch.
#[derive(Debug, Clone)]
pub struct Timer<S> {
    source: S,
    ticks: u64,
    last_start: u64,
    running: bool,
}

pub type WallTimer = Timer<WallClock>;
pub type CpuTimer = Timer<ThreadCpuClock>;

impl<S: TickSource> Timer<S> {
    pub fn new(source: S) -> Self {
        Timer {
            source,
            ticks: 0,
            last_start: 0,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        assert!(!self.running, "Timer::start called while running");
        self.running = true;
        self.last_start = self.source.now();
    }

    pub fn stop(&mut self) {
        assert!(self.running, "Timer::stop called while stopped");
        self.ticks += self.source.now().saturating_sub(self.last_start);
        self.running = false;
    }

    /// Total accumulated nanoseconds. A running timer folds the current
    /// interval in and re-anchors at now, so it keeps running.
    pub fn elapsed(&mut self) -> u64 {
        if self.running {
            let t = self.source.now();
            self.ticks += t.saturating_sub(self.last_start);
            self.last_start = t;
        }
        self.ticks
    }

    pub fn elapsed_duration(&mut self) -> Duration {
        Duration::from_nanos(self.elapsed())
    }

    pub fn elapsed_secs(&mut self) -> f64 {
        nanos_to_secs(self.elapsed())
    }
}

pub fn nanos_to_secs(nanos: u64) -> f64 {
    nanos as f64 / 1_000_000_000.0
}

/// Tick source driven by hand, for tests.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct ManualClock(std::rc::Rc<std::cell::Cell<u64>>);

#[cfg(test)]
impl ManualClock {
    pub(crate) fn set(&self, nanos: u64) {
        self.0.set(nanos);
    }

    pub(crate) fn advance(&self, nanos: u64) {
        self.0.set(self.0.get() + nanos);
    }
}

#[cfg(test)]
impl TickSource for ManualClock {
    fn now(&self) -> u64 {
        self.0.get()
    }
}
