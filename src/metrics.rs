use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::timer::{ThreadCpuClock, TickSource, Timer, WallClock};

/// Result payload written to stdout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Timing {
        time_cpu: f64,
        time_wall: f64,
        /// Primary metric for comparisons; same value as `time_cpu`.
        stdmetric: f64,
    },
    TimedOut {
        timedout: bool,
    },
    Output {
        output: Vec<Value>,
    },
}

/// CPU and wall timers bracketing the operation loop, plus the verify
/// trace and the timeout flag.
#[derive(Debug)]
pub struct Metrics<C = ThreadCpuClock, W = WallClock> {
    cpu: Timer<C>,
    wall: Timer<W>,
    outputs: Vec<Value>,
    timed_out: bool,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics::with_clocks(ThreadCpuClock, WallClock::new())
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TickSource, W: TickSource> Metrics<C, W> {
    pub fn with_clocks(cpu: C, wall: W) -> Self {
        Metrics {
            cpu: Timer::new(cpu),
            wall: Timer::new(wall),
            outputs: Vec::new(),
            timed_out: false,
        }
    }

    pub fn begin(&mut self) {
        self.cpu.start();
        self.wall.start();
    }

    pub fn end(&mut self) {
        self.cpu.stop();
        self.wall.stop();
    }

    pub fn record_output(&mut self, output: Value) {
        self.outputs.push(output);
    }

    pub fn outputs(&self) -> &[Value] {
        &self.outputs
    }

    pub fn mark_timed_out(&mut self) {
        self.timed_out = true;
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn cpu_elapsed(&mut self) -> Duration {
        self.cpu.elapsed_duration()
    }

    pub fn total_cpu_time(&mut self) -> f64 {
        self.cpu.elapsed_secs()
    }

    pub fn total_wall_time(&mut self) -> f64 {
        self.wall.elapsed_secs()
    }

    /// Timing numbers, or only the timeout marker if the loop was cut short.
    pub fn format_time_data(&mut self) -> Report {
        if self.timed_out {
            return Report::TimedOut { timedout: true };
        }
        let time_cpu = self.total_cpu_time();
        Report::Timing {
            time_cpu,
            time_wall: self.total_wall_time(),
            stdmetric: time_cpu,
        }
    }

    /// The recorded trace, whether or not the loop timed out.
    pub fn format_output_data(self) -> Report {
        Report::Output {
            output: self.outputs,
        }
    }
}
