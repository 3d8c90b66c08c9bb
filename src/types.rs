use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

pub const DEFAULT_TIMEOUT_SECS: f64 = 300.0;
pub const DEFAULT_CHECK_INTERVAL: usize = 100;

/// First positional argument: whether the query engine may cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Caching {
    Cache,
    Nocache,
}

/// Caching policy handed to the query engine when it is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Always,
    Dummy,
}

impl CachePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CachePolicy::Always => "always",
            CachePolicy::Dummy => "dummy",
        }
    }
}

impl From<Caching> for CachePolicy {
    fn from(caching: Caching) -> Self {
        match caching {
            Caching::Cache => CachePolicy::Always,
            Caching::Nocache => CachePolicy::Dummy,
        }
    }
}

/// Second positional argument: report timings or the per-query trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    Benchmark,
    Verify,
}

/// Which join the reference query engine evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryLevel {
    /// Attends records for the course
    #[value(name = "1")]
    One,
    /// Attends records joined with their students
    #[value(name = "2")]
    Two,
    /// Attends records joined with their students and courses
    #[value(name = "3")]
    Three,
}

/// The dataset document read from stdin.
///
/// `OPS` stays loosely typed here; `ops::encode_ops` resolves it once the
/// entities exist.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    #[serde(rename = "N")]
    pub n: usize,
    pub ratio: f64,
    #[serde(rename = "INIT_ATT")]
    pub init_att: Vec<[usize; 2]>,
    #[serde(rename = "OPS")]
    pub ops: Vec<serde_json::Value>,
}

/// Everything the driver needs to know about how to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    pub mode: RunMode,
    pub policy: CachePolicy,
    /// CPU-time budget for the operation loop.
    pub timeout: Duration,
    /// Number of operations between timeout checks. Must be at least 1;
    /// `Driver::new` panics otherwise.
    pub check_interval: usize,
}

impl RunConfig {
    pub fn new(mode: RunMode, policy: CachePolicy) -> Self {
        RunConfig {
            mode,
            policy,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    pub fn verifying(&self) -> bool {
        self.mode == RunMode::Verify
    }
}
