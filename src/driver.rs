use std::fmt;
use std::hint::black_box;
use std::io::{Read, Write};

use log::{debug, info, warn};

use crate::errors::BenchError;
use crate::metrics::{Metrics, Report};
use crate::model::CourseRef;
use crate::ops::{Op, encode_ops};
use crate::query::QueryEngine;
use crate::timer::TickSource;
use crate::types::{Dataset, RunConfig};
use crate::world::World;

/// Driver lifecycle. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    ArgsResolved,
    DataImported,
    SetUp,
    Executed,
    Exported,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::ArgsResolved => "args resolved",
            Phase::DataImported => "data imported",
            Phase::SetUp => "set up",
            Phase::Executed => "executed",
            Phase::Exported => "exported",
        };
        f.write_str(name)
    }
}

/// Entities and resolved operations, built once before timing starts.
#[derive(Debug)]
pub struct Prepared {
    pub world: World,
    pub ops: Vec<Op>,
    pub course0: CourseRef,
    /// Carried through from the dataset; the loop never reads it.
    pub ratio: f64,
}

/// Read the whole of `reader` and decode it as a `Dataset`.
pub fn import_data<R: Read>(mut reader: R) -> Result<Dataset, BenchError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(BenchError::InputRead)?;
    serde_json::from_slice(&bytes).map_err(BenchError::from_dataset_error)
}

/// Materialize entities and resolve the operation list.
pub fn set_up(dataset: &Dataset) -> Result<Prepared, BenchError> {
    let world = World::populate(dataset.n, &dataset.init_att)?;
    let course0 = world.course0()?.clone();
    let ops = encode_ops(&dataset.ops, &world)?;
    Ok(Prepared {
        world,
        ops,
        course0,
        ratio: dataset.ratio,
    })
}

/// Write `report` as one JSON document and flush.
///
/// The document is serialized in full before anything is written.
pub fn export_data<W: Write>(report: &Report, mut writer: W) -> Result<(), BenchError> {
    let bytes = serde_json::to_vec(report).map_err(BenchError::OutputSerialize)?;
    writer.write_all(&bytes).map_err(BenchError::OutputWrite)?;
    writer.flush().map_err(BenchError::OutputWrite)
}

pub struct Driver<Q> {
    config: RunConfig,
    engine: Q,
    phase: Phase,
}

impl<Q: QueryEngine> Driver<Q> {
    /// Panics if `config.check_interval` is zero.
    pub fn new(config: RunConfig, engine: Q) -> Self {
        assert!(config.check_interval >= 1, "check_interval must be at least 1");
        Driver {
            config,
            engine,
            phase: Phase::ArgsResolved,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn engine(&self) -> &Q {
        &self.engine
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(next > self.phase, "cannot move from {} to {}", self.phase, next);
        debug!("phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Import, set up, execute and export in one pass.
    ///
    /// On error nothing is written to `output`.
    pub fn run<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<Report, BenchError> {
        let dataset = import_data(input)?;
        info!(
            "imported dataset: N = {}, ratio = {}, {} initial attends, {} ops",
            dataset.n,
            dataset.ratio,
            dataset.init_att.len(),
            dataset.ops.len()
        );
        self.advance(Phase::DataImported);

        let mut prepared = set_up(&dataset)?;
        drop(dataset);
        self.advance(Phase::SetUp);

        let report = self.execute(&mut prepared);

        export_data(&report, output)?;
        self.advance(Phase::Exported);
        Ok(report)
    }

    /// Run the operation loop with real CPU and wall clocks.
    pub fn execute(&mut self, prepared: &mut Prepared) -> Report {
        self.execute_with(prepared, Metrics::new())
    }

    /// Run the operation loop, timing it with `metrics`.
    pub fn execute_with<C: TickSource, W: TickSource>(
        &mut self,
        prepared: &mut Prepared,
        mut metrics: Metrics<C, W>,
    ) -> Report {
        let verifying = self.config.verifying();
        let timeout = self.config.timeout;
        let check_interval = self.config.check_interval;
        let Prepared {
            world, ops, course0, ..
        } = prepared;

        metrics.begin();

        for (i, op) in ops.iter().enumerate() {
            // Sample before the 1-indexed op numbers k, 2k, 3k, ...
            if (i + 1) % check_interval == 0 && metrics.cpu_elapsed() > timeout {
                metrics.mark_timed_out();
                warn!(
                    "timed out after {:?} of CPU time; {} of {} ops applied",
                    timeout,
                    i,
                    ops.len()
                );
                break;
            }

            match op {
                Op::Query => {
                    let output = self.engine.query(world, course0);
                    if verifying {
                        metrics.record_output(self.engine.format_output(&output));
                    } else {
                        black_box(output);
                    }
                }
                Op::Update {
                    index,
                    student,
                    course,
                } => {
                    world.replace_attends(*index, student, course);
                }
            }
        }

        metrics.end();
        self.advance(Phase::Executed);
        info!("executed {} ops, timed out: {}", ops.len(), metrics.timed_out());

        if verifying {
            metrics.format_output_data()
        } else {
            metrics.format_time_data()
        }
    }
}
