use std::io;
use std::process;
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Parser;
use log::info;

use jqlbench::driver::Driver;
use jqlbench::query::{AttendsQuery, AttendsStudentCourseQuery, AttendsStudentQuery, QueryEngine};
use jqlbench::types::{
    CachePolicy, Caching, DEFAULT_CHECK_INTERVAL, DEFAULT_TIMEOUT_SECS, QueryLevel, RunConfig,
    RunMode,
};

#[derive(Parser)]
#[command(
    name = "jqlbench",
    version,
    about = "Replay a recorded query/update workload read from stdin and report timings or a query trace"
)]
struct Cli {
    /// Caching policy for the query engine
    caching: Caching,

    /// Report CPU/wall timings, or the result of every query
    mode: RunMode,

    /// Which join to run for each query
    #[arg(long, default_value = "1")]
    level: QueryLevel,

    /// CPU-time budget in seconds before the run is reported as timed out
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: f64,

    /// Operations between timeout checks
    #[arg(
        long,
        default_value_t = DEFAULT_CHECK_INTERVAL as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    check_interval: u64,
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let timeout = Duration::try_from_secs_f64(cli.timeout)
        .map_err(|_| anyhow!("Invalid --timeout {}: must be a non-negative number of seconds", cli.timeout))?;
    let check_interval = usize::try_from(cli.check_interval)?;

    let policy = CachePolicy::from(cli.caching);
    let config = RunConfig {
        timeout,
        check_interval,
        ..RunConfig::new(cli.mode, policy)
    };
    info!(
        "caching policy = {}, mode = {:?}, level = {:?}",
        policy.as_str(),
        cli.mode,
        cli.level
    );

    match cli.level {
        QueryLevel::One => replay(config, AttendsQuery::new(policy)),
        QueryLevel::Two => replay(config, AttendsStudentQuery::new(policy)),
        QueryLevel::Three => replay(config, AttendsStudentCourseQuery::new(policy)),
    }
}

fn replay<Q: QueryEngine>(config: RunConfig, engine: Q) -> Result<()> {
    let mut driver = Driver::new(config, engine);
    driver.run(io::stdin().lock(), io::stdout().lock())?;
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("{}", err);
        process::exit(1);
    }
}
