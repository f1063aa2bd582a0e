//! Advance a scenario for a number of ticks.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use park_core::{
    CommandMode, Env, LifecycleFlags, ParkEnv, PcgRng, RatingEngine, RideId, World,
    complete_test_run, update_rides,
};

use crate::report::{OutputFormat, Report};
use crate::session::{Session, SessionArgs, apply_requested_statuses};

/// Advance a scenario tick by tick
#[derive(Parser)]
pub struct Run {
    #[command(flatten)]
    session: SessionArgs,

    /// Ticks to simulate
    #[arg(short, long, default_value_t = 4096)]
    ticks: u64,

    /// Only check the requested statuses; change nothing
    #[arg(long)]
    dry_run: bool,

    /// Ticks a test run lasts before its results are recorded
    #[arg(long, value_name = "TICKS", default_value_t = 512)]
    test_run_ticks: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let mut session = Session::load(&self.session)?;
        let env = Env::with_all(&session.catalog, &PcgRng, &session.config).into_park_env();

        let mode = if self.dry_run {
            CommandMode::Query
        } else {
            CommandMode::Apply
        };
        let statuses = apply_requested_statuses(&mut session.scenario, &env, mode);

        let names: Vec<(String, RideId)> = session
            .scenario
            .rides
            .iter()
            .map(|ride| (ride.name.clone(), ride.id))
            .collect();
        let world = &mut session.scenario.world;

        let mut engine = RatingEngine::new();
        let mut test_runs = BTreeMap::new();
        let mut rated = 0;
        for _ in 0..self.ticks {
            world.clock.advance();
            finish_test_runs(world, &env, &mut test_runs, self.test_run_ticks)?;
            rated += engine.update_all(world, &env).completed.len();
            update_rides(world, &env);
        }
        info!("simulated {} ticks, {} rating passes completed", self.ticks, rated);

        let events = world.events.drain();
        Report::new(&session.scenario.name, world, &names, &statuses, events).print(self.format)
    }
}

/// Records the results of test runs that have lasted `duration` ticks.
fn finish_test_runs(
    world: &mut World,
    env: &ParkEnv<'_>,
    started: &mut BTreeMap<RideId, u64>,
    duration: u64,
) -> Result<()> {
    let now = world.tick().0;
    for id in world.rides.ids() {
        let testing = world
            .rides
            .get(id)
            .is_some_and(|ride| ride.lifecycle_flags.contains(LifecycleFlags::TEST_IN_PROGRESS));
        if !testing {
            started.remove(&id);
            continue;
        }
        let start = *started.entry(id).or_insert(now);
        if now - start < duration {
            continue;
        }
        if let Some(report) = complete_test_run(world, env, id)? {
            debug!("ride {} finished its test run over {} pieces", id, report.pieces);
        }
        started.remove(&id);
    }
    Ok(())
}
