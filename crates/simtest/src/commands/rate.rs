//! Force a full rating pass on every ride.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use park_core::{
    CommandMode, Env, PcgRng, RideId, RideStatus, complete_test_run, force_update_ride,
};

use crate::report::{OutputFormat, Report};
use crate::session::{Session, SessionArgs, apply_requested_statuses};

/// Force a full rating pass on every ride
#[derive(Parser)]
pub struct Rate {
    #[command(flatten)]
    session: SessionArgs,

    /// Rate only rides that already passed a test run
    #[arg(long)]
    skip_tests: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl Rate {
    pub fn execute(self) -> Result<()> {
        let mut session = Session::load(&self.session)?;
        let env = Env::with_all(&session.catalog, &PcgRng, &session.config).into_park_env();
        let statuses = apply_requested_statuses(&mut session.scenario, &env, CommandMode::Apply);

        let names: Vec<(String, RideId)> = session
            .scenario
            .rides
            .iter()
            .map(|ride| (ride.name.clone(), ride.id))
            .collect();
        let world = &mut session.scenario.world;

        for (name, id) in &names {
            let closed = world
                .rides
                .get(*id)
                .is_none_or(|ride| ride.status == RideStatus::Closed);
            if closed {
                info!("ride '{}' is closed, not rated", name);
                continue;
            }
            if !self.skip_tests && complete_test_run(world, &env, *id)?.is_none() {
                info!("ride '{}' has no track to test", name);
            }
            let report = force_update_ride(world, &env, *id);
            info!(
                "ride '{}' rated in {} steps, {} proximity checks",
                name, report.sub_steps, report.proximity_scores
            );
        }

        let events = world.events.drain();
        Report::new(&session.scenario.name, world, &names, &statuses, events).print(self.format)
    }
}
