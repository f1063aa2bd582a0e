//! Query or apply a status change on one ride.

use anyhow::{Result, bail};
use clap::Parser;

use park_core::{CommandMode, Env, ParkError, PcgRng, RideStatus, set_ride_status};

use crate::session::{Session, SessionArgs};

/// Query or apply a status change on one ride
#[derive(Parser)]
pub struct Status {
    #[command(flatten)]
    session: SessionArgs,

    /// Ride name from the scenario, or `#N` for a ride id
    #[arg(value_name = "RIDE")]
    ride: String,

    /// Target status (closed, open, testing, simulating)
    #[arg(value_name = "STATUS")]
    target: RideStatus,

    /// Apply the change instead of only checking it
    #[arg(long)]
    apply: bool,
}

impl Status {
    pub fn execute(self) -> Result<()> {
        let mut session = Session::load(&self.session)?;
        let env = Env::with_all(&session.catalog, &PcgRng, &session.config).into_park_env();
        let id = session.ride_id(&self.ride)?;

        let mode = if self.apply {
            CommandMode::Apply
        } else {
            CommandMode::Query
        };
        let world = &mut session.scenario.world;
        match set_ride_status(world, &env, id, self.target, mode) {
            Ok(plan) => {
                println!("{} {} -> {}: ok", self.ride, plan.from, plan.to);
                println!("  evict guests:  {}", plan.evict_guests);
                println!("  remove trains: {}", plan.remove_trains);
                println!("  create trains: {}", plan.create_trains);
                if let Some(sizing) = &plan.sizing {
                    println!("  sizing:        {:?}", sizing);
                }
                if plan.num_block_brakes > 0 {
                    println!("  block brakes:  {}", plan.num_block_brakes);
                }
                for record in world.events.drain() {
                    println!("  [{:>6}] {:?}", record.tick.0, record.event);
                }
                Ok(())
            }
            Err(error) => {
                let at = error
                    .tile()
                    .map(|tile| format!(" at {}", tile))
                    .unwrap_or_default();
                bail!(
                    "{} cannot become {}: {}{} [{}]",
                    self.ride,
                    self.target,
                    error,
                    at,
                    error.error_code()
                )
            }
        }
    }
}
