//! Loading the content a command works on.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use park_content::{ContentFactory, Scenario};
use park_core::{
    CommandMode, ParkEnv, RideCatalog, RideId, RideStatus, SimConfig, StatusError, StatusPlan,
    set_ride_status,
};

/// Where to find the scenario.
#[derive(Args)]
pub struct SessionArgs {
    /// Scenario name, read from `<DATA_DIR>/scenarios/<NAME>.ron`
    #[arg(value_name = "NAME")]
    pub scenario: String,

    /// Content directory
    #[arg(short, long, value_name = "DIR", env = "PARK_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Override the scenario seed
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

/// Loaded content for one command.
pub struct Session {
    pub catalog: RideCatalog,
    pub config: SimConfig,
    pub scenario: Scenario,
}

impl Session {
    pub fn load(args: &SessionArgs) -> Result<Self> {
        let factory = ContentFactory::new(&args.data_dir);
        let config = factory.load_config()?;
        let catalog = factory.load_catalog()?;
        let mut scenario = factory
            .load_scenario(&args.scenario, &catalog)
            .with_context(|| format!("Failed to load scenario '{}'", args.scenario))?;
        if let Some(seed) = args.seed {
            scenario.world.seed = seed;
        }
        info!(
            "loaded scenario '{}' with {} rides from {}",
            scenario.name,
            scenario.rides.len(),
            factory.data_dir().display()
        );
        Ok(Self {
            catalog,
            config,
            scenario,
        })
    }

    /// Finds a scenario ride by name, or by id as `#N`.
    pub fn ride_id(&self, name: &str) -> Result<RideId> {
        if let Some(id) = self.scenario.ride(name) {
            return Ok(id);
        }
        name.strip_prefix('#')
            .and_then(|raw| raw.parse::<u16>().ok())
            .map(RideId)
            .filter(|id| self.scenario.world.rides.get(*id).is_some())
            .with_context(|| format!("No ride named '{}' in scenario", name))
    }
}

/// Outcome of one status request.
pub struct StatusOutcome {
    pub ride: String,
    pub target: RideStatus,
    pub result: Result<StatusPlan, StatusError>,
}

/// Requests the status every scenario ride asks for.
pub fn apply_requested_statuses(
    scenario: &mut Scenario,
    env: &ParkEnv<'_>,
    mode: CommandMode,
) -> Vec<StatusOutcome> {
    let requests: Vec<_> = scenario
        .rides
        .iter()
        .filter_map(|ride| Some((ride.name.clone(), ride.id, ride.requested_status?)))
        .collect();

    requests
        .into_iter()
        .map(|(name, id, target)| {
            let result = set_ride_status(&mut scenario.world, env, id, target, mode);
            if let Err(error) = &result {
                warn!("ride '{}' cannot become {}: {}", name, target, error);
            }
            StatusOutcome {
                ride: name,
                target,
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use park_core::{Env, PcgRng};

    const SCENARIO: &str = r#"(
        name: "pair",
        map: (width: 32, height: 32),
        rides: [
            (
                name: "Looper",
                ride_type: looping_coaster,
                start: (3, 12, 2),
                pieces: [
                    begin_station, end_station, right_quarter_turn3, right_quarter_turn3,
                    flat, flat, right_quarter_turn3, right_quarter_turn3,
                ],
                exit: false,
                status: Some(testing),
            ),
        ],
    )"#;

    fn load(seed: Option<u64>) -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir(dir.path().join("scenarios")).expect("mkdir");
        std::fs::write(dir.path().join("scenarios").join("pair.ron"), SCENARIO).expect("write");
        let args = SessionArgs {
            scenario: "pair".into(),
            data_dir: dir.path().to_path_buf(),
            seed,
        };
        let session = Session::load(&args).expect("loads");
        (dir, session)
    }

    #[test]
    fn rides_are_found_by_name_or_id() {
        let (_dir, session) = load(Some(99));
        assert_eq!(session.scenario.world.seed, 99);
        let id = session.ride_id("Looper").expect("by name");
        assert_eq!(session.ride_id(&format!("#{}", id.0)).expect("by id"), id);
        assert!(session.ride_id("Nope").is_err());
        assert!(session.ride_id("#42").is_err());
    }

    #[test]
    fn requested_statuses_report_rejections() {
        let (_dir, mut session) = load(None);
        let env = Env::with_all(&session.catalog, &PcgRng, &session.config).into_park_env();
        let outcomes = apply_requested_statuses(&mut session.scenario, &env, CommandMode::Apply);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].target, RideStatus::Testing);
        assert!(outcomes[0].result.is_err());
        let id = session.ride_id("Looper").expect("by name");
        assert_eq!(
            session.scenario.world.rides.get(id).expect("ride").status,
            RideStatus::Closed
        );
    }
}
