//! Per-tick ride driver: inspections, breakdowns and test runs.

use tracing::{debug, warn};

use crate::config::SimConfig;
use crate::env::{OracleError, ParkEnv, RngOracle, RollContext, compute_seed};
use crate::ride::{InvalidateFlags, LifecycleFlags, RatingTuple, RideStats};
use crate::track::{SurveyReport, survey_circuit};
use crate::world::{ParkEvent, RideId, Tick, World};

use super::breakdown::{
    BREAKDOWN_PERIOD, BreakdownRolls, INSPECTION_PERIOD, breakdown_status_update, fix_breakdown,
    mark_broken_down, update_breakdown, update_inspection,
};
use super::status::resolve_entry;
use super::validate::find_origin;

/// Ticks between two breakdown status updates of the same ride.
pub const STATUS_UPDATE_PERIOD: u64 = 512;

/// Whether `id` gets its breakdown status update on `tick`.
///
/// Rides are spread over the period by the low byte of their id.
pub fn is_status_update_tick(tick: Tick, id: RideId) -> bool {
    (tick.0 >> 1) & 0xFF == (id.0 & 0xFF) as u64
}

fn roll(
    env: &ParkEnv<'_>,
    seed: u64,
    tick: Tick,
    id: RideId,
    context: RollContext,
) -> Result<u32, OracleError> {
    Ok(env.rng()?.next_u32(compute_seed(seed, tick.0, id.0, context)))
}

/// Advances one ride by one tick.
pub fn update_ride(world: &mut World, env: &ParkEnv<'_>, id: RideId) -> Result<(), OracleError> {
    let tick = world.tick();
    let month = world.clock.months;
    let raining = world.weather.raining;
    let seed = world.seed;
    let default = SimConfig::default();
    let config = env.config().unwrap_or(&default);

    let Some(ride) = world.rides.get(id) else {
        return Ok(());
    };
    let descriptor = env.descriptor(ride.ride_type)?;
    let entry = resolve_entry(env, ride)?;

    let rolls = if tick.is_every(BREAKDOWN_PERIOD) {
        Some(BreakdownRolls {
            chance: roll(env, seed, tick, id, RollContext::BreakdownChance)?,
            kind: roll(env, seed, tick, id, RollContext::BreakdownKind)?,
            train: roll(env, seed, tick, id, RollContext::BrokenTrain)?,
            car: roll(env, seed, tick, id, RollContext::BrokenCar)?,
        })
    } else {
        None
    };

    let Some(ride) = world.rides.get_mut(id) else {
        return Ok(());
    };
    let mut events = Vec::new();
    if tick.is_every(INSPECTION_PERIOD) && update_inspection(ride, descriptor) {
        events.push(ParkEvent::InspectionDue { ride: id });
    }
    if let Some(rolls) = rolls {
        let pending = update_breakdown(ride, descriptor, entry, config, tick, month, raining, rolls);
        if let Some(kind) = pending {
            debug!("ride {} breakdown pending: {:?}", id, kind);
            events.push(ParkEvent::BreakdownPending { ride: id, kind });
        }
    }
    if is_status_update_tick(tick, id) {
        if let Some(kind) = breakdown_status_update(ride, descriptor) {
            debug!("ride {} broke down: {:?}", id, kind);
            events.push(ParkEvent::BrokenDown { ride: id, kind });
        }
    }

    for event in events {
        world.emit(event);
    }
    Ok(())
}

/// Runs [`update_ride`] for every ride. Returns the number updated.
///
/// A ride whose type is missing from the catalog is skipped with a warning.
pub fn update_rides(world: &mut World, env: &ParkEnv<'_>) -> usize {
    let mut updated = 0;
    for id in world.rides.ids() {
        match update_ride(world, env, id) {
            Ok(()) => updated += 1,
            Err(error) => warn!("ride {} skipped: {}", id, error),
        }
    }
    updated
}

/// Stops `id` for its pending breakdown.
pub fn break_down(world: &mut World, id: RideId) -> bool {
    let kind = world.rides.get_mut(id).and_then(mark_broken_down);
    match kind {
        Some(kind) => {
            world.emit(ParkEvent::BrokenDown { ride: id, kind });
            true
        }
        None => false,
    }
}

/// A mechanic has finished with `id`.
pub fn fix_ride(world: &mut World, id: RideId, reliability_increase: u16) -> bool {
    let fixed = world
        .rides
        .get_mut(id)
        .is_some_and(|ride| fix_breakdown(ride, reliability_increase));
    if fixed {
        world.emit(ParkEvent::BreakdownFixed { ride: id });
    }
    fixed
}

/// Records the measurements of a finished test run.
///
/// The circuit is surveyed from the first station; the ride is then marked
/// tested so the rating engine can rate it. Returns `None` when the ride has
/// no track to survey.
pub fn complete_test_run(
    world: &mut World,
    env: &ParkEnv<'_>,
    id: RideId,
) -> Result<Option<SurveyReport>, OracleError> {
    let Some(ride) = world.rides.get(id) else {
        return Ok(None);
    };
    let descriptor = env.descriptor(ride.ride_type)?;
    let Some(origin) = find_origin(&world.map, ride) else {
        return Ok(None);
    };
    let limit = env
        .config()
        .map(|config| config.scan_step_limit)
        .unwrap_or(SimConfig::DEFAULT_SCAN_STEP_LIMIT);
    let lift_speed = ride.lift_hill_speed.max(descriptor.lift.min);
    let report = survey_circuit(&world.map, origin, lift_speed, limit);

    let Some(ride) = world.rides.get_mut(id) else {
        return Ok(None);
    };
    ride.stats = report.stats;
    for segment in &report.segments {
        if let Some(station) = ride.station_mut(segment.station) {
            station.segment_length = segment.length;
            station.segment_time = segment.time;
        }
    }
    ride.lifecycle_flags.remove(LifecycleFlags::TEST_IN_PROGRESS);
    ride.lifecycle_flags |= LifecycleFlags::TESTED;
    ride.invalidate(InvalidateFlags::MAIN);
    debug!("ride {} tested over {} pieces", id, report.pieces);
    Ok(Some(report))
}

/// Forgets the last test run: ratings return to the unrated sentinel and
/// the measurements are cleared.
pub fn invalidate_test_results(world: &mut World, id: RideId) -> bool {
    let Some(ride) = world.rides.get_mut(id) else {
        return false;
    };
    ride.lifecycle_flags
        .remove(LifecycleFlags::TESTED | LifecycleFlags::TEST_IN_PROGRESS);
    ride.ratings = RatingTuple::NULL;
    ride.stats = RideStats::default();
    for station in ride.stations.iter_mut() {
        station.segment_length = 0;
        station.segment_time = 0;
    }
    ride.invalidate(InvalidateFlags::MAIN);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RideCatalog;
    use crate::env::{Env, PcgRng};
    use crate::ride::{BreakdownKind, InspectionInterval, RideMode, RideStatus, RideType};
    use crate::track::{LayoutBuilder, TrackElemType};
    use crate::world::{Direction, TileCoordsXYZ, TileCoordsXYZD, TileMap};

    use TrackElemType::*;

    fn oval_world() -> (World, RideId) {
        let mut world = World::new(TileMap::flat(32, 32, 2), 5);
        let id = world.rides.create(RideType::LoopingCoaster).expect("slot");
        let layout = LayoutBuilder::new(id, TileCoordsXYZ::new(3, 12, 2), Direction::East)
            .pieces([BeginStation, EndStation, RightQuarterTurn3, RightQuarterTurn3])
            .pieces([Flat, Flat, RightQuarterTurn3, RightQuarterTurn3])
            .place(&mut world.map)
            .expect("layout fits");
        let ride = world.rides.get_mut(id).expect("created");
        ride.mode = RideMode::ContinuousCircuit;
        ride.status = RideStatus::Open;
        for station in &layout.stations {
            ride.register_station(station);
            let tile = station.start;
            ride.stations[station.index.index()].exit =
                Some(TileCoordsXYZD::new(tile.x, tile.y - 1, tile.z, Direction::South));
        }
        (world, id)
    }

    fn with_env<T>(config: SimConfig, f: impl FnOnce(&ParkEnv<'_>) -> T) -> T {
        let catalog = RideCatalog::builtin();
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        f(&env)
    }

    fn run(world: &mut World, env: &ParkEnv<'_>, ticks: u64) {
        for _ in 0..ticks {
            world.clock.advance();
            update_rides(world, env);
        }
    }

    #[test]
    fn status_updates_are_spread_over_ride_ids() {
        assert!(is_status_update_tick(Tick(0), RideId(0)));
        assert!(is_status_update_tick(Tick(6), RideId(3)));
        assert!(is_status_update_tick(Tick(7), RideId(3)));
        assert!(!is_status_update_tick(Tick(8), RideId(3)));
        assert!(is_status_update_tick(Tick(518), RideId(259)));
    }

    #[test]
    fn inspections_fall_due_on_schedule() {
        let (mut world, id) = oval_world();
        world.rides.get_mut(id).expect("exists").reliability.inspection_interval =
            InspectionInterval::Every10Minutes;
        let mut config = SimConfig::default();
        config.disable_breakdowns = true;
        with_env(config, |env| run(&mut world, env, INSPECTION_PERIOD * 10));

        let ride = world.rides.get(id).expect("exists");
        assert!(ride.lifecycle_flags.contains(LifecycleFlags::DUE_INSPECTION));
        let due: Vec<_> = world
            .events
            .iter()
            .filter(|record| record.event == ParkEvent::InspectionDue { ride: id })
            .collect();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].tick, Tick(INSPECTION_PERIOD * 10));
    }

    #[test]
    fn worn_out_ride_breaks_down_and_is_fixed() {
        let (mut world, id) = oval_world();
        world.rides.get_mut(id).expect("exists").reliability.reliability = 0;
        // Old enough for every fault, brakes included.
        world.clock.months = 20;
        with_env(SimConfig::default(), |env| run(&mut world, env, BREAKDOWN_PERIOD));

        let ride = world.rides.get(id).expect("exists");
        assert!(ride.lifecycle_flags.contains(LifecycleFlags::BREAKDOWN_PENDING));
        let kind = ride.reliability.breakdown_reason_pending.expect("pending kind");
        assert!(world
            .events
            .iter()
            .any(|record| record.event == ParkEvent::BreakdownPending { ride: id, kind }));

        if !kind.stops_ride_immediately() {
            assert!(break_down(&mut world, id));
        }
        with_env(SimConfig::default(), |env| run(&mut world, env, STATUS_UPDATE_PERIOD));
        assert!(world
            .rides
            .get(id)
            .is_some_and(|ride| ride.lifecycle_flags.contains(LifecycleFlags::BROKEN_DOWN)));
        assert!(world
            .events
            .iter()
            .any(|record| record.event == ParkEvent::BrokenDown { ride: id, kind }));

        assert!(fix_ride(&mut world, id, 10));
        assert!(!world.rides.get(id).expect("exists").has_breakdown_in_progress());
        assert!(!fix_ride(&mut world, id, 10));
    }

    #[test]
    fn same_seed_gives_the_same_breakdowns() {
        let outcome = || {
            let (mut world, id) = oval_world();
            world.rides.get_mut(id).expect("exists").reliability.reliability = 0;
            with_env(SimConfig::default(), |env| run(&mut world, env, BREAKDOWN_PERIOD * 4));
            let ride = world.rides.get(id).cloned().expect("exists");
            (ride.reliability, world.events.drain())
        };
        assert_eq!(outcome(), outcome());
    }

    #[test]
    fn closed_rides_keep_their_reliability() {
        let (mut world, id) = oval_world();
        world.rides.get_mut(id).expect("exists").status = RideStatus::Closed;
        with_env(SimConfig::default(), |env| run(&mut world, env, BREAKDOWN_PERIOD * 8));
        let ride = world.rides.get(id).expect("exists");
        assert_eq!(ride.reliability.reliability, crate::ride::Reliability::INITIAL);
        assert!(!ride.has_breakdown_in_progress());
    }

    #[test]
    fn break_down_needs_a_pending_fault() {
        let (mut world, id) = oval_world();
        assert!(!break_down(&mut world, id));
        let ride = world.rides.get_mut(id).expect("exists");
        super::super::breakdown::prepare_breakdown(ride, BreakdownKind::VehicleMalfunction, 0, 0);
        assert!(break_down(&mut world, id));
    }

    #[test]
    fn test_run_records_stats_and_marks_the_ride_tested() {
        let (mut world, id) = oval_world();
        world.rides.get_mut(id).expect("exists").lifecycle_flags |= LifecycleFlags::TEST_IN_PROGRESS;
        let report = with_env(SimConfig::default(), |env| complete_test_run(&mut world, env, id))
            .expect("catalog present")
            .expect("track present");
        assert!(report.looped);

        let ride = world.rides.get(id).expect("exists");
        assert!(ride.lifecycle_flags.contains(LifecycleFlags::TESTED));
        assert!(!ride.lifecycle_flags.contains(LifecycleFlags::TEST_IN_PROGRESS));
        assert_eq!(ride.stats, report.stats);
        assert_eq!(ride.total_length(), report.total_length());
        assert!(ride.stats.max_speed > 0);
    }

    #[test]
    fn invalidating_results_restores_the_sentinel() {
        let (mut world, id) = oval_world();
        with_env(SimConfig::default(), |env| complete_test_run(&mut world, env, id))
            .expect("catalog present");
        world.rides.get_mut(id).expect("exists").ratings = RatingTuple::new(500, 400, 300);

        assert!(invalidate_test_results(&mut world, id));
        let ride = world.rides.get(id).expect("exists");
        assert!(ride.ratings.is_null());
        assert!(!ride.lifecycle_flags.contains(LifecycleFlags::TESTED));
        assert_eq!(ride.total_length(), 0);
        assert_eq!(ride.stats, RideStats::default());
        assert!(!invalidate_test_results(&mut world, RideId(999)));
    }
}
