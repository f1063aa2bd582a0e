//! Ride status transitions.
//!
//! [`set_ride_status`] is the single entry point. Every request runs in three
//! phases: pre-validate checks the ride and plans every side effect without
//! touching the world, apply carries the plan out, and post-validate confirms
//! the ride ended up where the plan said. A rejected request returns from
//! pre-validate, so the ride is left exactly as it was.

use tracing::{debug, warn};

use crate::catalog::{RideEntry, RideTypeFlags};
use crate::config::SimConfig;
use crate::env::{CatalogOracle, OracleError, ParkEnv};
use crate::ride::{InvalidateFlags, LifecycleFlags, Ride, RideStatus, RideType};
use crate::track::TrackPiece;
use crate::world::{ParkEvent, RideId, TileCoordsXYZ, TileCoordsXYZD, World};

use super::blocks::{boat_hire_return_point, count_block_brakes, set_block_points};
use super::cable_lift::{check_cable_lift, create_cable_lift, needs_cable_lift};
use super::validate::validate_track;
use super::vehicles::{VehicleSizing, compute_vehicle_sizing, create_trains, remove_trains};
use super::{StatusError, TransitionPhase, ValidationError, ValidationFailure};

/// Whether a status request only reports what would happen or carries it out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CommandMode {
    #[default]
    Query,
    Apply,
}

/// What a validated request will do to the ride.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusPlan {
    pub ride: RideId,
    pub from: RideStatus,
    pub to: RideStatus,
    /// Guests on the ride are sent to the exit.
    pub evict_guests: bool,
    /// Trains (and the cable lift) leave the track before anything else.
    pub remove_trains: bool,
    /// New train limits, when the ride runs trains.
    pub sizing: Option<VehicleSizing>,
    pub create_trains: bool,
    pub num_block_brakes: u16,
    /// Where the cable lift train is placed, when one is built.
    pub cable_lift: Option<TileCoordsXYZ>,
    /// Piece the block points are marked from.
    pub block_origin: Option<TrackPiece>,
    /// Return point recorded on a boat hire.
    pub boat_hire_return: Option<TileCoordsXYZD>,
}

impl StatusPlan {
    fn unchanged(ride: &Ride) -> Self {
        Self {
            ride: ride.id,
            from: ride.status,
            to: ride.status,
            evict_guests: false,
            remove_trains: false,
            sizing: None,
            create_trains: false,
            num_block_brakes: ride.num_block_brakes,
            cable_lift: None,
            block_origin: None,
            boat_hire_return: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.from == self.to
            && !self.remove_trains
            && !self.create_trains
            && self.sizing.is_none()
            && self.to != RideStatus::Closed
    }

    /// Trains the ride should have on the track after apply.
    fn expected_trains(&self) -> Option<usize> {
        match self.sizing {
            Some(sizing) if self.create_trains => Some(sizing.num_trains as usize),
            _ if self.remove_trains => Some(0),
            _ => None,
        }
    }
}

fn is_guest_facing(status: RideStatus) -> bool {
    matches!(status, RideStatus::Open | RideStatus::Testing)
}

/// Vehicle entry a ride runs: its own subtype, or the type's default.
pub(super) fn resolve_entry<'a>(
    env: &ParkEnv<'a>,
    ride: &Ride,
) -> Result<Option<&'a RideEntry>, OracleError> {
    if let Some(subtype) = ride.subtype {
        return Ok(Some(env.entry(subtype)?));
    }
    Ok(CatalogOracle::default_entry(env.catalog()?, ride.ride_type))
}

/// Cars the ride's current trains and cable lift occupy.
fn cars_held(world: &World, ride: &Ride) -> usize {
    ride.trains
        .iter()
        .chain(ride.cable_lift.iter())
        .filter_map(|train| world.trains.get(*train))
        .map(|train| train.num_cars as usize)
        .sum()
}

/// Checks `target` against the ride and plans the transition.
fn pre_validate(
    world: &World,
    env: &ParkEnv<'_>,
    id: RideId,
    target: RideStatus,
) -> Result<StatusPlan, StatusError> {
    let ride = world.rides.get(id).ok_or(StatusError::RideNotFound(id))?;
    let from = ride.status;

    if target == from && target != RideStatus::Closed {
        return Ok(StatusPlan::unchanged(ride));
    }

    let leaving_guests = is_guest_facing(from) && !is_guest_facing(target);
    let leaving_simulation = from == RideStatus::Simulating && target != RideStatus::Simulating;
    let mut plan = StatusPlan {
        to: target,
        evict_guests: leaving_guests,
        remove_trains: leaving_guests || leaving_simulation,
        ..StatusPlan::unchanged(ride)
    };

    if target == RideStatus::Closed {
        if from == RideStatus::Closed && !ride.lifecycle_flags.contains(LifecycleFlags::BROKEN_DOWN) {
            plan.remove_trains = true;
        }
        return Ok(plan);
    }

    let default_config = SimConfig::default();
    let config = env.config().unwrap_or(&default_config);
    let descriptor = env.descriptor(ride.ride_type)?;
    let entry = resolve_entry(env, ride)?;
    let reject = |failure: ValidationFailure| StatusError::rejected(id, failure);

    let origin = validate_track(&world.map, ride, descriptor, entry, target, config).map_err(reject)?;

    plan.num_block_brakes = origin
        .map(|origin| count_block_brakes(&world.map, origin, config.scan_step_limit))
        .unwrap_or(0);
    if ride.is_block_sectioned() && !ride.lifecycle_flags.contains(LifecycleFlags::ON_TRACK) {
        plan.block_origin = origin;
    }
    if ride.ride_type == RideType::BoatHire {
        plan.boat_hire_return =
            origin.map(|origin| boat_hire_return_point(&world.map, origin, config.scan_step_limit));
    }

    let runs_trains = !descriptor.has_flag(RideTypeFlags::NO_VEHICLES);
    let on_track = ride.lifecycle_flags.contains(LifecycleFlags::ON_TRACK) && !plan.remove_trains;
    let mut free_slots = world.trains.free_car_slots();
    if plan.remove_trains {
        free_slots += cars_held(world, ride);
    }

    if let (true, Some(entry)) = (runs_trains, entry) {
        let mut sized = ride.clone();
        sized.num_block_brakes = plan.num_block_brakes;
        let sizing = compute_vehicle_sizing(&sized, entry, descriptor, &world.map, origin, config);
        if let Some(sizing) = sizing {
            let blocks = ride.num_stations() as i64 + plan.num_block_brakes as i64 - 1;
            if sizing.num_trains == 0
                || (ride.is_block_sectioned() && sizing.num_trains as i64 > blocks)
            {
                return Err(reject(ValidationError::NotEnoughSpaceForTrains.into()));
            }
            if !on_track {
                if sizing.cars_needed() > free_slots {
                    return Err(reject(ValidationError::UnableToCreateEnoughVehicles.into()));
                }
                free_slots -= sizing.cars_needed();
                plan.create_trains = true;
            }
            plan.sizing = Some(sizing);
        }
    }

    let lift_rebuilt = plan.remove_trains
        && ride.lifecycle_flags.contains(LifecycleFlags::CABLE_LIFT)
        && descriptor.has_flag(RideTypeFlags::ALLOW_CABLE_LIFT_HILL);
    let lift_pending = needs_cable_lift(ride, descriptor) || lift_rebuilt;
    if let (true, Some(origin)) = (lift_pending, origin) {
        let location =
            check_cable_lift(&world.map, ride, origin, free_slots, config.scan_step_limit)
                .map_err(reject)?;
        plan.cable_lift = Some(location);
    }

    Ok(plan)
}

/// Carries out a validated plan. Cannot fail; shortfalls surface in
/// post-validate.
fn apply(world: &mut World, env: &ParkEnv<'_>, plan: &StatusPlan) {
    let id = plan.ride;
    if plan.evict_guests {
        if let Some(ride) = world.rides.get_mut(id) {
            ride.cur_num_customers = 0;
            ride.invalidate(InvalidateFlags::CUSTOMER);
        }
        world.emit(ParkEvent::GuestsEvicted { ride: id });
    }
    if plan.remove_trains {
        remove_trains(world, id);
    }

    let Some(ride) = world.rides.get_mut(id) else {
        return;
    };
    let was_on_track = ride.lifecycle_flags.contains(LifecycleFlags::ON_TRACK);

    if plan.to == RideStatus::Closed {
        if plan.from == RideStatus::Closed && !ride.lifecycle_flags.contains(LifecycleFlags::BROKEN_DOWN) {
            ride.lifecycle_flags.remove(LifecycleFlags::CRASHED);
        }
        ride.lifecycle_flags.remove(LifecycleFlags::PASS_STATION_NO_STOPPING);
    } else {
        if plan.to == RideStatus::Open {
            ride.lifecycle_flags |= LifecycleFlags::EVER_BEEN_OPENED;
        }
        if plan.to == RideStatus::Testing && !ride.lifecycle_flags.contains(LifecycleFlags::TESTED) {
            ride.lifecycle_flags |= LifecycleFlags::TEST_IN_PROGRESS;
        }
        ride.num_block_brakes = plan.num_block_brakes;
        if plan.boat_hire_return.is_some() {
            ride.boat_hire_return = plan.boat_hire_return;
        }
        if let Some(sizing) = plan.sizing {
            sizing.apply_to(ride);
        }
    }
    ride.status = plan.to;
    ride.invalidate(InvalidateFlags::MAIN | InvalidateFlags::LIST);

    if plan.create_trains {
        create_trains(world, id);
    }
    if let Some(location) = plan.cable_lift {
        if create_cable_lift(world, id, location).is_none() {
            warn!("ride {} could not place its cable lift", id);
        }
    }
    if let (false, Some(origin)) = (was_on_track, plan.block_origin) {
        let limit = env
            .config()
            .map(|config| config.scan_step_limit)
            .unwrap_or(SimConfig::DEFAULT_SCAN_STEP_LIMIT);
        let marked = set_block_points(&mut world.map, origin, limit);
        debug!("ride {} marked {} block points", id, marked);
    }

    if plan.from != plan.to {
        debug!("ride {} status {} -> {}", id, plan.from, plan.to);
        world.emit(ParkEvent::StatusChanged {
            ride: id,
            from: plan.from,
            to: plan.to,
        });
    }
}

/// Confirms the ride matches the plan after apply.
fn post_validate(world: &World, plan: &StatusPlan) -> Result<(), StatusError> {
    let inconsistent = |detail| StatusError::Inconsistent {
        ride: plan.ride,
        phase: TransitionPhase::PostValidate,
        detail,
    };
    let ride = world
        .rides
        .get(plan.ride)
        .ok_or(StatusError::RideNotFound(plan.ride))?;
    if ride.status != plan.to {
        return Err(inconsistent("status not updated"));
    }
    if let Some(expected) = plan.expected_trains() {
        if ride.trains.len() != expected {
            return Err(inconsistent("train count differs from plan"));
        }
    }
    if plan.cable_lift.is_some() && ride.cable_lift.is_none() {
        return Err(inconsistent("cable lift missing"));
    }
    Ok(())
}

/// Reports whether `target` could be set, without changing anything.
pub fn query_status(
    world: &World,
    env: &ParkEnv<'_>,
    ride: RideId,
    target: RideStatus,
) -> Result<StatusPlan, StatusError> {
    pre_validate(world, env, ride, target)
}

/// Moves `ride` to `target`.
///
/// In [`CommandMode::Query`] only the checks run. A failure leaves every
/// field of the ride unchanged and reports the first check that failed.
pub fn set_ride_status(
    world: &mut World,
    env: &ParkEnv<'_>,
    ride: RideId,
    target: RideStatus,
    mode: CommandMode,
) -> Result<StatusPlan, StatusError> {
    let plan = pre_validate(world, env, ride, target)?;
    if mode == CommandMode::Query || plan.is_noop() {
        return Ok(plan);
    }
    apply(world, env, &plan);
    post_validate(world, &plan)?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RideCatalog;
    use crate::env::{Env, PcgRng};
    use crate::ride::{RideMode, RideType};
    use crate::track::{LayoutBuilder, TrackElemType};
    use crate::world::{Direction, TileCoordsXY, TileCoordsXYZD, TileMap};

    use TrackElemType::*;

    fn oval_world(pieces: &[TrackElemType]) -> (World, RideId) {
        let mut world = World::new(TileMap::flat(32, 32, 2), 11);
        let id = world.rides.create(RideType::LoopingCoaster).expect("slot");
        let layout = LayoutBuilder::new(id, TileCoordsXYZ::new(3, 12, 2), Direction::East)
            .pieces(pieces.iter().copied())
            .place(&mut world.map)
            .expect("layout fits");
        let ride = world.rides.get_mut(id).expect("created");
        ride.mode = RideMode::ContinuousCircuit;
        for station in &layout.stations {
            ride.register_station(station);
            let tile = station.start;
            let slot = &mut ride.stations[station.index.index()];
            slot.entrance = Some(TileCoordsXYZD::new(tile.x, tile.y + 1, tile.z, Direction::North));
            slot.exit = Some(TileCoordsXYZD::new(tile.x, tile.y - 1, tile.z, Direction::South));
        }
        (world, id)
    }

    const OVAL: [TrackElemType; 8] = [
        BeginStation,
        EndStation,
        RightQuarterTurn3,
        RightQuarterTurn3,
        Flat,
        Flat,
        RightQuarterTurn3,
        RightQuarterTurn3,
    ];

    fn with_env<T>(catalog: &RideCatalog, f: impl FnOnce(&ParkEnv<'_>) -> T) -> T {
        let config = SimConfig::default();
        let env = Env::with_all(catalog, &PcgRng, &config).into_park_env();
        f(&env)
    }

    #[test]
    fn opening_creates_trains_and_reports_the_change() {
        let (mut world, id) = oval_world(&OVAL);
        let catalog = RideCatalog::builtin();
        let plan = with_env(&catalog, |env| {
            set_ride_status(&mut world, env, id, RideStatus::Open, CommandMode::Apply)
        })
        .expect("opens");
        assert!(plan.create_trains);

        let ride = world.rides.get(id).expect("exists");
        assert_eq!(ride.status, RideStatus::Open);
        assert!(ride.lifecycle_flags.contains(LifecycleFlags::ON_TRACK));
        assert!(ride.lifecycle_flags.contains(LifecycleFlags::EVER_BEEN_OPENED));
        assert_eq!(ride.trains.len(), ride.num_trains as usize);
        assert!(world.events.iter().any(|record| matches!(
            record.event,
            ParkEvent::StatusChanged { to: RideStatus::Open, .. }
        )));
    }

    #[test]
    fn query_changes_nothing() {
        let (mut world, id) = oval_world(&OVAL);
        let before = world.rides.get(id).cloned().expect("exists");
        let catalog = RideCatalog::builtin();
        with_env(&catalog, |env| {
            set_ride_status(&mut world, env, id, RideStatus::Open, CommandMode::Query)
        })
        .expect("would open");
        assert_eq!(world.rides.get(id), Some(&before));
        assert!(world.trains.is_empty());
        assert!(world.events.is_empty());
    }

    #[test]
    fn boat_hire_records_its_return_point_when_opened() {
        let (mut world, id) = oval_world(&OVAL);
        let ride = world.rides.get_mut(id).expect("exists");
        ride.ride_type = RideType::BoatHire;
        ride.mode = RideMode::BoatHire;
        let origin = crate::lifecycle::find_origin(&world.map, ride).expect("origin");
        let expected =
            boat_hire_return_point(&world.map, origin, SimConfig::DEFAULT_SCAN_STEP_LIMIT);

        let catalog = RideCatalog::builtin();
        let queried = with_env(&catalog, |env| {
            set_ride_status(&mut world, env, id, RideStatus::Open, CommandMode::Query)
        })
        .expect("would open");
        assert_eq!(queried.boat_hire_return, Some(expected));
        assert_eq!(world.rides.get(id).expect("exists").boat_hire_return, None);

        with_env(&catalog, |env| {
            set_ride_status(&mut world, env, id, RideStatus::Open, CommandMode::Apply)
        })
        .expect("opens");
        assert_eq!(world.rides.get(id).expect("exists").boat_hire_return, Some(expected));
    }

    #[test]
    fn coasters_have_no_return_point() {
        let (mut world, id) = oval_world(&OVAL);
        let catalog = RideCatalog::builtin();
        let plan = with_env(&catalog, |env| {
            set_ride_status(&mut world, env, id, RideStatus::Open, CommandMode::Apply)
        })
        .expect("opens");
        assert_eq!(plan.boat_hire_return, None);
        assert_eq!(world.rides.get(id).expect("exists").boat_hire_return, None);
    }

    #[test]
    fn missing_exit_is_reported_at_the_station() {
        let (mut world, id) = oval_world(&OVAL);
        let ride = world.rides.get_mut(id).expect("exists");
        ride.stations[0].exit = None;
        let start = ride.stations[0].start_location().expect("station");
        let before = ride.clone();

        let catalog = RideCatalog::builtin();
        let error = with_env(&catalog, |env| {
            set_ride_status(&mut world, env, id, RideStatus::Open, CommandMode::Apply)
        })
        .expect_err("no exit");
        assert_eq!(error.reason(), Some(ValidationError::ExitNotYetBuilt));
        assert_eq!(error.tile(), Some(start));
        assert_eq!(world.rides.get(id), Some(&before));
    }

    #[test]
    fn closing_evicts_and_removes_trains() {
        let (mut world, id) = oval_world(&OVAL);
        let catalog = RideCatalog::builtin();
        with_env(&catalog, |env| {
            set_ride_status(&mut world, env, id, RideStatus::Open, CommandMode::Apply)?;
            world.rides.get_mut(id).expect("exists").cur_num_customers = 12;
            set_ride_status(&mut world, env, id, RideStatus::Closed, CommandMode::Apply)
        })
        .expect("closes");

        let ride = world.rides.get(id).expect("exists");
        assert_eq!(ride.status, RideStatus::Closed);
        assert_eq!(ride.cur_num_customers, 0);
        assert!(ride.trains.is_empty());
        assert!(world.trains.is_empty());
        assert!(world
            .events
            .iter()
            .any(|record| record.event == ParkEvent::GuestsEvicted { ride: id }));
    }

    #[test]
    fn testing_to_open_keeps_trains() {
        let (mut world, id) = oval_world(&OVAL);
        let catalog = RideCatalog::builtin();
        let plan = with_env(&catalog, |env| {
            set_ride_status(&mut world, env, id, RideStatus::Testing, CommandMode::Apply)?;
            set_ride_status(&mut world, env, id, RideStatus::Open, CommandMode::Apply)
        })
        .expect("opens");
        assert!(!plan.remove_trains);
        assert!(!plan.create_trains);
        let ride = world.rides.get(id).expect("exists");
        assert_eq!(world.trains.len(), ride.trains.len());
    }

    #[test]
    fn same_status_is_accepted_without_change() {
        let (mut world, id) = oval_world(&OVAL);
        let catalog = RideCatalog::builtin();
        let plan = with_env(&catalog, |env| {
            set_ride_status(&mut world, env, id, RideStatus::Testing, CommandMode::Apply)?;
            world.events.drain();
            set_ride_status(&mut world, env, id, RideStatus::Testing, CommandMode::Apply)
        })
        .expect("already testing");
        assert!(plan.is_noop());
        assert!(world.events.is_empty());
    }

    #[test]
    fn exhausted_vehicle_pool_rejects_before_mutating() {
        let (mut world, id) = oval_world(&OVAL);
        world.trains = crate::world::TrainRegistry::with_capacity(1);
        let catalog = RideCatalog::builtin();
        let error = with_env(&catalog, |env| {
            set_ride_status(&mut world, env, id, RideStatus::Open, CommandMode::Apply)
        })
        .expect_err("no slots");
        assert_eq!(error.reason(), Some(ValidationError::UnableToCreateEnoughVehicles));
        assert_eq!(world.rides.get(id).expect("exists").status, RideStatus::Closed);
    }

    #[test]
    fn unknown_ride_is_an_error() {
        let mut world = World::new(TileMap::flat(4, 4, 2), 0);
        let catalog = RideCatalog::builtin();
        let error = with_env(&catalog, |env| {
            set_ride_status(&mut world, env, RideId(9), RideStatus::Open, CommandMode::Apply)
        })
        .expect_err("missing");
        assert_eq!(error, StatusError::RideNotFound(RideId(9)));
    }

    #[test]
    fn block_sectioned_opening_marks_block_points() {
        let (mut world, id) = oval_world(&[
            BeginStation,
            EndStation,
            RightQuarterTurn3,
            RightQuarterTurn3,
            Flat,
            BlockBrakes,
            RightQuarterTurn3,
            RightQuarterTurn3,
        ]);
        world.rides.get_mut(id).expect("exists").mode = RideMode::ContinuousCircuitBlockSectioned;
        world.rides.get_mut(id).expect("exists").proposed_num_trains = 2;
        let catalog = RideCatalog::builtin();
        with_env(&catalog, |env| {
            set_ride_status(&mut world, env, id, RideStatus::Open, CommandMode::Apply)
        })
        .expect("opens");

        let ride = world.rides.get(id).expect("exists");
        assert_eq!(ride.num_block_brakes, 1);
        assert_eq!(ride.num_trains, 1);

        let mut marked: Vec<TrackElemType> = (0..32)
            .flat_map(|x| (0..32).map(move |y| TileCoordsXY::new(x, y)))
            .flat_map(|tile| world.map.elements_at(tile).iter())
            .filter_map(|element| element.as_track())
            .filter(|track| track.block_start && track.sequence == 0)
            .map(|track| track.track_type)
            .collect();
        marked.sort();
        assert_eq!(marked, vec![EndStation, BlockBrakes]);
    }
}
