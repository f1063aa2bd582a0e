//! Budgeted state machine that keeps every ride's ratings current.
//!
//! The [`RatingEngine`] owns a fixed table of [`RatingUpdateState`] slots.
//! Each tick every slot advances through at most
//! [`SimConfig::sub_step_budget`] steps, so a long track is scanned over
//! several ticks and resumes where it stopped. A slot whose ride disappears
//! or closes mid-scan falls back to [`RatingState::FindNextRide`] on its next
//! step; nothing is reported to the caller.

use arrayvec::ArrayVec;

use crate::catalog::{RatingsCalcType, RideTypeFlags};
use crate::config::SimConfig;
use crate::env::ParkEnv;
use crate::ride::{InvalidateFlags, LifecycleFlags, Ride, RideStatus};
use crate::track::{TrackElemType, TrackGraph};
use crate::world::{ParkEvent, RideId, RideRegistry, World};

use super::formula::{
    RatingInputs, compute_ratings, has_adjacent_synchronised_station, scenery_score,
    sheltered_eighths, unreliability_factor,
};
use super::proximity::{proximity_score, score_close_proximity};
use super::state::{RatingState, RatingUpdateState, ScanFlags};
use super::upkeep::compute_upkeep;
use super::value::compute_value;

/// Work performed by one call into the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// State machine steps taken across all slots.
    pub sub_steps: usize,
    /// Pieces the proximity scorer actually scored.
    pub proximity_scores: usize,
    /// Rides whose pass reached `Calculate` and finished.
    pub completed: Vec<RideId>,
}

/// Owner of the concurrent rating passes.
///
/// Slots are never persisted: a fresh engine (or one after [`reset`]) starts
/// every slot idle and catches up over the following ticks.
///
/// [`reset`]: RatingEngine::reset
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RatingEngine {
    slots: [RatingUpdateState; SimConfig::MAX_RATING_UPDATE_STATES],
}

impl RatingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[RatingUpdateState] {
        &self.slots
    }

    /// Returns every slot to `FindNextRide`, dropping in-flight scans.
    pub fn reset(&mut self) {
        self.slots = Default::default();
    }

    /// True when some slot is mid-scan on `ride`.
    pub fn is_updating(&self, ride: RideId) -> bool {
        self.slots.iter().any(|slot| slot.is_scanning(ride))
    }

    /// Advances every slot, in table order, by up to its per-tick budget.
    ///
    /// A slot stops early for the tick once it is back in `FindNextRide`.
    pub fn update_all(&mut self, world: &mut World, env: &ParkEnv<'_>) -> TickReport {
        let default = SimConfig::default();
        let budget = env.config().unwrap_or(&default).sub_step_budget();
        let mut report = TickReport::default();

        for index in 0..self.slots.len() {
            let busy: ArrayVec<RideId, { SimConfig::MAX_RATING_UPDATE_STATES }> = self
                .slots
                .iter()
                .enumerate()
                .filter(|(other, slot)| *other != index && !slot.is_idle())
                .filter_map(|(_, slot)| slot.current_ride)
                .collect();

            let slot = &mut self.slots[index];
            for _ in 0..budget {
                step(slot, &busy, world, env, &mut report);
                if slot.is_idle() {
                    break;
                }
            }
        }
        report
    }
}

/// Drives a full rating pass of `ride` to completion, ignoring the budget.
///
/// Uses a private slot, so in-flight scans of the engine are untouched.
/// Closed rides are left alone. The pass gives up after
/// [`SimConfig::scan_step_limit`] steps on a track graph that never closes.
pub fn force_update_ride(world: &mut World, env: &ParkEnv<'_>, ride: RideId) -> TickReport {
    let mut report = TickReport::default();
    let Some(target) = world.rides.get(ride) else {
        return report;
    };
    if target.status == RideStatus::Closed {
        return report;
    }

    let default = SimConfig::default();
    let limit = env.config().unwrap_or(&default).scan_step_limit;
    let mut slot = RatingUpdateState::for_ride(ride);
    while !slot.is_idle() {
        if report.sub_steps >= limit {
            tracing::warn!("rating pass of ride {} hit the step limit of {}", ride, limit);
            break;
        }
        step(&mut slot, &[], world, env, &mut report);
    }
    report
}

/// Runs the handler of the slot's current state once.
fn step(
    slot: &mut RatingUpdateState,
    busy: &[RideId],
    world: &mut World,
    env: &ParkEnv<'_>,
    report: &mut TickReport,
) {
    let before = slot.state;
    tracing::trace!(
        "rating slot on {:?} at {} ({})",
        slot.current_ride,
        slot.proximity,
        before
    );

    match slot.state {
        RatingState::FindNextRide => find_next_ride(slot, busy, &world.rides),
        RatingState::Initialise => {
            slot.reset_scores();
            slot.state = RatingState::ScanForward;
            begin_proximity_loop(slot, world, env);
        }
        RatingState::ScanForward => scan(slot, world, Walk::Forward, report),
        RatingState::ScanBackwardInit => {
            slot.state = RatingState::ScanBackward;
            begin_proximity_loop(slot, world, env);
        }
        RatingState::ScanBackward => scan(slot, world, Walk::Backward, report),
        RatingState::Calculate => {
            if let Some(ride) = live_ride(slot, &world.rides).map(|ride| ride.id) {
                calculate(slot, ride, world, env);
                if let Some(target) = world.rides.get_mut(ride) {
                    target.invalidate(InvalidateFlags::MAIN);
                }
                tracing::debug!("ratings pass of ride {} finished", ride);
                report.completed.push(ride);
            }
            slot.state = RatingState::FindNextRide;
        }
    }
    report.sub_steps += 1;

    if slot.state != before {
        tracing::debug!(
            "rating slot on {:?}: {} -> {}",
            slot.current_ride,
            before,
            slot.state
        );
    }
}

/// The slot's ride, unless it was removed or closed since the last step.
fn live_ride<'a>(slot: &RatingUpdateState, rides: &'a RideRegistry) -> Option<&'a Ride> {
    slot.current_ride
        .and_then(|id| rides.get(id))
        .filter(|ride| ride.status != RideStatus::Closed)
}

fn should_skip(ride: &Ride, busy: &[RideId]) -> bool {
    ride.status == RideStatus::Closed
        || ride.lifecycle_flags.contains(LifecycleFlags::FIXED_RATINGS)
        || busy.contains(&ride.id)
}

/// Picks the ride after the cursor that needs rating, wrapping to the start.
///
/// The wrap lands on the first ride unfiltered; if that one must be skipped
/// the slot stays idle and retries from there next tick.
fn find_next_ride(slot: &mut RatingUpdateState, busy: &[RideId], rides: &RideRegistry) {
    let cursor = slot.current_ride.filter(|id| rides.get(*id).is_some());
    let mut candidate = match cursor {
        Some(id) => rides.next_after(id),
        None => rides.first(),
    };
    while let Some(ride) = candidate {
        if !should_skip(ride, busy) {
            break;
        }
        candidate = rides.next_after(ride.id);
    }
    let candidate = candidate.or_else(|| rides.first());

    slot.current_ride = candidate.map(|ride| ride.id);
    if candidate.is_some_and(|ride| !should_skip(ride, busy)) {
        slot.state = RatingState::Initialise;
    }
}

/// Points the cursor at the first station start of the ride.
///
/// Mazes have no circuit and skip straight to `Calculate`.
fn begin_proximity_loop(slot: &mut RatingUpdateState, world: &World, env: &ParkEnv<'_>) {
    let Some(ride) = live_ride(slot, &world.rides) else {
        slot.state = RatingState::FindNextRide;
        return;
    };

    let is_maze = env
        .descriptor(ride.ride_type)
        .is_ok_and(|descriptor| descriptor.has_flag(RideTypeFlags::MAZE));
    if is_maze {
        slot.state = RatingState::Calculate;
        return;
    }

    let Some(start) = ride
        .populated_stations()
        .find_map(|(_, station)| station.start_location().map(|start| (station, start)))
    else {
        slot.state = RatingState::FindNextRide;
        return;
    };
    let (station, location) = start;
    slot.station_flags.set(ScanFlags::NO_ENTRANCE, station.entrance.is_none());
    slot.proximity = location;
    slot.proximity_track_type = None;
    slot.proximity_start = location;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Walk {
    Forward,
    Backward,
}

/// Scores the piece under the cursor and moves to its neighbour.
fn scan(slot: &mut RatingUpdateState, world: &World, walk: Walk, report: &mut TickReport) {
    let Some(ride) = live_ride(slot, &world.rides) else {
        slot.state = RatingState::FindNextRide;
        return;
    };

    let piece = world
        .map
        .piece_at(slot.proximity, ride.id)
        .filter(|piece| {
            slot.proximity_track_type
                .is_none_or(|expected| expected == piece.track_type)
        });
    let Some(piece) = piece else {
        tracing::warn!(
            "rating scan of ride {} lost the track at {}",
            ride.id,
            slot.proximity
        );
        slot.state = RatingState::FindNextRide;
        return;
    };

    if walk == Walk::Forward && slot.proximity_track_type == Some(TrackElemType::EndStation) {
        let no_entrance = ride
            .station(piece.station)
            .is_none_or(|station| station.entrance.is_none());
        slot.station_flags.set(ScanFlags::NO_ENTRANCE, no_entrance);
    }

    if score_close_proximity(&world.map, slot, &piece) {
        report.proximity_scores += 1;
    }

    let neighbour = match walk {
        Walk::Forward => world.map.next_piece(&piece),
        Walk::Backward => world.map.previous_piece(&piece),
    };
    let Some(neighbour) = neighbour else {
        slot.state = match walk {
            Walk::Forward => RatingState::ScanBackwardInit,
            Walk::Backward => RatingState::Calculate,
        };
        return;
    };
    if neighbour.origin == slot.proximity_start {
        slot.state = RatingState::Calculate;
        return;
    }
    slot.proximity = neighbour.origin;
    slot.proximity_track_type = Some(neighbour.track_type);
}

/// Ratings, upkeep and value of `ride` from the finished scan.
fn calculate(slot: &RatingUpdateState, id: RideId, world: &mut World, env: &ParkEnv<'_>) {
    let Some(ride) = world.rides.get(id) else {
        return;
    };
    let descriptor = match env.descriptor(ride.ride_type) {
        Ok(descriptor) => descriptor,
        Err(error) => {
            tracing::warn!("cannot rate ride {}: {}", id, error);
            return;
        }
    };

    match descriptor.ratings.calc_type {
        RatingsCalcType::Normal => {
            if !ride.lifecycle_flags.contains(LifecycleFlags::TESTED) {
                return;
            }
        }
        RatingsCalcType::FlatRide => {
            if let Some(ride) = world.rides.get_mut(id) {
                ride.lifecycle_flags |= LifecycleFlags::TESTED | LifecycleFlags::NO_RAW_STATS;
            }
        }
        RatingsCalcType::Stall => {
            let upkeep = compute_upkeep(ride, descriptor, slot.num_reversers, slot.num_brakes);
            if let Some(ride) = world.rides.get_mut(id) {
                ride.upkeep_cost = Some(upkeep);
                ride.invalidate(InvalidateFlags::INCOME);
            }
            return;
        }
        RatingsCalcType::Untested => {}
    }

    let Some(ride) = world.rides.get(id) else {
        return;
    };
    let entry = ride.subtype.and_then(|subtype| env.entry(subtype).ok());
    let unreliability = unreliability_factor(descriptor, ride.lift_hill_speed);
    let sheltered = sheltered_eighths(ride, entry);
    let inputs = RatingInputs {
        ride,
        descriptor,
        entry,
        proximity_score: proximity_score(slot),
        scenery_score: scenery_score(&world.map, ride, descriptor),
        num_reversers: slot.num_reversers,
        track_sheltered_eighths: sheltered.track,
        synchronised_with_adjacent: has_adjacent_synchronised_station(
            &world.map,
            &world.rides,
            id,
        ),
    };
    let ratings = compute_ratings(&inputs);

    let Some(ride) = world.rides.get_mut(id) else {
        return;
    };
    ride.reliability.unreliability_factor = unreliability;
    ride.sheltered_eighths = descriptor
        .ratings
        .sheltered_eighths
        .unwrap_or(sheltered.total);
    ride.ratings = ratings;
    ride.upkeep_cost = Some(compute_upkeep(
        ride,
        descriptor,
        slot.num_reversers,
        slot.num_brakes,
    ));
    ride.invalidate(InvalidateFlags::INCOME);

    let default = SimConfig::default();
    let disable_aging = env.config().unwrap_or(&default).disable_ride_value_aging;
    let value = world
        .rides
        .get(id)
        .and_then(|ride| compute_value(ride, descriptor, &world.rides, world.clock.months, disable_aging));
    if let (Some(value), Some(ride)) = (value, world.rides.get_mut(id)) {
        ride.value = Some(value);
    }

    tracing::debug!("ride {} rated {}", id, ratings);
    world.emit(ParkEvent::RatingsCalculated { ride: id, ratings });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RideCatalog;
    use crate::env::{Env, PcgRng};
    use crate::ride::RideType;
    use crate::track::LayoutBuilder;
    use crate::world::{Direction, TileCoordsXYZ, TileCoordsXYZD, TileMap};

    fn oval(world: &mut World, ride_type: RideType, y: i32) -> RideId {
        use TrackElemType::*;
        let id = world.rides.create(ride_type).expect("free slot");
        let layout = LayoutBuilder::new(id, TileCoordsXYZ::new(3, y, 2), Direction::East)
            .pieces([
                BeginStation,
                EndStation,
                RightQuarterTurn3,
                RightQuarterTurn3,
                Flat,
                Flat,
                RightQuarterTurn3,
                RightQuarterTurn3,
            ])
            .place(&mut world.map)
            .expect("layout fits");
        let ride = world.rides.get_mut(id).expect("created");
        for station in &layout.stations {
            ride.register_station(station);
        }
        ride.stations[0].entrance = Some(TileCoordsXYZD::new(4, y + 1, 2, Direction::North));
        ride.stations[0].segment_length = 120 << 16;
        ride.stations[0].segment_time = 90;
        ride.status = RideStatus::Testing;
        ride.lifecycle_flags |= LifecycleFlags::TESTED;
        id
    }

    fn world() -> World {
        World::new(TileMap::flat(32, 32, 2), 11)
    }

    fn config(sub_steps: usize) -> SimConfig {
        SimConfig {
            rating_sub_steps: sub_steps,
            ..SimConfig::default()
        }
    }

    #[test]
    fn force_update_rates_a_tested_circuit() {
        let catalog = RideCatalog::builtin();
        let config = SimConfig::default();
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        let mut world = world();
        let id = oval(&mut world, RideType::LoopingCoaster, 10);

        let report = force_update_ride(&mut world, &env, id);
        assert_eq!(report.completed, vec![id]);
        assert_eq!(report.proximity_scores, 8);

        let ride = world.rides.get(id).expect("ride");
        assert!(!ride.ratings.is_null());
        assert!(ride.upkeep_cost.is_some());
        assert!(ride.window_invalidate.contains(InvalidateFlags::MAIN));
        assert!(world.events.iter().any(|record| matches!(
            record.event,
            ParkEvent::RatingsCalculated { ride, .. } if ride == id
        )));
    }

    #[test]
    fn untested_normal_rides_stay_unrated() {
        let catalog = RideCatalog::builtin();
        let config = SimConfig::default();
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        let mut world = world();
        let id = oval(&mut world, RideType::LoopingCoaster, 10);
        world
            .rides
            .get_mut(id)
            .expect("ride")
            .lifecycle_flags
            .remove(LifecycleFlags::TESTED);

        let report = force_update_ride(&mut world, &env, id);
        assert_eq!(report.completed, vec![id]);
        assert!(world.rides.get(id).expect("ride").ratings.is_null());
        assert!(world.events.is_empty());
    }

    #[test]
    fn closed_rides_are_not_forced() {
        let catalog = RideCatalog::builtin();
        let config = SimConfig::default();
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        let mut world = world();
        let id = oval(&mut world, RideType::LoopingCoaster, 10);
        world.rides.get_mut(id).expect("ride").status = RideStatus::Closed;

        let report = force_update_ride(&mut world, &env, id);
        assert_eq!(report, TickReport::default());
    }

    #[test]
    fn scans_resume_across_ticks() {
        let catalog = RideCatalog::builtin();
        let config = config(4);
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        let mut world = world();
        let id = oval(&mut world, RideType::LoopingCoaster, 10);
        let mut engine = RatingEngine::new();

        let first = engine.update_all(&mut world, &env);
        assert!(first.completed.is_empty());
        assert!(engine.is_updating(id));
        assert_eq!(engine.slots()[0].state, RatingState::ScanForward);

        // Eleven steps in all: the third tick calculates.
        let mut completed = Vec::new();
        for _ in 0..2 {
            completed.extend(engine.update_all(&mut world, &env).completed);
        }
        assert_eq!(completed, vec![id]);
        assert!(!world.rides.get(id).expect("ride").ratings.is_null());
    }

    #[test]
    fn split_scan_matches_forced_pass() {
        let catalog = RideCatalog::builtin();
        let split_config = config(3);
        let full_config = SimConfig::default();
        let split_env = Env::with_all(&catalog, &PcgRng, &split_config).into_park_env();
        let full_env = Env::with_all(&catalog, &PcgRng, &full_config).into_park_env();

        let mut split = world();
        let id = oval(&mut split, RideType::LoopingCoaster, 10);
        let mut forced = split.clone();

        let mut engine = RatingEngine::new();
        for _ in 0..10 {
            engine.update_all(&mut split, &split_env);
        }
        force_update_ride(&mut forced, &full_env, id);

        let split_ride = split.rides.get(id).expect("ride");
        let forced_ride = forced.rides.get(id).expect("ride");
        assert!(!split_ride.ratings.is_null());
        assert_eq!(split_ride.ratings, forced_ride.ratings);
        assert_eq!(split_ride.upkeep_cost, forced_ride.upkeep_cost);
    }

    #[test]
    fn removed_ride_aborts_the_scan() {
        let catalog = RideCatalog::builtin();
        let config = config(4);
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        let mut world = world();
        let id = oval(&mut world, RideType::LoopingCoaster, 10);
        let mut engine = RatingEngine::new();

        engine.update_all(&mut world, &env);
        assert!(engine.is_updating(id));
        world.rides.remove(id);

        let report = engine.update_all(&mut world, &env);
        assert!(report.completed.is_empty());
        assert!(engine.slots().iter().all(RatingUpdateState::is_idle));
    }

    #[test]
    fn budget_bounds_scorer_invocations() {
        let catalog = RideCatalog::builtin();
        let config = SimConfig::default();
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        let mut world = world();
        for y in [8, 14, 20, 26] {
            oval(&mut world, RideType::LoopingCoaster, y);
        }
        let mut engine = RatingEngine::new();
        let bound = SimConfig::MAX_RATING_UPDATE_STATES * config.sub_step_budget();
        for _ in 0..6 {
            let report = engine.update_all(&mut world, &env);
            assert!(report.sub_steps <= bound);
            assert!(report.proximity_scores <= bound);
        }
    }

    #[test]
    fn slots_never_share_a_ride() {
        let catalog = RideCatalog::builtin();
        let config = config(2);
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        let mut world = world();
        let first = oval(&mut world, RideType::LoopingCoaster, 8);
        let second = oval(&mut world, RideType::LoopingCoaster, 16);
        let mut engine = RatingEngine::new();

        engine.update_all(&mut world, &env);
        let scanning: Vec<_> = engine
            .slots()
            .iter()
            .filter(|slot| !slot.is_idle())
            .filter_map(|slot| slot.current_ride)
            .collect();
        assert_eq!(scanning, vec![first, second]);
    }

    #[test]
    fn every_slot_takes_a_different_ride_when_rides_outnumber_slots() {
        let catalog = RideCatalog::builtin();
        let config = config(2);
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        let mut world = World::new(TileMap::flat(64, 64, 2), 11);
        let rides: Vec<RideId> = (0..5)
            .map(|row| oval(&mut world, RideType::LoopingCoaster, 4 + row * 10))
            .collect();
        let mut engine = RatingEngine::new();

        engine.update_all(&mut world, &env);
        let scanning: Vec<_> = engine
            .slots()
            .iter()
            .filter(|slot| !slot.is_idle())
            .filter_map(|slot| slot.current_ride)
            .collect();
        assert_eq!(scanning, rides[..SimConfig::MAX_RATING_UPDATE_STATES]);
        assert!(!engine.is_updating(rides[4]));
    }

    #[test]
    fn fixed_and_closed_rides_are_skipped() {
        let catalog = RideCatalog::builtin();
        let config = SimConfig::default();
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        let mut world = world();
        let fixed = oval(&mut world, RideType::LoopingCoaster, 8);
        let closed = oval(&mut world, RideType::LoopingCoaster, 16);
        world.rides.get_mut(fixed).expect("ride").lifecycle_flags |= LifecycleFlags::FIXED_RATINGS;
        world.rides.get_mut(closed).expect("ride").status = RideStatus::Closed;

        let mut engine = RatingEngine::new();
        for _ in 0..4 {
            assert!(engine.update_all(&mut world, &env).completed.is_empty());
        }
        assert!(world.rides.iter().all(|ride| ride.ratings.is_null()));
    }

    #[test]
    fn missing_entrance_suppresses_scoring_but_not_the_pass() {
        let catalog = RideCatalog::builtin();
        let config = SimConfig::default();
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        let mut world = world();
        let id = oval(&mut world, RideType::LoopingCoaster, 10);
        world.rides.get_mut(id).expect("ride").stations[0].entrance = None;

        let report = force_update_ride(&mut world, &env, id);
        assert_eq!(report.completed, vec![id]);
        assert_eq!(report.proximity_scores, 0);
    }

    #[test]
    fn missing_descriptor_degrades_to_no_ratings() {
        let catalog = RideCatalog::new();
        let config = SimConfig::default();
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        let mut world = world();
        let id = oval(&mut world, RideType::LoopingCoaster, 10);

        let report = force_update_ride(&mut world, &env, id);
        assert_eq!(report.completed, vec![id]);
        assert!(world.rides.get(id).expect("ride").ratings.is_null());
    }

    #[test]
    fn open_ended_track_is_scanned_both_ways() {
        use TrackElemType::*;
        let catalog = RideCatalog::builtin();
        let config = SimConfig::default();
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
        let mut world = world();
        let id = world.rides.create(RideType::LoopingCoaster).expect("slot");
        let layout = LayoutBuilder::new(id, TileCoordsXYZ::new(2, 6, 2), Direction::East)
            .pieces([Flat, Flat, BeginStation, EndStation, Flat, Flat, Flat])
            .place(&mut world.map)
            .expect("layout fits");
        let ride = world.rides.get_mut(id).expect("created");
        for station in &layout.stations {
            ride.register_station(station);
        }
        ride.stations[0].entrance = Some(TileCoordsXYZD::new(5, 5, 2, Direction::North));
        ride.status = RideStatus::Testing;
        ride.lifecycle_flags |= LifecycleFlags::TESTED;

        let report = force_update_ride(&mut world, &env, id);
        assert_eq!(report.completed, vec![id]);
        // Forward from the end station over four pieces, back over four.
        assert_eq!(report.proximity_scores, 8);
    }
}
