//! Rating engine properties over the public API.

mod common;

use park_core::ratings::RatingState;
use park_core::{
    CommandMode, Env, ParkEnv, PcgRng, RatingEngine, RatingTuple, RideCatalog, RideId,
    RideStatus, SimConfig, World, complete_test_run, force_update_ride, set_ride_status,
};

use common::{empty_world, finished_coaster};

fn config(sub_steps: usize) -> SimConfig {
    SimConfig {
        rating_sub_steps: sub_steps,
        ..SimConfig::default()
    }
}

/// Opens the ride for testing and records a test run.
fn tested_coaster(world: &mut World, env: &ParkEnv<'_>, y: i32) -> RideId {
    let id = finished_coaster(world, y);
    set_ride_status(world, env, id, RideStatus::Testing, CommandMode::Apply)
        .expect("finished coaster can be tested");
    complete_test_run(world, env, id)
        .expect("catalog available")
        .expect("ride has track");
    id
}

#[test]
fn test_ten_piece_loop_is_rated_without_shelter() {
    let catalog = RideCatalog::builtin();
    let config = SimConfig::default();
    let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
    let mut world = empty_world();
    let id = tested_coaster(&mut world, &env, 20);

    let report = force_update_ride(&mut world, &env, id);
    assert_eq!(report.completed, vec![id]);

    let ride = world.rides.get(id).expect("ride exists");
    assert_eq!(ride.sheltered_eighths, 0);
    assert!(!ride.ratings.is_null());
    assert!(ride.ratings.excitement > 0, "ratings {}", ride.ratings);
}

#[test]
fn test_forced_rating_is_idempotent() {
    let catalog = RideCatalog::builtin();
    let config = SimConfig::default();
    let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
    let mut world = empty_world();
    let id = tested_coaster(&mut world, &env, 20);

    force_update_ride(&mut world, &env, id);
    let first = world.rides.get(id).expect("ride exists").ratings;
    force_update_ride(&mut world, &env, id);
    let second = world.rides.get(id).expect("ride exists").ratings;
    assert_eq!(first, second);
}

#[test]
fn test_split_scan_matches_forced_scan() {
    let catalog = RideCatalog::builtin();
    let full = SimConfig::default();
    let full_env = Env::with_all(&catalog, &PcgRng, &full).into_park_env();
    let mut forced = empty_world();
    let id = tested_coaster(&mut forced, &full_env, 20);
    let split = forced.clone();

    force_update_ride(&mut forced, &full_env, id);

    for sub_steps in [1, 2, 3, 7] {
        let mut world = split.clone();
        let split_config = config(sub_steps);
        let split_env = Env::with_all(&catalog, &PcgRng, &split_config).into_park_env();
        let mut engine = RatingEngine::new();
        for _ in 0..200 {
            if !engine.update_all(&mut world, &split_env).completed.is_empty() {
                break;
            }
        }
        assert_eq!(
            world.rides.get(id).expect("ride exists").ratings,
            forced.rides.get(id).expect("ride exists").ratings,
            "split into steps of {sub_steps}"
        );
    }
}

#[test]
fn test_one_tick_stays_within_budget() {
    let catalog = RideCatalog::builtin();
    let config = SimConfig::default();
    let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
    let mut world = empty_world();
    for y in [8, 18, 28, 38] {
        tested_coaster(&mut world, &env, y);
    }

    let bound = SimConfig::MAX_RATING_UPDATE_STATES * SimConfig::MAX_RATING_SUB_STEPS;
    let mut engine = RatingEngine::new();
    for _ in 0..10 {
        let report = engine.update_all(&mut world, &env);
        assert!(report.proximity_scores <= bound);
        assert!(report.sub_steps <= bound);
    }
}

#[test]
fn test_long_scan_resumes_on_the_next_tick() {
    let catalog = RideCatalog::builtin();
    let full = SimConfig::default();
    let full_env = Env::with_all(&catalog, &PcgRng, &full).into_park_env();
    let mut world = empty_world();
    let id = tested_coaster(&mut world, &full_env, 20);

    let config = config(4);
    let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();
    let mut engine = RatingEngine::new();

    let first = engine.update_all(&mut world, &env);
    assert!(first.completed.is_empty());
    let slot = &engine.slots()[0];
    assert_eq!(slot.current_ride, Some(id));
    assert_ne!(slot.state, RatingState::FindNextRide);

    let mut ticks = 1;
    while !engine.update_all(&mut world, &env).completed.contains(&id) {
        ticks += 1;
        assert!(ticks < 50, "scan never finished");
    }
    assert!(!world.rides.get(id).expect("ride exists").ratings.is_null());
}

#[test]
fn test_only_the_excitement_sentinel_means_unrated() {
    assert!(RatingTuple::NULL.is_null());
    assert!(!RatingTuple::ZERO.is_null());
    assert!(!RatingTuple::new(0, 0, 0).is_null());
    assert!(RatingTuple::new(RatingTuple::UNDEFINED, 0, 0).is_null());
    assert!(!RatingTuple::new(0, RatingTuple::UNDEFINED, RatingTuple::UNDEFINED).is_null());
}
