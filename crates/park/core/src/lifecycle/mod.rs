//! Ride lifecycle: status transitions, construction checks, vehicles,
//! breakdowns and inspections.
//!
//! [`set_ride_status`] validates a requested status against the track and
//! vehicles before anything is changed; a rejected request reports the
//! player-facing reason and the tile it concerns. [`update_rides`] is the
//! per-tick driver for reliability, breakdowns and inspections.

mod blocks;
mod breakdown;
mod cable_lift;
mod errors;
mod status;
mod update;
mod validate;
mod vehicles;

pub use blocks::{boat_hire_return_point, count_block_brakes, set_block_points};
pub use breakdown::{
    BREAKDOWN_PERIOD, BreakdownRolls, DOWNTIME_PERIOD, INSPECTION_PERIOD, age_penalty,
    breakdown_status_update, can_break_down, fix_breakdown, mark_broken_down,
    new_breakdown_problem, prepare_breakdown, update_breakdown, update_inspection,
    update_mechanic_status,
};
pub use cable_lift::{CABLE_LIFT_SEGMENTS, check_cable_lift, create_cable_lift, needs_cable_lift};
pub use errors::{StatusError, TransitionPhase, ValidationError, ValidationFailure};
pub use status::{CommandMode, StatusPlan, query_status, set_ride_status};
pub use update::{
    STATUS_UPDATE_PERIOD, break_down, complete_test_run, fix_ride, invalidate_test_results,
    is_status_update_tick, update_ride, update_rides,
};
pub use validate::{
    CheckResult, check_block_brakes, check_circuit, check_entrance_exit, check_station_count,
    check_station_length, check_station_present, check_station_to_station,
    check_vehicle_compatibility, find_origin, requires_circuit, validate_track,
};
pub use vehicles::{
    VehicleSizing, compute_vehicle_sizing, create_trains, remove_trains, update_max_vehicles,
};
