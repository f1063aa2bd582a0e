//! Reliability decay, breakdowns and inspections.
//!
//! These functions work on a single ride and take their random rolls as
//! arguments; [`update_ride`](super::update_ride) derives the rolls from the
//! world seed and raises the events.

use crate::catalog::{RideEntry, RideEntryFlags, RideTypeDescriptor};
use crate::config::SimConfig;
use crate::ride::{
    BreakdownKind, InvalidateFlags, LifecycleFlags, MechanicStatus, Reliability, Ride, RideStatus,
};
use crate::world::Tick;

/// Ticks between inspection countdown steps.
pub const INSPECTION_PERIOD: u64 = 2048;
/// Ticks between reliability updates.
pub const BREAKDOWN_PERIOD: u64 = 256;
/// Ticks between downtime history shifts.
pub const DOWNTIME_PERIOD: u64 = 8192;

/// Youngest age, in months, at which brakes can fail.
const BRAKES_FAILURE_MIN_AGE: u32 = 16;

/// Mask applied to the chance roll before comparing with lost reliability.
const BREAKDOWN_ROLL_MASK: u32 = 0x2F_FFFF;

const BREAKDOWN_IN_PROGRESS: LifecycleFlags = LifecycleFlags::BREAKDOWN_PENDING
    .union(LifecycleFlags::BROKEN_DOWN)
    .union(LifecycleFlags::CRASHED);

/// Random values consumed by one breakdown update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BreakdownRolls {
    pub chance: u32,
    pub kind: u32,
    pub train: u32,
    pub car: u32,
}

fn first_station_with_exit(ride: &Ride) -> Option<u8> {
    ride.populated_stations()
        .find(|(_, station)| station.exit.is_some())
        .map(|(index, _)| index.0)
}

/// Advances the inspection countdown by one minute.
///
/// Returns true when the ride has just become due for inspection.
pub fn update_inspection(ride: &mut Ride, descriptor: &RideTypeDescriptor) -> bool {
    let reliability = &mut ride.reliability;
    reliability.last_inspection = reliability.last_inspection.saturating_add(1);

    let Some(interval) = reliability.inspection_interval.minutes() else {
        return false;
    };
    if descriptor.available_breakdowns == 0 || interval > reliability.last_inspection {
        return false;
    }
    if ride.lifecycle_flags.intersects(
        LifecycleFlags::BREAKDOWN_PENDING
            | LifecycleFlags::BROKEN_DOWN
            | LifecycleFlags::DUE_INSPECTION
            | LifecycleFlags::CRASHED,
    ) {
        return false;
    }

    ride.lifecycle_flags |= LifecycleFlags::DUE_INSPECTION;
    ride.reliability.mechanic_status = MechanicStatus::Calling;
    ride.reliability.inspection_station = first_station_with_exit(ride).unwrap_or(0);
    true
}

/// Extra reliability lost each update by an ageing ride.
pub fn age_penalty(unreliability: u8, age_months: u32) -> u16 {
    let factor = unreliability as u16;
    match age_months / 8 {
        0 => 0,
        1 => factor / 8,
        2 => factor / 4,
        3 | 4 => factor / 2,
        5..=7 => factor,
        _ => factor * 2,
    }
}

/// Whether `ride` can break down at all.
pub fn can_break_down(descriptor: &RideTypeDescriptor, entry: Option<&RideEntry>) -> bool {
    descriptor.available_breakdowns != 0
        && entry.is_some_and(|entry| !entry.has_flag(RideEntryFlags::CANNOT_BREAK_DOWN))
}

/// Picks a breakdown kind from the type's weighted list.
///
/// Brakes failure is dropped rather than re-rolled when it cannot happen.
pub fn new_breakdown_problem(
    ride: &Ride,
    descriptor: &RideTypeDescriptor,
    entry: Option<&RideEntry>,
    config: &SimConfig,
    raining: bool,
    age_months: u32,
    roll: u32,
) -> Option<BreakdownKind> {
    if !can_break_down(descriptor, entry) {
        return None;
    }
    let total: u32 = descriptor.breakdowns().map(|kind| kind.weight(raining)).sum();
    if total == 0 {
        return None;
    }
    let mut remaining = (roll % total) as i64;
    let kind = descriptor.breakdowns().find(|kind| {
        remaining -= kind.weight(raining) as i64;
        remaining < 0
    })?;
    if kind != BreakdownKind::BrakesFailure {
        return Some(kind);
    }
    if ride.is_block_sectioned() && ride.num_trains != 1 {
        return None;
    }
    if config.disable_brakes_failure {
        return None;
    }
    if age_months < BRAKES_FAILURE_MIN_AGE || ride.reliability.percentage() > 50 {
        return None;
    }
    Some(kind)
}

/// Schedules `kind`. Does nothing while another breakdown is in progress.
pub fn prepare_breakdown(
    ride: &mut Ride,
    kind: BreakdownKind,
    train_roll: u32,
    car_roll: u32,
) -> bool {
    if ride.lifecycle_flags.intersects(BREAKDOWN_IN_PROGRESS) {
        return false;
    }
    ride.lifecycle_flags.remove(LifecycleFlags::DUE_INSPECTION);
    ride.lifecycle_flags |= LifecycleFlags::BREAKDOWN_PENDING;

    let exit_station = first_station_with_exit(ride);
    let num_trains = ride.num_trains as u32;
    let num_cars = ride.num_cars_per_train as u32;
    let reliability = &mut ride.reliability;
    reliability.breakdown_reason_pending = Some(kind);
    reliability.mechanic_status = MechanicStatus::Undefined;
    reliability.not_fixed_timeout = 0;

    match kind {
        BreakdownKind::SafetyCutOut | BreakdownKind::ControlFailure | BreakdownKind::BrakesFailure => {
            if let Some(station) = exit_station {
                reliability.inspection_station = station;
            }
        }
        BreakdownKind::RestraintsStuckClosed
        | BreakdownKind::RestraintsStuckOpen
        | BreakdownKind::DoorsStuckClosed
        | BreakdownKind::DoorsStuckOpen => {
            if num_trains > 0 {
                reliability.broken_train = (train_roll % num_trains) as u8;
            }
            if num_cars > 0 {
                reliability.broken_car = (car_roll % num_cars) as u8;
            }
        }
        BreakdownKind::VehicleMalfunction => {
            if num_trains > 0 {
                reliability.broken_train = (train_roll % num_trains) as u8;
            }
            reliability.broken_car = 0;
        }
    }
    ride.invalidate(InvalidateFlags::MAINTENANCE);
    true
}

/// Reliability decay and the breakdown roll, run every [`BREAKDOWN_PERIOD`].
///
/// Returns the kind scheduled, if any.
#[allow(clippy::too_many_arguments)]
pub fn update_breakdown(
    ride: &mut Ride,
    descriptor: &RideTypeDescriptor,
    entry: Option<&RideEntry>,
    config: &SimConfig,
    tick: Tick,
    current_month: u32,
    raining: bool,
    rolls: BreakdownRolls,
) -> Option<BreakdownKind> {
    let reliability = &mut ride.reliability;
    if ride
        .lifecycle_flags
        .intersects(LifecycleFlags::BROKEN_DOWN | LifecycleFlags::CRASHED)
    {
        reliability.downtime_history[0] = reliability.downtime_history[0].saturating_add(1);
    }
    if tick.is_every(DOWNTIME_PERIOD) {
        let total: u32 = reliability.downtime_history.iter().map(|&d| d as u32).sum();
        reliability.downtime = (total / 2).min(100) as u8;
        reliability.downtime_history.rotate_right(1);
        reliability.downtime_history[0] = 0;
        ride.invalidate(InvalidateFlags::MAINTENANCE);
    }

    if ride.lifecycle_flags.intersects(BREAKDOWN_IN_PROGRESS) || ride.status == RideStatus::Closed {
        return None;
    }

    let age = ride.age(current_month);
    let factor = ride.reliability.unreliability_factor;
    let loss = factor as u16 + age_penalty(factor, age);
    ride.reliability.reliability = ride.reliability.reliability.saturating_sub(loss);
    ride.invalidate(InvalidateFlags::MAINTENANCE);

    if config.disable_breakdowns {
        return None;
    }
    let reliability = ride.reliability.reliability as u32;
    let threshold = 1 + Reliability::INITIAL as u32 - reliability;
    if reliability != 0 && (rolls.chance & BREAKDOWN_ROLL_MASK) > threshold {
        return None;
    }
    let kind = new_breakdown_problem(ride, descriptor, entry, config, raining, age, rolls.kind)?;
    prepare_breakdown(ride, kind, rolls.train, rolls.car).then_some(kind)
}

/// Stops the ride for its pending breakdown. Vehicle code calls this when a
/// fault it detected takes effect.
pub fn mark_broken_down(ride: &mut Ride) -> Option<BreakdownKind> {
    if !ride.lifecycle_flags.contains(LifecycleFlags::BREAKDOWN_PENDING)
        || ride.lifecycle_flags.contains(LifecycleFlags::BROKEN_DOWN)
    {
        return None;
    }
    let kind = ride.reliability.breakdown_reason_pending?;
    ride.lifecycle_flags |= LifecycleFlags::BROKEN_DOWN;
    ride.reliability.mechanic_status = MechanicStatus::Calling;
    ride.reliability.breakdown_reason = Some(kind);
    ride.invalidate(InvalidateFlags::MAINTENANCE | InvalidateFlags::LIST | InvalidateFlags::MAIN);
    Some(kind)
}

/// Returns the kind when the ride has just broken down.
pub fn update_mechanic_status(
    ride: &mut Ride,
    descriptor: &RideTypeDescriptor,
) -> Option<BreakdownKind> {
    match ride.reliability.mechanic_status {
        MechanicStatus::Undefined => {
            let pending = ride.reliability.breakdown_reason_pending?;
            if pending.stops_ride_immediately() {
                mark_broken_down(ride)
            } else {
                None
            }
        }
        MechanicStatus::Calling => {
            if descriptor.available_breakdowns == 0 {
                ride.lifecycle_flags.remove(
                    LifecycleFlags::BREAKDOWN_PENDING
                        | LifecycleFlags::BROKEN_DOWN
                        | LifecycleFlags::DUE_INSPECTION,
                );
            }
            None
        }
        MechanicStatus::Heading | MechanicStatus::Fixing | MechanicStatus::HasFixedStationBrakes => {
            None
        }
    }
}

/// Per-ride breakdown bookkeeping, run once every 512 ticks per ride.
pub fn breakdown_status_update(
    ride: &mut Ride,
    descriptor: &RideTypeDescriptor,
) -> Option<BreakdownKind> {
    if ride.lifecycle_flags.contains(LifecycleFlags::BROKEN_DOWN) {
        let reliability = &mut ride.reliability;
        reliability.not_fixed_timeout = reliability.not_fixed_timeout.wrapping_add(1);
        if reliability.not_fixed_timeout == 0 {
            reliability.not_fixed_timeout = reliability.not_fixed_timeout.wrapping_sub(16);
        }
    }
    update_mechanic_status(ride, descriptor)
}

/// Clears the breakdown and restores some reliability.
///
/// Returns whether there was anything to fix.
pub fn fix_breakdown(ride: &mut Ride, reliability_increase: u16) -> bool {
    let broken = ride.lifecycle_flags.intersects(
        LifecycleFlags::BREAKDOWN_PENDING
            | LifecycleFlags::BROKEN_DOWN
            | LifecycleFlags::DUE_INSPECTION,
    );
    ride.lifecycle_flags.remove(
        LifecycleFlags::BREAKDOWN_PENDING
            | LifecycleFlags::BROKEN_DOWN
            | LifecycleFlags::DUE_INSPECTION,
    );
    ride.invalidate(InvalidateFlags::MAIN | InvalidateFlags::LIST | InvalidateFlags::MAINTENANCE);

    let reliability = &mut ride.reliability;
    reliability.mechanic_status = MechanicStatus::Undefined;
    reliability.breakdown_reason_pending = None;
    reliability.breakdown_reason = None;
    let unreliability = 100u16.saturating_sub(reliability.percentage() as u16);
    let gain = reliability_increase.saturating_mul(unreliability / 2);
    reliability.reliability = reliability
        .reliability
        .saturating_add(gain)
        .min(Reliability::INITIAL);
    broken
}
