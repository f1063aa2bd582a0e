//! Running cost of a ride.

use crate::catalog::{RideTypeDescriptor, RideTypeFlags, UpkeepCosts};
use crate::ride::{LifecycleFlags, Ride, RideMode};

/// Upkeep per 1024 units of track on types with running track.
const TRACK_LENGTH_MULTIPLIER: u32 = 20;

/// Surcharge of launch-type operating modes.
fn mode_surcharge(mode: RideMode) -> u32 {
    match mode {
        RideMode::ReverseInclineLaunchedShuttle => 30,
        RideMode::PoweredLaunchPasstrough => 160,
        RideMode::LimPoweredLaunch => 320,
        RideMode::PoweredLaunch | RideMode::PoweredLaunchBlockSectioned => 220,
        _ => 0,
    }
}

/// Upkeep cost per month, scaled by 5/8.
///
/// `num_reversers` and `num_brakes` are the counts found by the last
/// proximity scan.
pub fn compute_upkeep(
    ride: &Ride,
    descriptor: &RideTypeDescriptor,
    num_reversers: u16,
    num_brakes: u16,
) -> u16 {
    let costs = &descriptor.upkeep;
    let mut upkeep = costs.base as u32;

    let powered_lifts = ((ride.stats.packed_drops() >> 6) & 3) as u32;
    upkeep += costs.track_piece as u32 * powered_lifts;

    let multiplier = if descriptor.has_flag(RideTypeFlags::RUNNING_TRACK) {
        TRACK_LENGTH_MULTIPLIER
    } else {
        0
    };
    let length = (ride.total_length().max(0) >> 16) as u32;
    upkeep += ((length * multiplier) >> 10) & 0xFFFF;

    if ride.lifecycle_flags.contains(LifecycleFlags::ON_RIDE_PHOTO) {
        upkeep += UpkeepCosts::ON_RIDE_PHOTO as u32;
    }
    upkeep += costs.per_reverser as u32 * num_reversers as u32;
    upkeep += UpkeepCosts::PER_BRAKE as u32 * num_brakes as u32;

    upkeep += costs.per_train as u32 * ride.num_trains as u32;
    upkeep += costs.per_car as u32 * ride.num_cars_per_train as u32;
    upkeep += costs.per_station as u32 * ride.num_stations() as u32;
    upkeep += mode_surcharge(ride.mode);

    ((upkeep * 10) >> 4).min(u16::MAX as u32) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RideCatalog;
    use crate::env::CatalogOracle;
    use crate::ride::RideType;
    use crate::world::RideId;

    fn descriptor(ride_type: RideType) -> RideTypeDescriptor {
        RideCatalog::builtin()
            .descriptor(ride_type)
            .cloned()
            .expect("builtin descriptor")
    }

    #[test]
    fn base_cost_is_scaled_by_five_eighths() {
        let mut descriptor = descriptor(RideType::MerryGoRound);
        descriptor.upkeep = UpkeepCosts {
            base: 80,
            ..UpkeepCosts::default()
        };
        descriptor.flags.remove(RideTypeFlags::RUNNING_TRACK);
        let ride = Ride::new(RideId(0), RideType::MerryGoRound);
        assert_eq!(compute_upkeep(&ride, &descriptor, 0, 0), 50);
    }

    #[test]
    fn brakes_reversers_and_photo_add_up() {
        let mut descriptor = descriptor(RideType::ReverserCoaster);
        descriptor.upkeep = UpkeepCosts {
            base: 0,
            per_reverser: 10,
            ..UpkeepCosts::default()
        };
        descriptor.flags.remove(RideTypeFlags::RUNNING_TRACK);
        let mut ride = Ride::new(RideId(0), RideType::ReverserCoaster);
        ride.lifecycle_flags |= LifecycleFlags::ON_RIDE_PHOTO;
        // 40 + 2 * 10 + 3 * 20 = 120, then 5/8.
        assert_eq!(compute_upkeep(&ride, &descriptor, 2, 3), 75);
    }

    #[test]
    fn launch_modes_cost_more() {
        let mut descriptor = descriptor(RideType::LoopingCoaster);
        descriptor.upkeep = UpkeepCosts {
            base: 0,
            ..UpkeepCosts::default()
        };
        let mut ride = Ride::new(RideId(0), RideType::LoopingCoaster);
        ride.mode = RideMode::PoweredLaunch;
        assert_eq!(compute_upkeep(&ride, &descriptor, 0, 0), (220 * 10) >> 4);
        ride.mode = RideMode::LimPoweredLaunch;
        assert_eq!(compute_upkeep(&ride, &descriptor, 0, 0), (320 * 10) >> 4);
    }

    #[test]
    fn running_track_charges_length() {
        let mut descriptor = descriptor(RideType::LoopingCoaster);
        descriptor.upkeep = UpkeepCosts {
            base: 0,
            ..UpkeepCosts::default()
        };
        descriptor.flags.insert(RideTypeFlags::RUNNING_TRACK);
        let mut ride = Ride::new(RideId(0), RideType::LoopingCoaster);
        ride.stations[0].segment_length = 1024 << 16;
        assert_eq!(compute_upkeep(&ride, &descriptor, 0, 0), (20 * 10) >> 4);
    }
}
