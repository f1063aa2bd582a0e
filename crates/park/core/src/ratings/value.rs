//! Ride value: what guests are willing to pay.

use crate::catalog::RideTypeDescriptor;
use crate::ride::{Ride, RideStatus};
use crate::world::RideRegistry;

/// Age bracket: rides younger than `months` are scaled by `multiplier / divisor`.
#[derive(Clone, Copy, Debug)]
struct AgeRow {
    months: u32,
    multiplier: i64,
    divisor: i64,
}

const fn row(months: u32, multiplier: i64, divisor: i64) -> AgeRow {
    AgeRow {
        months,
        multiplier,
        divisor,
    }
}

const AGE_TABLE: [AgeRow; 9] = [
    row(5, 3, 2),
    row(13, 6, 5),
    row(40, 1, 1),
    row(64, 3, 4),
    row(88, 9, 16),
    row(104, 27, 64),
    row(120, 81, 256),
    row(128, 81, 512),
    row(200, 81, 1024),
];

/// Applies to rides at least as old as the last bracket.
const VETERAN: AgeRow = row(200, 9, 16);

fn age_factor(months: u32) -> AgeRow {
    if months >= VETERAN.months {
        return VETERAN;
    }
    AGE_TABLE
        .iter()
        .copied()
        .find(|bracket| months < bracket.months)
        .unwrap_or(VETERAN)
}

/// Value of `ride` from its ratings, age and competition.
///
/// `None` while the ride has no ratings.
pub fn compute_value(
    ride: &Ride,
    descriptor: &RideTypeDescriptor,
    rides: &RideRegistry,
    current_month: u32,
    disable_aging: bool,
) -> Option<u16> {
    if ride.ratings.is_null() {
        return None;
    }
    let weights = descriptor.value_multipliers;
    let weigh = |rating: i16, weight: i32| ((rating as i64 * weight as i64) * 32) >> 15;
    let mut value = weigh(ride.ratings.excitement, weights.excitement)
        + weigh(ride.ratings.intensity, weights.intensity)
        + weigh(ride.ratings.nausea, weights.nausea);

    let months = if disable_aging { 0 } else { ride.age(current_month) };
    let bracket = age_factor(months);
    value = value * bracket.multiplier / bracket.divisor;

    let same_type_open = rides
        .iter()
        .filter(|other| other.status == RideStatus::Open && other.ride_type == ride.ride_type)
        .count();
    if same_type_open > 1 {
        value -= value / 4;
    }
    Some(value.clamp(0, u16::MAX as i64) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RatingsMultipliers, RideCatalog};
    use crate::env::CatalogOracle;
    use crate::ride::{RatingTuple, RideType};

    fn setup() -> (RideTypeDescriptor, RideRegistry) {
        let mut descriptor = RideCatalog::builtin()
            .descriptor(RideType::LoopingCoaster)
            .cloned()
            .expect("builtin descriptor");
        descriptor.value_multipliers = RatingsMultipliers::new(50, 30, 10);
        (descriptor, RideRegistry::new())
    }

    fn rated(rides: &mut RideRegistry) -> Ride {
        let id = rides.create(RideType::LoopingCoaster).expect("slot");
        let ride = rides.get_mut(id).expect("created");
        ride.ratings = RatingTuple::new(640, 512, 256);
        ride.built_month = 0;
        ride.clone()
    }

    fn base_value() -> i64 {
        ((640 * 50 * 32) >> 15) + ((512 * 30 * 32) >> 15) + ((256 * 10 * 32) >> 15)
    }

    #[test]
    fn unrated_rides_have_no_value() {
        let (descriptor, rides) = setup();
        let ride = Ride::new(crate::world::RideId(0), RideType::LoopingCoaster);
        assert_eq!(compute_value(&ride, &descriptor, &rides, 0, false), None);
    }

    #[test]
    fn new_rides_are_worth_half_again() {
        let (descriptor, mut rides) = setup();
        let ride = rated(&mut rides);
        let value = compute_value(&ride, &descriptor, &rides, 2, false).expect("rated");
        assert_eq!(value as i64, base_value() * 3 / 2);
    }

    #[test]
    fn age_table_brackets() {
        let (descriptor, mut rides) = setup();
        let ride = rated(&mut rides);
        let at = |month| compute_value(&ride, &descriptor, &rides, month, false).expect("rated");
        assert_eq!(at(20) as i64, base_value());
        assert_eq!(at(70) as i64, base_value() * 9 / 16);
        assert_eq!(at(150) as i64, base_value() * 81 / 1024);
        assert_eq!(at(400) as i64, base_value() * 9 / 16);
    }

    #[test]
    fn aging_can_be_disabled() {
        let (descriptor, mut rides) = setup();
        let ride = rated(&mut rides);
        let value = compute_value(&ride, &descriptor, &rides, 150, true).expect("rated");
        assert_eq!(value as i64, base_value() * 3 / 2);
    }

    #[test]
    fn competition_takes_a_quarter() {
        let (descriptor, mut rides) = setup();
        let ride = rated(&mut rides);
        for _ in 0..2 {
            let id = rides.create(RideType::LoopingCoaster).expect("slot");
            rides.get_mut(id).expect("created").status = RideStatus::Open;
        }
        let value = compute_value(&ride, &descriptor, &rides, 20, false).expect("rated");
        let base = base_value();
        assert_eq!(value as i64, base - base / 4);
    }
}
