use bitflags::bitflags;

use crate::ride::RideType;
use crate::world::RideEntryId;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct RideEntryFlags: u16 {
        /// Trains cannot run through inversions.
        const NO_INVERSIONS = 1 << 0;
        const NO_BANKED_TRACK = 1 << 1;
        /// Vehicles are enclosed; the ride counts as fully sheltered.
        const COVERED = 1 << 2;
        const CANNOT_BREAK_DOWN = 1 << 3;
        /// Air time excitement bonus stops growing after 96 ticks.
        const LIMIT_AIRTIME_BONUS = 1 << 4;
    }
}

/// Physical properties of one car.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarSpec {
    /// Distance the car takes up on the track.
    pub spacing: u32,
    pub friction: u16,
    /// Top powered speed in mph, 0 for unpowered cars.
    #[cfg_attr(feature = "serde", serde(default))]
    pub powered_max_speed: u8,
}

/// A vehicle design that a ride of a given type can run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RideEntry {
    pub id: RideEntryId,
    pub name: String,
    pub ride_type: RideType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: RideEntryFlags,
    pub min_cars_per_train: u8,
    pub max_cars_per_train: u8,
    /// Fixed unit count of a flat ride; `None` for tracked trains.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cars_per_flat_ride: Option<u8>,
    pub car: CarSpec,
    /// Percentage adjustments applied to the final ratings, scaled by 1/128.
    #[cfg_attr(feature = "serde", serde(default))]
    pub excitement_multiplier: i8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub intensity_multiplier: i8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub nausea_multiplier: i8,
}

impl RideEntry {
    #[inline]
    pub fn has_flag(&self, flag: RideEntryFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Summed spacing of a train of `cars` cars.
    pub fn train_spacing(&self, cars: u8) -> u32 {
        self.car.spacing.saturating_mul(cars as u32)
    }

    /// Summed friction of a train of `cars` cars.
    pub fn train_friction(&self, cars: u8) -> u32 {
        (self.car.friction as u32).saturating_mul(cars as u32)
    }
}
