//! The ride aggregate and the value types it is built from.
//!
//! A [`Ride`] is a flat record. The rating engine and the lifecycle mutate it
//! through free functions that take `&mut Ride` (or the whole world), so no
//! behaviour lives on the struct beyond small queries and bookkeeping.
mod rating;
mod reliability;
mod station;
mod stats;
mod types;

use arrayvec::ArrayVec;
use bitflags::bitflags;
use sha2::{Digest, Sha256};

use crate::config::SimConfig;
use crate::track::PlacedStation;
use crate::world::{RideEntryId, RideId, StationIndex, TileCoordsXYZD, TrainId};

pub use rating::{RatingTuple, RideRating};
pub use reliability::{BreakdownKind, InspectionInterval, MechanicStatus, Reliability};
pub use station::Station;
pub use stats::{RideStats, ShelteredFlags, SpecialElements, TurnCounts};
pub use types::{RideMode, RideStatus, RideType};

bitflags! {
    /// Structural and operational state, independent of [`RideStatus`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct LifecycleFlags: u32 {
        const ON_TRACK = 1 << 0;
        const TESTED = 1 << 1;
        const TEST_IN_PROGRESS = 1 << 2;
        const NO_RAW_STATS = 1 << 3;
        const PASS_STATION_NO_STOPPING = 1 << 4;
        const ON_RIDE_PHOTO = 1 << 5;
        const BREAKDOWN_PENDING = 1 << 6;
        const BROKEN_DOWN = 1 << 7;
        const DUE_INSPECTION = 1 << 8;
        const QUEUE_FULL = 1 << 9;
        const CRASHED = 1 << 10;
        const HAS_STALLED_VEHICLE = 1 << 11;
        const EVER_BEEN_OPENED = 1 << 12;
        const MUSIC = 1 << 13;
        const INDESTRUCTIBLE = 1 << 14;
        const INDESTRUCTIBLE_TRACK = 1 << 15;
        const CABLE_LIFT_HILL_COMPONENT_USED = 1 << 16;
        const CABLE_LIFT = 1 << 17;
        const NOT_CUSTOM_DESIGN = 1 << 18;
        /// Ratings were set by a scenario and must not be recomputed.
        const FIXED_RATINGS = 1 << 20;
        /// Trains run backwards; some types rate this higher.
        const REVERSED_TRAINS = 1 << 21;
    }
}

bitflags! {
    /// Views the host should refresh after a ride changed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct InvalidateFlags: u8 {
        const CUSTOMER = 1 << 0;
        const INCOME = 1 << 1;
        const MAIN = 1 << 2;
        const LIST = 1 << 3;
        const OPERATING = 1 << 4;
        const MAINTENANCE = 1 << 5;
    }
}

/// Serialized fields kept for save compatibility. Nothing reads them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LegacySlots {
    pub no_cap_on_queue_length_dummy: u8,
    pub music_tune_dummy: u8,
}

pub type TrainList = ArrayVec<TrainId, { SimConfig::MAX_TRAINS_PER_RIDE }>;

/// Number of 960-tick periods of customer counts kept.
pub const CUSTOMER_HISTORY_SIZE: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ride {
    pub id: RideId,
    pub ride_type: RideType,
    /// Vehicle entry in the catalog.
    pub subtype: Option<RideEntryId>,
    pub mode: RideMode,
    pub status: RideStatus,
    pub lifecycle_flags: LifecycleFlags,
    /// Pending refresh requests, drained by the host.
    pub window_invalidate: InvalidateFlags,

    pub stations: [Station; SimConfig::MAX_STATIONS_PER_RIDE],

    pub num_trains: u8,
    pub num_cars_per_train: u8,
    pub proposed_num_trains: u8,
    pub proposed_num_cars_per_train: u8,
    pub max_trains: u8,
    pub min_cars_per_train: u8,
    pub max_cars_per_train: u8,
    pub trains: TrainList,
    pub num_circuits: u8,
    pub num_block_brakes: u16,
    pub cable_lift: Option<TrainId>,
    /// Where hired boats head back to. Set when a boat hire opens or tests.
    #[cfg_attr(feature = "serde", serde(default))]
    pub boat_hire_return: Option<TileCoordsXYZD>,

    pub lift_hill_speed: u8,
    pub num_laps: u8,
    /// Mode-dependent setting: launch speed, film, spin intensity, rotations.
    pub operation_option: u8,
    pub rotations: u8,

    pub ratings: RatingTuple,
    pub sheltered_eighths: u8,
    pub stats: RideStats,
    pub value: Option<u16>,
    pub upkeep_cost: Option<u16>,

    pub reliability: Reliability,

    pub cur_num_customers: u16,
    pub num_customers: [u16; CUSTOMER_HISTORY_SIZE],
    pub income_per_hour: i32,
    pub profit: i32,

    /// Park month in which the ride was built.
    pub built_month: u32,

    #[cfg_attr(feature = "serde", serde(default))]
    pub legacy: LegacySlots,
}

impl Ride {
    pub fn new(id: RideId, ride_type: RideType) -> Self {
        Self {
            id,
            ride_type,
            subtype: None,
            mode: RideMode::Normal,
            status: RideStatus::Closed,
            lifecycle_flags: LifecycleFlags::empty(),
            window_invalidate: InvalidateFlags::empty(),
            stations: [Station::default(); SimConfig::MAX_STATIONS_PER_RIDE],
            num_trains: 0,
            num_cars_per_train: 0,
            proposed_num_trains: 1,
            proposed_num_cars_per_train: 1,
            max_trains: 1,
            min_cars_per_train: 1,
            max_cars_per_train: 1,
            trains: TrainList::new(),
            num_circuits: 1,
            num_block_brakes: 0,
            cable_lift: None,
            boat_hire_return: None,
            lift_hill_speed: 0,
            num_laps: 1,
            operation_option: 0,
            rotations: 0,
            ratings: RatingTuple::NULL,
            sheltered_eighths: 0,
            stats: RideStats::default(),
            value: None,
            upkeep_cost: None,
            reliability: Reliability::default(),
            cur_num_customers: 0,
            num_customers: [0; CUSTOMER_HISTORY_SIZE],
            income_per_hour: 0,
            profit: 0,
            built_month: 0,
            legacy: LegacySlots::default(),
        }
    }

    pub fn station(&self, index: StationIndex) -> Option<&Station> {
        self.stations.get(index.index())
    }

    pub fn station_mut(&mut self, index: StationIndex) -> Option<&mut Station> {
        self.stations.get_mut(index.index())
    }

    /// Populated station slots with their indices.
    pub fn populated_stations(&self) -> impl Iterator<Item = (StationIndex, &Station)> {
        self.stations
            .iter()
            .enumerate()
            .filter(|(_, station)| station.is_populated())
            .map(|(index, station)| (StationIndex(index as u8), station))
    }

    pub fn num_stations(&self) -> usize {
        self.populated_stations().count()
    }

    /// First station that has a start tile.
    pub fn first_station(&self) -> Option<(StationIndex, &Station)> {
        self.populated_stations().next()
    }

    /// Records a station platform produced by a layout.
    pub fn register_station(&mut self, placed: &PlacedStation) {
        if let Some(station) = self.station_mut(placed.index) {
            let entrance = station.entrance;
            let exit = station.exit;
            *station = Station::new(placed.start, placed.length);
            station.entrance = entrance;
            station.exit = exit;
        }
    }

    /// Total track length over every station segment, 16.16 fixed point.
    pub fn total_length(&self) -> i32 {
        self.stations
            .iter()
            .fold(0i32, |total, station| total.saturating_add(station.segment_length))
    }

    /// Total ride time over every station segment, in ticks.
    pub fn total_time(&self) -> i32 {
        self.stations
            .iter()
            .map(|station| station.segment_time as i32)
            .sum()
    }

    pub fn is_block_sectioned(&self) -> bool {
        self.mode.is_block_sectioned()
    }

    pub fn has_breakdown_in_progress(&self) -> bool {
        self.lifecycle_flags.intersects(
            LifecycleFlags::BREAKDOWN_PENDING
                | LifecycleFlags::BROKEN_DOWN
                | LifecycleFlags::CRASHED,
        )
    }

    pub fn invalidate(&mut self, flags: InvalidateFlags) {
        self.window_invalidate |= flags;
    }

    /// Returns and clears pending refresh requests.
    pub fn take_invalidations(&mut self) -> InvalidateFlags {
        std::mem::take(&mut self.window_invalidate)
    }

    /// Months since the ride was built.
    pub fn age(&self, current_month: u32) -> u32 {
        current_month.saturating_sub(self.built_month)
    }

    /// SHA-256 over the fields a replay must reproduce exactly.
    ///
    /// Two simulations fed the same inputs must agree on this digest at
    /// every tick.
    pub fn state_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.id.0.to_le_bytes());
        hasher.update([self.ride_type as u8, self.mode as u8, self.status as u8]);
        hasher.update(self.lifecycle_flags.bits().to_le_bytes());
        hasher.update(self.ratings.excitement.to_le_bytes());
        hasher.update(self.ratings.intensity.to_le_bytes());
        hasher.update(self.ratings.nausea.to_le_bytes());
        hasher.update([self.sheltered_eighths, self.num_trains, self.num_cars_per_train]);
        hasher.update(self.value.unwrap_or(u16::MAX).to_le_bytes());
        hasher.update(self.upkeep_cost.unwrap_or(u16::MAX).to_le_bytes());
        hasher.update(self.reliability.reliability.to_le_bytes());
        hasher.update([
            self.reliability.unreliability_factor,
            self.reliability.downtime,
            self.reliability.last_inspection,
        ]);
        for station in &self.stations {
            hasher.update(station.segment_length.to_le_bytes());
            hasher.update(station.segment_time.to_le_bytes());
        }
        hasher.finalize().into()
    }
}
