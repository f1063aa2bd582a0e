use bitflags::bitflags;

use crate::ride::{BreakdownKind, RideMode, RideType};

use super::RatingsDescriptor;

bitflags! {
    /// Static properties of a ride type.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct RideTypeFlags: u32 {
        /// Track is built piece by piece.
        const HAS_TRACK = 1 << 0;
        /// Single fixed base, no track to construct.
        const FLAT_RIDE = 1 << 1;
        /// Shop or facility: no entrance/exit, no ratings.
        const SHOP = 1 << 2;
        const MAZE = 1 << 3;
        const NO_VEHICLES = 1 << 4;
        const HAS_AIR_TIME = 1 << 5;
        const ALLOW_CABLE_LIFT_HILL = 1 << 6;
        const ALLOW_MORE_VEHICLES_THAN_STATION_FITS = 1 << 7;
        /// Needs a complete circuit whatever the operating mode.
        const AIR_POWERED = 1 << 8;
        /// Track length counts towards upkeep.
        const RUNNING_TRACK = 1 << 9;
    }
}

/// Which special elements the turn sub-rating rewards.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpecialElementRating {
    /// Splashes, waterfalls and whirlpools.
    #[default]
    Water,
    /// Spinning tunnels.
    GhostTrain,
    /// Flume reversers.
    LogFlume,
}

/// Weights applied to the ratings when computing ride value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingsMultipliers {
    pub excitement: i32,
    pub intensity: i32,
    pub nausea: i32,
}

impl RatingsMultipliers {
    pub const fn new(excitement: i32, intensity: i32, nausea: i32) -> Self {
        Self {
            excitement,
            intensity,
            nausea,
        }
    }
}

/// Running cost components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UpkeepCosts {
    pub base: u16,
    /// Charged per powered lift.
    pub track_piece: u16,
    pub per_train: u16,
    /// Charged per car when the type charges for train length.
    pub per_car: u16,
    pub per_station: u16,
    /// Charged per reverser piece found by the proximity scan.
    pub per_reverser: u16,
}

impl UpkeepCosts {
    pub const DEFAULT_PER_REVERSER: u16 = 80;
    pub const PER_BRAKE: u16 = 20;
    pub const ON_RIDE_PHOTO: u16 = 40;
}

impl Default for UpkeepCosts {
    fn default() -> Self {
        Self {
            base: 50,
            track_piece: 0,
            per_train: 0,
            per_car: 0,
            per_station: 0,
            per_reverser: Self::DEFAULT_PER_REVERSER,
        }
    }
}

/// Chain lift speed range in mph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LiftSpeeds {
    pub min: u8,
    pub max: u8,
}

impl Default for LiftSpeeds {
    fn default() -> Self {
        Self { min: 5, max: 5 }
    }
}

/// Everything the simulation knows about a ride type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RideTypeDescriptor {
    pub ride_type: RideType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: RideTypeFlags,
    /// Operating modes the type supports. The first is the default.
    pub modes: Vec<RideMode>,
    pub ratings: RatingsDescriptor,
    pub value_multipliers: RatingsMultipliers,
    #[cfg_attr(feature = "serde", serde(default))]
    pub upkeep: UpkeepCosts,
    #[cfg_attr(feature = "serde", serde(default))]
    pub lift: LiftSpeeds,
    /// Bit set of [`BreakdownKind::bit`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub available_breakdowns: u8,
    /// Heaviest train a station accepts, in 1/256 units of car friction.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_mass: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub special_elements: SpecialElementRating,
}

impl RideTypeDescriptor {
    #[inline]
    pub fn has_flag(&self, flag: RideTypeFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn default_mode(&self) -> RideMode {
        self.modes.first().copied().unwrap_or_default()
    }

    pub fn supports_mode(&self, mode: RideMode) -> bool {
        self.modes.contains(&mode)
    }

    pub fn can_break_down(&self, kind: BreakdownKind) -> bool {
        self.available_breakdowns & kind.bit() != 0
    }

    /// Breakdown kinds this type can suffer, in mask order.
    pub fn breakdowns(&self) -> impl Iterator<Item = BreakdownKind> + '_ {
        BreakdownKind::ALL
            .into_iter()
            .filter(|kind| self.can_break_down(*kind))
    }
}

/// Builds an available-breakdowns mask.
pub const fn breakdown_mask(kinds: &[BreakdownKind]) -> u8 {
    let mut mask = 0;
    let mut index = 0;
    while index < kinds.len() {
        mask |= kinds[index].bit();
        index += 1;
    }
    mask
}
