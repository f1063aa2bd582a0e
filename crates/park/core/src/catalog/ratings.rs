//! Declarative ratings description of a ride type.
//!
//! A [`RatingsDescriptor`] lists the modifiers applied, in order, to the base
//! ratings when a ride is calculated. Each modifier is a kind plus up to four
//! coefficients whose meaning depends on the kind: bonuses read them as
//! multipliers, requirements read `threshold` as the limit and the three
//! rating fields as divisors.

use crate::ride::RatingTuple;

/// How a ride type's ratings are produced.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RatingsCalcType {
    /// Needs a completed test run before ratings are known.
    #[default]
    Normal,
    /// Rated without a test run; marks itself tested.
    FlatRide,
    /// Rated on every pass whether or not a test run completed, without
    /// marking itself tested.
    Untested,
    /// Shops and facilities: upkeep only, no ratings.
    Stall,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ModifierKind {
    BonusLength,
    BonusSynchronisation,
    BonusTrainLength,
    BonusMaxSpeed,
    BonusAverageSpeed,
    BonusDuration,
    BonusGForces,
    BonusTurns,
    BonusDrops,
    BonusSheltered,
    BonusProximity,
    BonusScenery,
    BonusRotations,
    BonusOperationOption,
    BonusReversedTrains,
    BonusGoKartRace,
    BonusTowerRide,
    BonusRotoDrop,
    BonusMazeSize,
    BonusBoatHireNoCircuit,
    BonusSlideUnlimitedRides,
    BonusMotionSimulatorMode,
    Bonus3dCinemaMode,
    BonusTopSpinMode,
    BonusReversals,
    BonusHoles,
    BonusNumTrains,
    BonusDownwardLaunch,
    BonusLaunchedFreefallSpecial,
    RequirementLength,
    RequirementDropHeight,
    RequirementMaxSpeed,
    RequirementNumDrops,
    RequirementNegativeGs,
    RequirementLateralGs,
    RequirementInversions,
    RequirementUnsheltered,
    RequirementReversals,
    RequirementHoles,
    RequirementStations,
    RequirementSplashdown,
    PenaltyLateralGs,
}

impl ModifierKind {
    /// Requirements skipped when the ride has at least one inversion and its
    /// type relaxes them.
    pub const fn relaxed_by_inversions(self) -> bool {
        matches!(
            self,
            Self::RequirementDropHeight | Self::RequirementNegativeGs | Self::RequirementNumDrops
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingsModifier {
    pub kind: ModifierKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub threshold: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub excitement: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub intensity: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub nausea: i32,
}

impl RatingsModifier {
    pub const fn new(
        kind: ModifierKind,
        threshold: i32,
        excitement: i32,
        intensity: i32,
        nausea: i32,
    ) -> Self {
        Self {
            kind,
            threshold,
            excitement,
            intensity,
            nausea,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingsDescriptor {
    #[cfg_attr(feature = "serde", serde(default))]
    pub calc_type: RatingsCalcType,
    pub base: RatingTuple,
    /// Reliability lost per breakdown update before lift-speed adjustment.
    pub unreliability: u8,
    /// Fixed sheltered eighths, or `None` to derive them from the test run.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sheltered_eighths: Option<u8>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub relax_requirements_if_inversions: bool,
    pub modifiers: Vec<RatingsModifier>,
}

impl RatingsDescriptor {
    /// Descriptor for types that have no ratings at all.
    pub fn stall() -> Self {
        Self {
            calc_type: RatingsCalcType::Stall,
            base: RatingTuple::ZERO,
            unreliability: 0,
            sheltered_eighths: None,
            relax_requirements_if_inversions: false,
            modifiers: Vec::new(),
        }
    }
}
