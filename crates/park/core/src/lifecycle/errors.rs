use core::fmt;

use crate::env::OracleError;
use crate::error::{ErrorSeverity, ParkError};
use crate::world::{RideId, TileCoordsXYZ};

/// Why a ride may not be tested or opened.
///
/// `Display` is the message shown to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ValidationError {
    #[error("Requires a station platform")]
    RequiresStationPlatform,

    #[error("Not yet constructed!")]
    NotYetConstructed,

    #[error("Unable to operate with more than one station in this mode")]
    MoreThanOneStation,

    #[error("Unable to operate with less than two stations in this mode")]
    LessThanTwoStations,

    #[error("Entrance not yet built")]
    EntranceNotYetBuilt,

    #[error("Exit not yet built")]
    ExitNotYetBuilt,

    #[error("Track is not a complete circuit")]
    TrackNotCompleteCircuit,

    #[error("Block brakes cannot be used directly after station")]
    BlockBrakesAfterStation,

    #[error("Block brakes cannot be used directly after each other")]
    BlockBrakesAfterEachOther,

    #[error("Block brakes cannot be used directly after the top of this lift hill")]
    BlockBrakesAfterLiftHill,

    #[error("Track unsuitable for type of train")]
    TrackUnsuitableForTrain,

    #[error("Ride must start and end with stations")]
    MustStartAndEndWithStations,

    #[error("Station not long enough")]
    StationNotLongEnough,

    #[error("Not enough space for trains")]
    NotEnoughSpaceForTrains,

    #[error("Unable to create enough vehicles")]
    UnableToCreateEnoughVehicles,

    #[error("Cable lift unable to work in this operating mode")]
    CableLiftUnsupportedMode,

    #[error("Multi-circuit not possible with cable lift hill")]
    CableLiftMultiCircuit,

    #[error("Cable lift hill must start immediately after station")]
    CableLiftNotAfterStation,
}

impl ParkError for ValidationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use ValidationError::*;
        match self {
            RequiresStationPlatform => "REQUIRES_A_STATION_PLATFORM",
            NotYetConstructed => "NOT_YET_CONSTRUCTED",
            MoreThanOneStation => "MORE_THAN_ONE_STATION",
            LessThanTwoStations => "LESS_THAN_TWO_STATIONS",
            EntranceNotYetBuilt => "ENTRANCE_NOT_YET_BUILT",
            ExitNotYetBuilt => "EXIT_NOT_YET_BUILT",
            TrackNotCompleteCircuit => "TRACK_NOT_COMPLETE_CIRCUIT",
            BlockBrakesAfterStation => "BLOCK_BRAKES_AFTER_STATION",
            BlockBrakesAfterEachOther => "BLOCK_BRAKES_AFTER_EACH_OTHER",
            BlockBrakesAfterLiftHill => "BLOCK_BRAKES_AFTER_LIFT_HILL",
            TrackUnsuitableForTrain => "TRACK_UNSUITABLE_FOR_TRAIN",
            MustStartAndEndWithStations => "MUST_START_AND_END_WITH_STATIONS",
            StationNotLongEnough => "STATION_NOT_LONG_ENOUGH",
            NotEnoughSpaceForTrains => "NOT_ENOUGH_SPACE_FOR_TRAINS",
            UnableToCreateEnoughVehicles => "UNABLE_TO_CREATE_ENOUGH_VEHICLES",
            CableLiftUnsupportedMode => "CABLE_LIFT_UNSUPPORTED_MODE",
            CableLiftMultiCircuit => "CABLE_LIFT_MULTI_CIRCUIT",
            CableLiftNotAfterStation => "CABLE_LIFT_NOT_AFTER_STATION",
        }
    }
}

/// A failed check: the reason and the tile the player should be shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{reason}")]
pub struct ValidationFailure {
    pub reason: ValidationError,
    pub tile: Option<TileCoordsXYZ>,
}

impl ValidationFailure {
    pub const fn new(reason: ValidationError) -> Self {
        Self { reason, tile: None }
    }

    pub const fn at(reason: ValidationError, tile: TileCoordsXYZ) -> Self {
        Self {
            reason,
            tile: Some(tile),
        }
    }
}

impl From<ValidationError> for ValidationFailure {
    fn from(reason: ValidationError) -> Self {
        Self::new(reason)
    }
}

/// Identifies which stage of a status transition produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PreValidate => "pre-validate",
            Self::Apply => "apply",
            Self::PostValidate => "post-validate",
        }
    }
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by [`set_ride_status`](super::set_ride_status).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("ride {0} does not exist")]
    RideNotFound(RideId),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// A validator check failed. Nothing was changed.
    #[error("{reason}")]
    Rejected {
        ride: RideId,
        reason: ValidationError,
        tile: Option<TileCoordsXYZ>,
        phase: TransitionPhase,
    },

    /// The ride did not end up in the state the transition promised.
    #[error("ride {ride} is inconsistent after {phase}: {detail}")]
    Inconsistent {
        ride: RideId,
        phase: TransitionPhase,
        detail: &'static str,
    },
}

impl StatusError {
    pub(crate) fn rejected(ride: RideId, failure: ValidationFailure) -> Self {
        Self::Rejected {
            ride,
            reason: failure.reason,
            tile: failure.tile,
            phase: TransitionPhase::PreValidate,
        }
    }

    /// The validator failure, if this is one.
    pub fn reason(&self) -> Option<ValidationError> {
        match self {
            Self::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Tile the player should be shown.
    pub fn tile(&self) -> Option<TileCoordsXYZ> {
        match self {
            Self::Rejected { tile, .. } => *tile,
            _ => None,
        }
    }

    pub fn phase(&self) -> Option<TransitionPhase> {
        match self {
            Self::Rejected { phase, .. } | Self::Inconsistent { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

impl ParkError for StatusError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RideNotFound(_) | Self::Rejected { .. } => ErrorSeverity::Validation,
            Self::Oracle(error) => error.severity(),
            Self::Inconsistent { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::RideNotFound(_) => "STATUS_RIDE_NOT_FOUND",
            Self::Oracle(error) => error.error_code(),
            Self::Rejected { reason, .. } => reason.error_code(),
            Self::Inconsistent { .. } => "STATUS_INCONSISTENT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_displays_the_player_message() {
        let error = StatusError::rejected(
            RideId(2),
            ValidationFailure::at(ValidationError::ExitNotYetBuilt, TileCoordsXYZ::new(4, 8, 2)),
        );
        assert_eq!(error.to_string(), "Exit not yet built");
        assert_eq!(error.error_code(), "EXIT_NOT_YET_BUILT");
        assert_eq!(error.severity(), ErrorSeverity::Validation);
        assert_eq!(error.phase(), Some(TransitionPhase::PreValidate));
        assert_eq!(error.tile(), Some(TileCoordsXYZ::new(4, 8, 2)));
    }

    #[test]
    fn inconsistencies_are_internal() {
        let error = StatusError::Inconsistent {
            ride: RideId(0),
            phase: TransitionPhase::PostValidate,
            detail: "trains missing",
        };
        assert!(error.severity().is_internal());
        assert_eq!(
            error.to_string(),
            "ride #0 is inconsistent after post-validate: trains missing"
        );
    }
}
