//! Per-scan cursor and accumulators of the rating engine.

use bitflags::bitflags;

use crate::track::TrackElemType;
use crate::world::{RideId, TileCoordsXYZ};

/// Step the scan of one update slot performs next.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum RatingState {
    /// Idle: looking for the next ride to rate.
    #[default]
    FindNextRide,
    Initialise,
    ScanForward,
    Calculate,
    ScanBackwardInit,
    ScanBackward,
}

/// Adjacency category tallied by the proximity scorer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum ProximityCategory {
    WaterOver,
    WaterTouch,
    WaterLow,
    WaterHigh,
    SurfaceTouch,
    QueuePathOver,
    QueuePathTouchAbove,
    QueuePathTouchUnder,
    PathTouchAbove,
    PathTouchUnder,
    OwnTrackTouchAbove,
    OwnTrackCloseAbove,
    ForeignTrackAboveOrBelow,
    ForeignTrackTouchAbove,
    ForeignTrackCloseAbove,
    ScenerySideBelow,
    ScenerySideAbove,
    OwnStationTouchAbove,
    OwnStationCloseAbove,
    TrackThroughVerticalLoop,
    PathThroughVerticalLoop,
    IntersectingVerticalLoop,
    ThroughVerticalLoop,
    PathSideClose,
    ForeignTrackSideClose,
    SurfaceSideClose,
}

impl ProximityCategory {
    pub const COUNT: usize = 26;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ScanFlags: u8 {
        /// The station being passed has no entrance; scoring is suppressed.
        const NO_ENTRANCE = 1 << 0;
    }
}

/// Cursor and accumulators of one in-progress rating pass.
///
/// Never persisted. A freshly loaded world starts every slot idle.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RatingUpdateState {
    pub state: RatingState,
    /// Ride being scanned; while idle, the ride the search resumes after.
    pub current_ride: Option<RideId>,
    /// Origin of the piece the scan visits next.
    pub proximity: TileCoordsXYZ,
    /// Piece type expected at `proximity`, `None` to accept any.
    pub proximity_track_type: Option<TrackElemType>,
    /// Where the scan started; reaching it again closes the circuit.
    pub proximity_start: TileCoordsXYZ,
    /// Terrain height last seen under the cursor.
    pub proximity_base_height: i32,
    pub proximity_total: u16,
    pub proximity_scores: [u16; ProximityCategory::COUNT],
    pub num_brakes: u16,
    pub num_reversers: u16,
    pub station_flags: ScanFlags,
}

impl RatingUpdateState {
    /// Slot that will rate `ride` from scratch on its next step.
    pub fn for_ride(ride: RideId) -> Self {
        Self {
            state: RatingState::Initialise,
            current_ride: Some(ride),
            ..Self::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == RatingState::FindNextRide
    }

    /// True when this slot is actively scanning `ride`.
    pub fn is_scanning(&self, ride: RideId) -> bool {
        !self.is_idle() && self.current_ride == Some(ride)
    }

    pub fn score(&self, category: ProximityCategory) -> u16 {
        self.proximity_scores[category.index()]
    }

    pub fn increment(&mut self, category: ProximityCategory) {
        let slot = &mut self.proximity_scores[category.index()];
        *slot = slot.saturating_add(1);
    }

    /// Clears the accumulators before a new pass.
    pub fn reset_scores(&mut self) {
        self.proximity_total = 0;
        self.proximity_scores = [0; ProximityCategory::COUNT];
        self.num_brakes = 0;
        self.num_reversers = 0;
        self.station_flags = ScanFlags::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_category_has_a_slot() {
        assert_eq!(ProximityCategory::iter().count(), ProximityCategory::COUNT);
        assert_eq!(ProximityCategory::SurfaceSideClose.index(), ProximityCategory::COUNT - 1);
    }

    #[test]
    fn idle_slots_scan_nothing() {
        let mut slot = RatingUpdateState::default();
        slot.current_ride = Some(RideId(2));
        assert!(slot.is_idle());
        assert!(!slot.is_scanning(RideId(2)));

        let slot = RatingUpdateState::for_ride(RideId(2));
        assert!(slot.is_scanning(RideId(2)));
        assert!(!slot.is_scanning(RideId(3)));
    }

    #[test]
    fn reset_clears_scores_and_counters() {
        let mut slot = RatingUpdateState::for_ride(RideId(0));
        slot.increment(ProximityCategory::WaterTouch);
        slot.increment(ProximityCategory::WaterTouch);
        slot.num_brakes = 3;
        slot.station_flags = ScanFlags::NO_ENTRANCE;
        assert_eq!(slot.score(ProximityCategory::WaterTouch), 2);

        slot.reset_scores();
        assert_eq!(slot.score(ProximityCategory::WaterTouch), 0);
        assert_eq!(slot.num_brakes, 0);
        assert!(slot.station_flags.is_empty());
        assert_eq!(slot.state, RatingState::Initialise);
    }
}
