//! Notifications raised by the simulation for the host to consume.

use crate::ride::{BreakdownKind, RatingTuple, RideStatus};

use super::{RideId, Tick};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum ParkEvent {
    StatusChanged {
        ride: RideId,
        from: RideStatus,
        to: RideStatus,
    },
    /// Riders and queuers were sent to the exits because the ride stopped.
    GuestsEvicted { ride: RideId },
    TrainsCreated { ride: RideId, count: u8 },
    TrainsRemoved { ride: RideId, count: u8 },
    RatingsCalculated { ride: RideId, ratings: RatingTuple },
    BreakdownPending { ride: RideId, kind: BreakdownKind },
    BrokenDown { ride: RideId, kind: BreakdownKind },
    BreakdownFixed { ride: RideId },
    InspectionDue { ride: RideId },
}

impl ParkEvent {
    pub fn ride(&self) -> RideId {
        match self {
            Self::StatusChanged { ride, .. }
            | Self::GuestsEvicted { ride }
            | Self::TrainsCreated { ride, .. }
            | Self::TrainsRemoved { ride, .. }
            | Self::RatingsCalculated { ride, .. }
            | Self::BreakdownPending { ride, .. }
            | Self::BrokenDown { ride, .. }
            | Self::BreakdownFixed { ride }
            | Self::InspectionDue { ride } => *ride,
        }
    }
}

/// Event stamped with the tick it was raised on.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParkEventRecord {
    pub tick: Tick,
    pub event: ParkEvent,
}

/// Append-only queue drained by the host once per frame.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    records: Vec<ParkEventRecord>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: Tick, event: ParkEvent) {
        self.records.push(ParkEventRecord { tick, event });
    }

    pub fn drain(&mut self) -> Vec<ParkEventRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParkEventRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
