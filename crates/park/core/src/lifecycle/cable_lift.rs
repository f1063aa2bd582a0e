//! Cable lift hills: placement checks and the lift train itself.

use tracing::debug;

use crate::catalog::{RideTypeDescriptor, RideTypeFlags};
use crate::ride::{LifecycleFlags, Ride, RideMode};
use crate::track::{TrackElemType, TrackGraph, TrackPiece};
use crate::world::{RideId, TileCoordsXYZ, TrainId, World};

use super::{ValidationError, ValidationFailure};

/// Cars in a cable lift train.
pub const CABLE_LIFT_SEGMENTS: u8 = 5;

/// Whether `ride` needs a cable lift built before it can run.
pub fn needs_cable_lift(ride: &Ride, descriptor: &RideTypeDescriptor) -> bool {
    descriptor.has_flag(RideTypeFlags::ALLOW_CABLE_LIFT_HILL)
        && ride
            .lifecycle_flags
            .contains(LifecycleFlags::CABLE_LIFT_HILL_COMPONENT_USED)
        && !ride.lifecycle_flags.contains(LifecycleFlags::CABLE_LIFT)
}

fn climbs_to_hill(track_type: TrackElemType) -> bool {
    use TrackElemType::*;
    matches!(
        track_type,
        Flat | Up25 | Up60 | FlatToUp25 | Up25ToFlat | Up25ToUp60 | Up60ToUp25
    )
}

/// Checks the cable lift of `ride` can be built.
///
/// Walks backwards from `origin` to the cable lift hill, then on to the
/// station; only climbing pieces may sit between the two. Returns the tile
/// where the lift train starts.
pub fn check_cable_lift<G: TrackGraph + ?Sized>(
    graph: &G,
    ride: &Ride,
    origin: TrackPiece,
    free_car_slots: usize,
    step_limit: usize,
) -> Result<TileCoordsXYZ, ValidationFailure> {
    if !matches!(
        ride.mode,
        RideMode::ContinuousCircuit | RideMode::ContinuousCircuitBlockSectioned
    ) {
        return Err(ValidationError::CableLiftUnsupportedMode.into());
    }
    if ride.num_circuits > 1 {
        return Err(ValidationError::CableLiftMultiCircuit.into());
    }
    if free_car_slots <= CABLE_LIFT_SEGMENTS as usize {
        return Err(ValidationError::UnableToCreateEnoughVehicles.into());
    }

    let mut hill_base: Option<TrackPiece> = None;
    let mut piece = origin;
    for _ in 0..step_limit {
        piece = match graph.previous_piece(&piece) {
            Some(previous) if !previous.is_same_piece(&origin) => previous,
            _ => break,
        };
        match hill_base {
            None if piece.track_type == TrackElemType::CableLiftHill => hill_base = Some(piece),
            None => {}
            Some(_) if piece.track_type == TrackElemType::EndStation => break,
            Some(_) if climbs_to_hill(piece.track_type) => hill_base = Some(piece),
            Some(_) => {
                return Err(ValidationFailure::at(
                    ValidationError::CableLiftNotAfterStation,
                    piece.origin,
                ));
            }
        }
    }
    hill_base
        .map(|base| base.origin)
        .ok_or_else(|| ValidationError::CableLiftNotAfterStation.into())
}

/// Places the cable lift train of `id` at `location`.
pub fn create_cable_lift(world: &mut World, id: RideId, location: TileCoordsXYZ) -> Option<TrainId> {
    let train = world.trains.create(id, CABLE_LIFT_SEGMENTS, location)?;
    match world.rides.get_mut(id) {
        Some(ride) => {
            ride.cable_lift = Some(train);
            ride.lifecycle_flags |= LifecycleFlags::CABLE_LIFT;
            debug!("ride {} cable lift placed at {:?}", id, location);
            Some(train)
        }
        None => {
            world.trains.remove(train);
            None
        }
    }
}
