//! Checks a ride must pass before it may be tested or opened.
//!
//! Each check is a free function that reports the first problem it finds and
//! the tile the player should be shown. [`validate_track`] runs the structural
//! checks in order and stops at the first failure.

use crate::catalog::{RideEntry, RideEntryFlags, RideTypeDescriptor, RideTypeFlags};
use crate::config::SimConfig;
use crate::ride::{Ride, RideMode, RideStatus, RideType};
use crate::track::{
    CircuitIterator, TrackElemType, TrackFlags, TrackGraph, TrackPiece, find_gap, track_back,
    track_front,
};

use super::{ValidationError, ValidationFailure};

pub type CheckResult = Result<(), ValidationFailure>;

/// At least one station slot must be in use.
pub fn check_station_present(ride: &Ride, descriptor: &RideTypeDescriptor) -> CheckResult {
    if ride.first_station().is_some() {
        return Ok(());
    }
    if !descriptor.has_flag(RideTypeFlags::HAS_TRACK) || descriptor.has_flag(RideTypeFlags::MAZE) {
        return Err(ValidationError::NotYetConstructed.into());
    }
    Err(ValidationError::RequiresStationPlatform.into())
}

/// Station count rules of the operating mode.
pub fn check_station_count(ride: &Ride) -> CheckResult {
    let stations = ride.num_stations();
    let single_station_type = matches!(ride.ride_type, RideType::GoKarts | RideType::MiniGolf);
    if (ride.mode.is_launch() || single_station_type) && stations > 1 {
        return Err(ValidationError::MoreThanOneStation.into());
    }
    if ride.mode == RideMode::Shuttle && stations < 2 {
        return Err(ValidationError::LessThanTwoStations.into());
    }
    Ok(())
}

/// Every station needs an entrance and an exit. Shops need neither.
///
/// Missing entrances are reported before missing exits.
pub fn check_entrance_exit(ride: &Ride, descriptor: &RideTypeDescriptor) -> CheckResult {
    if descriptor.has_flag(RideTypeFlags::SHOP) {
        return Ok(());
    }
    let missing = |reason, lacks: fn(&crate::ride::Station) -> bool| {
        ride.populated_stations()
            .find(|(_, station)| lacks(station))
            .and_then(|(_, station)| station.start_location())
            .map(|tile| ValidationFailure::at(reason, tile))
    };
    if let Some(failure) = missing(ValidationError::EntranceNotYetBuilt, |station| {
        station.entrance.is_none()
    }) {
        return Err(failure);
    }
    if let Some(failure) = missing(ValidationError::ExitNotYetBuilt, |station| {
        station.exit.is_none()
    }) {
        return Err(failure);
    }
    Ok(())
}

/// Origin piece at the first station's start tile.
pub fn find_origin<G: TrackGraph + ?Sized>(graph: &G, ride: &Ride) -> Option<TrackPiece> {
    let (_, station) = ride.first_station()?;
    graph.piece_at(station.start_location()?, ride.id)
}

/// Whether the circuit must be closed for `target`.
pub fn requires_circuit(
    ride: &Ride,
    descriptor: &RideTypeDescriptor,
    target: RideStatus,
    config: &SimConfig,
) -> bool {
    let opening = target == RideStatus::Open;
    let needed = descriptor.has_flag(RideTypeFlags::AIR_POWERED)
        || ride.mode.requires_circuit()
        || (opening && ride.mode == RideMode::Race);
    if !needed {
        return false;
    }
    opening || !config.test_unfinished_tracks || ride.is_block_sectioned()
}

/// The forward walk from `origin` must come back to it.
pub fn check_circuit<G: TrackGraph + ?Sized>(graph: &G, origin: TrackPiece) -> CheckResult {
    match find_gap(graph, origin) {
        Some(gap) => Err(ValidationFailure::at(
            ValidationError::TrackNotCompleteCircuit,
            gap.origin,
        )),
        None => Ok(()),
    }
}

/// Block brakes may not follow a station, another block brake or the top of
/// a chain lift (curved lift hills excepted).
pub fn check_block_brakes<G: TrackGraph + ?Sized>(graph: &G, origin: TrackPiece) -> CheckResult {
    let mut it = CircuitIterator::new(graph, origin);
    while it.advance() {
        let current = it.current();
        if current.track_type != TrackElemType::BlockBrakes {
            continue;
        }
        let previous = CircuitIterator::last(&it);
        let reason = match previous.track_type {
            TrackElemType::EndStation => Some(ValidationError::BlockBrakesAfterStation),
            TrackElemType::BlockBrakes => Some(ValidationError::BlockBrakesAfterEachOther),
            track_type
                if previous.has_chain && !track_type.has_flag(TrackFlags::CURVED_LIFT_HILL) =>
            {
                Some(ValidationError::BlockBrakesAfterLiftHill)
            }
            _ => None,
        };
        if let Some(reason) = reason {
            return Err(ValidationFailure::at(reason, current.origin));
        }
    }
    if !it.looped() {
        return Err(ValidationFailure::at(
            ValidationError::BlockBrakesAfterStation,
            CircuitIterator::last(&it).origin,
        ));
    }
    Ok(())
}

/// Trains of `entry` must be able to ride every piece of the circuit.
pub fn check_vehicle_compatibility<G: TrackGraph + ?Sized>(
    graph: &G,
    origin: TrackPiece,
    entry: &RideEntry,
) -> CheckResult {
    let mut forbidden = TrackFlags::empty();
    if entry.has_flag(RideEntryFlags::NO_INVERSIONS) {
        forbidden |= TrackFlags::INVERSION;
    }
    if entry.has_flag(RideEntryFlags::NO_BANKED_TRACK) {
        forbidden |= TrackFlags::BANKED;
    }
    if forbidden.is_empty() {
        return Ok(());
    }
    match CircuitIterator::new(graph, origin)
        .find(|piece| piece.track_type.flags().intersects(forbidden))
    {
        Some(piece) => Err(ValidationFailure::at(
            ValidationError::TrackUnsuitableForTrain,
            piece.origin,
        )),
        None => Ok(()),
    }
}

/// Every run of station pieces must be at least two pieces long.
///
/// A short run inside the track is reported at the piece after it; a short
/// run at the very end is reported at its station piece.
pub fn check_station_length<G: TrackGraph + ?Sized>(
    graph: &G,
    origin: TrackPiece,
    step_limit: usize,
) -> CheckResult {
    let first = track_back(graph, origin, step_limit);
    let mut piece = first;
    let mut run = 0usize;
    let mut last_station = first;
    for _ in 0..step_limit {
        if piece.track_type.is_station() {
            run += 1;
            last_station = piece;
        } else if run == 1 {
            return Err(ValidationFailure::at(
                ValidationError::StationNotLongEnough,
                piece.origin,
            ));
        } else {
            run = 0;
        }
        match graph.next_piece(&piece) {
            Some(next) if !next.is_same_piece(&first) => piece = next,
            _ => break,
        }
    }
    if run == 1 {
        return Err(ValidationFailure::at(
            ValidationError::StationNotLongEnough,
            last_station.origin,
        ));
    }
    Ok(())
}

/// Station-to-station track is open and has a long enough station at each end.
pub fn check_station_to_station<G: TrackGraph + ?Sized>(
    graph: &G,
    origin: TrackPiece,
    step_limit: usize,
) -> CheckResult {
    if find_gap(graph, origin).is_none() {
        return Err(ValidationFailure::at(
            ValidationError::MustStartAndEndWithStations,
            origin.origin,
        ));
    }
    check_station_length(graph, origin, step_limit)?;
    for end in [
        track_back(graph, origin, step_limit),
        track_front(graph, origin, step_limit),
    ] {
        if !end.track_type.is_station() {
            return Err(ValidationFailure::at(
                ValidationError::MustStartAndEndWithStations,
                end.origin,
            ));
        }
    }
    Ok(())
}

/// Structural checks for testing or opening `ride`, in order.
///
/// Returns the origin piece the status machine starts from, or `None` for
/// rides without one (mazes).
pub fn validate_track<G: TrackGraph + ?Sized>(
    graph: &G,
    ride: &Ride,
    descriptor: &RideTypeDescriptor,
    entry: Option<&RideEntry>,
    target: RideStatus,
    config: &SimConfig,
) -> Result<Option<TrackPiece>, ValidationFailure> {
    check_station_present(ride, descriptor)?;
    check_station_count(ride)?;
    check_entrance_exit(ride, descriptor)?;

    let origin = match find_origin(graph, ride) {
        Some(origin) => origin,
        None if descriptor.has_flag(RideTypeFlags::MAZE) => return Ok(None),
        None => {
            let tile = ride
                .first_station()
                .and_then(|(_, station)| station.start_location());
            return Err(ValidationFailure {
                reason: ValidationError::NotYetConstructed,
                tile,
            });
        }
    };

    if requires_circuit(ride, descriptor, target, config) {
        check_circuit(graph, origin)?;
    }
    if ride.is_block_sectioned() {
        check_block_brakes(graph, origin)?;
    }
    if let Some(entry) = entry {
        check_vehicle_compatibility(graph, origin, entry)?;
    }
    if ride.mode == RideMode::StationToStation {
        check_station_to_station(graph, origin, config.scan_step_limit)?;
    }
    Ok(Some(origin))
}
