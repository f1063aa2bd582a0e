//! Train sizing, creation and removal.

use tracing::{debug, warn};

use crate::catalog::{RideEntry, RideTypeDescriptor, RideTypeFlags};
use crate::config::SimConfig;
use crate::ride::{LifecycleFlags, Ride, RideMode, Station};
use crate::track::{CircuitIterator, TrackGraph, TrackPiece};
use crate::world::{ParkEvent, RideId, World};

/// Usable length of a station `tiles` long, in car spacing units.
fn station_capacity(tiles: u8) -> i64 {
    tiles as i64 * 0x44180 - 0x16B2A
}

/// Most trains the sizing will ever allow.
const MAX_SIZED_TRAINS: u8 = 31;

/// Train limits and the sizes the ride will actually run with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VehicleSizing {
    pub max_trains: u8,
    pub min_cars: u8,
    pub max_cars: u8,
    pub num_trains: u8,
    pub num_cars: u8,
}

impl VehicleSizing {
    /// Cars the sized trains need.
    pub fn cars_needed(&self) -> usize {
        self.num_trains as usize * self.num_cars as usize
    }

    /// Writes the sizing into `ride`. Returns whether anything changed.
    pub fn apply_to(&self, ride: &mut Ride) -> bool {
        let before = (
            ride.max_trains,
            ride.min_cars_per_train,
            ride.max_cars_per_train,
            ride.num_trains,
            ride.num_cars_per_train,
        );
        ride.max_trains = self.max_trains;
        ride.min_cars_per_train = self.min_cars;
        ride.max_cars_per_train = self.max_cars;
        ride.num_trains = self.num_trains;
        ride.num_cars_per_train = self.num_cars;
        before
            != (
                self.max_trains,
                self.min_cars,
                self.max_cars,
                self.num_trains,
                self.num_cars,
            )
    }
}

/// Sum of piece lengths around the circuit from `origin`.
fn circuit_length<G: TrackGraph + ?Sized>(graph: &G, origin: TrackPiece) -> i64 {
    CircuitIterator::new(graph, origin)
        .map(|piece| piece.track_type.def().length as i64)
        .sum()
}

/// Trains that fit in the station by length alone.
fn trains_fitting_station(entry: &RideEntry, cars: u8, capacity: i64) -> u8 {
    let train_length = entry.train_spacing(cars) as i64;
    if train_length == 0 {
        return MAX_SIZED_TRAINS;
    }
    let mut total = train_length / 2;
    if cars != 1 {
        total /= 2;
    }
    let mut trains = 0u8;
    loop {
        trains = trains.saturating_add(1);
        total += train_length;
        if total > capacity || trains == u8::MAX {
            break;
        }
    }
    trains
}

/// Trains a circuit can hold when the type allows more than the station fits.
fn trains_fitting_track(entry: &RideEntry, cars: u8, track_length: i64) -> u8 {
    let spacing = (entry.train_spacing(cars) >> 13) as i64;
    let speed = entry.car.powered_max_speed;
    let mut length = track_length / 4;
    for threshold in [10, 25, 40] {
        if speed > threshold {
            length = length * 3 / 4;
        }
    }
    let mut trains = 0u8;
    let mut covered = 0i64;
    loop {
        trains += 1;
        covered += spacing;
        if trains >= MAX_SIZED_TRAINS || covered >= length {
            break;
        }
    }
    trains
}

/// Train limits for `ride` from its stations, mode and vehicle entry.
///
/// Returns `None` when the ride has no station to size against.
pub fn compute_vehicle_sizing<G: TrackGraph + ?Sized>(
    ride: &Ride,
    entry: &RideEntry,
    descriptor: &RideTypeDescriptor,
    graph: &G,
    origin: Option<TrackPiece>,
    config: &SimConfig,
) -> Option<VehicleSizing> {
    let min_cars = entry.min_cars_per_train;
    let max_cars_entry = entry.max_cars_per_train;

    if descriptor.has_flag(RideTypeFlags::FLAT_RIDE) {
        let units = entry.cars_per_flat_ride.unwrap_or(1);
        let limit = if config.disable_train_length_limit {
            MAX_SIZED_TRAINS
        } else {
            units
        };
        return Some(VehicleSizing {
            max_trains: units,
            min_cars,
            max_cars: max_cars_entry,
            num_trains: ride.proposed_num_trains.min(limit),
            num_cars: max_cars_entry,
        });
    }

    let shortest = ride
        .populated_stations()
        .map(|(_, station)| station.length)
        .min()?;
    let capacity = station_capacity(shortest);
    let max_friction = (descriptor.max_mass as u32) << 8;

    let mut max_cars = (1..=max_cars_entry)
        .rev()
        .find(|cars| {
            (entry.train_spacing(*cars) as i64) <= capacity
                && entry.train_friction(*cars) <= max_friction
        })
        .unwrap_or(1);

    let mut new_cars = ride.proposed_num_cars_per_train.max(min_cars);
    max_cars = max_cars.max(min_cars);
    if !config.disable_train_length_limit {
        new_cars = new_cars.min(max_cars);
    }

    let mut max_trains = match ride.mode {
        mode if mode.is_block_sectioned() => {
            let points = ride.num_stations() as i64 + ride.num_block_brakes as i64 - 1;
            points.clamp(1, MAX_SIZED_TRAINS as i64) as u8
        }
        RideMode::ReverseInclineLaunchedShuttle
        | RideMode::PoweredLaunchPasstrough
        | RideMode::Shuttle
        | RideMode::LimPoweredLaunch
        | RideMode::PoweredLaunch => 1,
        mode => {
            let fits_station = trains_fitting_station(entry, new_cars, capacity);
            let beyond_station = matches!(
                mode,
                RideMode::StationToStation | RideMode::ContinuousCircuit
            ) && descriptor.has_flag(RideTypeFlags::ALLOW_MORE_VEHICLES_THAN_STATION_FITS);
            match (beyond_station, origin) {
                (true, Some(origin)) => {
                    trains_fitting_track(entry, new_cars, circuit_length(graph, origin))
                }
                _ => fits_station.min(MAX_SIZED_TRAINS),
            }
        }
    };
    let stored_max_trains = max_trains;
    if config.disable_train_length_limit {
        max_trains = MAX_SIZED_TRAINS;
    }

    Some(VehicleSizing {
        max_trains: stored_max_trains,
        min_cars,
        max_cars,
        num_trains: ride.proposed_num_trains.min(max_trains),
        num_cars: new_cars,
    })
}

/// Recomputes and stores the train limits of `ride`.
///
/// Returns whether any limit or size changed.
pub fn update_max_vehicles<G: TrackGraph + ?Sized>(
    ride: &mut Ride,
    entry: &RideEntry,
    descriptor: &RideTypeDescriptor,
    graph: &G,
    origin: Option<TrackPiece>,
    config: &SimConfig,
) -> bool {
    match compute_vehicle_sizing(ride, entry, descriptor, graph, origin, config) {
        Some(sizing) => sizing.apply_to(ride),
        None => false,
    }
}

/// Places `ride.num_trains` trains at the first station.
///
/// Returns the number created. Stops early when the vehicle pool runs out.
pub fn create_trains(world: &mut World, id: RideId) -> u8 {
    let Some(ride) = world.rides.get_mut(id) else {
        return 0;
    };
    let Some(location) = ride
        .first_station()
        .and_then(|(_, station)| station.start_location())
    else {
        return 0;
    };
    let mut created = 0u8;
    for _ in 0..ride.num_trains {
        let Some(train) = world
            .trains
            .create(id, ride.num_cars_per_train, location)
        else {
            warn!(
                "ride {} ran out of vehicle slots after {} trains",
                id, created
            );
            break;
        };
        if ride.trains.try_push(train).is_err() {
            world.trains.remove(train);
            break;
        }
        created += 1;
    }
    ride.lifecycle_flags |= LifecycleFlags::ON_TRACK;
    for station in ride.stations.iter_mut().filter(|station| station.is_populated()) {
        station.depart = (station.depart & Station::DEPART_FLAG) | 1;
    }
    debug!("ride {} placed {} trains", id, created);
    world.emit(ParkEvent::TrainsCreated { ride: id, count: created });
    created
}

/// Removes every train and the cable lift of a ride.
///
/// Returns the number of trains removed, the cable lift included.
pub fn remove_trains(world: &mut World, id: RideId) -> u8 {
    let Some(ride) = world.rides.get_mut(id) else {
        return 0;
    };
    let mut removed = 0u8;
    for train in ride.trains.drain(..) {
        if world.trains.remove(train).is_some() {
            removed = removed.saturating_add(1);
        }
    }
    if let Some(cable_lift) = ride.cable_lift.take() {
        if world.trains.remove(cable_lift).is_some() {
            removed = removed.saturating_add(1);
        }
    }
    ride.lifecycle_flags.remove(
        LifecycleFlags::ON_TRACK
            | LifecycleFlags::TEST_IN_PROGRESS
            | LifecycleFlags::CABLE_LIFT
            | LifecycleFlags::BREAKDOWN_PENDING
            | LifecycleFlags::BROKEN_DOWN
            | LifecycleFlags::DUE_INSPECTION,
    );
    if removed > 0 {
        debug!("ride {} removed {} trains", id, removed);
        world.emit(ParkEvent::TrainsRemoved { ride: id, count: removed });
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RideCatalog;
    use crate::env::CatalogOracle;
    use crate::ride::RideType;
    use crate::world::{TileCoordsXYZ, TileMap};

    fn coaster() -> (RideTypeDescriptor, RideEntry) {
        let catalog = RideCatalog::builtin();
        (
            catalog
                .descriptor(RideType::LoopingCoaster)
                .cloned()
                .expect("builtin descriptor"),
            catalog
                .default_entry(RideType::LoopingCoaster)
                .cloned()
                .expect("builtin entry"),
        )
    }

    fn ride_with_station(length: u8) -> Ride {
        let mut ride = Ride::new(RideId(0), RideType::LoopingCoaster);
        ride.mode = RideMode::ContinuousCircuit;
        ride.stations[0] = Station::new(TileCoordsXYZ::new(4, 12, 2), length);
        ride
    }

    fn size(ride: &Ride, config: &SimConfig) -> VehicleSizing {
        let (descriptor, entry) = coaster();
        compute_vehicle_sizing(ride, &entry, &descriptor, &TileMap::new(1, 1), None, config)
            .expect("has a station")
    }

    #[test]
    fn no_station_means_no_sizing() {
        let (descriptor, entry) = coaster();
        let ride = Ride::new(RideId(0), RideType::LoopingCoaster);
        let map = TileMap::new(1, 1);
        assert_eq!(
            compute_vehicle_sizing(&ride, &entry, &descriptor, &map, None, &SimConfig::default()),
            None
        );
    }

    #[test]
    fn station_length_limits_cars() {
        // 2 tiles hold 466902 units: four cars of 110000 fit, and four cars
        // of friction 800 stay under the 15 << 8 mass limit.
        let sizing = size(&ride_with_station(2), &SimConfig::default());
        assert_eq!(sizing.max_cars, 4);
        assert_eq!(sizing.min_cars, 2);
        assert_eq!(sizing.num_cars, 2);
        assert_eq!(sizing.max_trains, 2);
        assert_eq!(sizing.num_trains, 1);
    }

    #[test]
    fn proposed_sizes_are_clamped() {
        let mut ride = ride_with_station(2);
        ride.proposed_num_cars_per_train = 7;
        ride.proposed_num_trains = 9;
        let sizing = size(&ride, &SimConfig::default());
        assert_eq!(sizing.num_cars, 4);
        assert!(sizing.num_trains <= sizing.max_trains);
    }

    #[test]
    fn train_length_limit_can_be_lifted() {
        let mut ride = ride_with_station(2);
        ride.proposed_num_cars_per_train = 7;
        ride.proposed_num_trains = 9;
        let mut config = SimConfig::default();
        config.disable_train_length_limit = true;
        let sizing = size(&ride, &config);
        assert_eq!(sizing.num_cars, 7);
        assert_eq!(sizing.num_trains, 9);
    }

    #[test]
    fn launch_modes_run_one_train() {
        let mut ride = ride_with_station(6);
        ride.mode = RideMode::PoweredLaunch;
        ride.proposed_num_trains = 4;
        let sizing = size(&ride, &SimConfig::default());
        assert_eq!(sizing.max_trains, 1);
        assert_eq!(sizing.num_trains, 1);
    }

    #[test]
    fn block_sections_bound_trains() {
        let mut ride = ride_with_station(6);
        ride.mode = RideMode::ContinuousCircuitBlockSectioned;
        ride.num_block_brakes = 3;
        ride.proposed_num_trains = 8;
        let sizing = size(&ride, &SimConfig::default());
        assert_eq!(sizing.max_trains, 3);
        assert_eq!(sizing.num_trains, 3);
    }

    #[test]
    fn apply_reports_changes() {
        let mut ride = ride_with_station(2);
        let sizing = size(&ride, &SimConfig::default());
        assert!(sizing.apply_to(&mut ride));
        assert!(!sizing.apply_to(&mut ride));
    }

    #[test]
    fn create_and_remove_trains() {
        let mut world = World::new(TileMap::flat(16, 16, 2), 7);
        let id = world.rides.create(RideType::LoopingCoaster).expect("slot");
        {
            let ride = world.rides.get_mut(id).expect("created");
            ride.stations[0] = Station::new(TileCoordsXYZ::new(4, 12, 2), 2);
            ride.num_trains = 2;
            ride.num_cars_per_train = 3;
        }
        assert_eq!(create_trains(&mut world, id), 2);
        assert_eq!(world.trains.cars_in_use(), 6);
        let ride = world.rides.get(id).expect("exists");
        assert!(ride.lifecycle_flags.contains(LifecycleFlags::ON_TRACK));
        assert_eq!(ride.stations[0].depart & !Station::DEPART_FLAG, 1);

        assert_eq!(remove_trains(&mut world, id), 2);
        assert_eq!(world.trains.cars_in_use(), 0);
        let ride = world.rides.get(id).expect("exists");
        assert!(ride.trains.is_empty());
        assert!(!ride.lifecycle_flags.contains(LifecycleFlags::ON_TRACK));
        assert_eq!(world.events.len(), 2);
    }

    #[test]
    fn creation_stops_when_slots_run_out() {
        let mut world = World::new(TileMap::flat(16, 16, 2), 7);
        world.trains = crate::world::TrainRegistry::with_capacity(5);
        let id = world.rides.create(RideType::LoopingCoaster).expect("slot");
        {
            let ride = world.rides.get_mut(id).expect("created");
            ride.stations[0] = Station::new(TileCoordsXYZ::new(4, 12, 2), 2);
            ride.num_trains = 3;
            ride.num_cars_per_train = 2;
        }
        assert_eq!(create_trains(&mut world, id), 2);
        assert_eq!(world.rides.get(id).expect("exists").trains.len(), 2);
    }
}
