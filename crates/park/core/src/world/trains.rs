use std::collections::BTreeMap;

use crate::config::SimConfig;

use super::{RideId, TileCoordsXYZ, TrainId};

/// A train placed on a ride's track. Car-level motion is owned by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Train {
    pub id: TrainId,
    pub ride: RideId,
    pub num_cars: u8,
    pub location: TileCoordsXYZ,
    /// Set while the train is measuring a test run.
    pub testing: bool,
}

/// Vehicle storage with a fixed number of car slots shared by every ride.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainRegistry {
    trains: BTreeMap<TrainId, Train>,
    next_id: u32,
    capacity: usize,
}

impl TrainRegistry {
    pub fn new() -> Self {
        Self::with_capacity(SimConfig::MAX_VEHICLE_SLOTS)
    }

    /// Registry holding at most `capacity` cars.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            trains: BTreeMap::new(),
            next_id: 0,
            capacity,
        }
    }

    pub fn cars_in_use(&self) -> usize {
        self.trains.values().map(|train| train.num_cars as usize).sum()
    }

    pub fn free_car_slots(&self) -> usize {
        self.capacity.saturating_sub(self.cars_in_use())
    }

    /// Places a new train. Returns `None` when there are not enough free car slots.
    pub fn create(
        &mut self,
        ride: RideId,
        num_cars: u8,
        location: TileCoordsXYZ,
    ) -> Option<TrainId> {
        if (num_cars as usize) > self.free_car_slots() {
            return None;
        }
        let id = TrainId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.trains.insert(
            id,
            Train {
                id,
                ride,
                num_cars,
                location,
                testing: false,
            },
        );
        Some(id)
    }

    pub fn remove(&mut self, id: TrainId) -> Option<Train> {
        self.trains.remove(&id)
    }

    pub fn get(&self, id: TrainId) -> Option<&Train> {
        self.trains.get(&id)
    }

    pub fn get_mut(&mut self, id: TrainId) -> Option<&mut Train> {
        self.trains.get_mut(&id)
    }

    pub fn for_ride(&self, ride: RideId) -> impl Iterator<Item = &Train> {
        self.trains.values().filter(move |train| train.ride == ride)
    }

    pub fn len(&self) -> usize {
        self.trains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }
}

impl Default for TrainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_respects_car_capacity() {
        let mut trains = TrainRegistry::with_capacity(10);
        let location = TileCoordsXYZ::new(0, 0, 2);
        let first = trains.create(RideId(0), 6, location);
        assert!(first.is_some());
        assert_eq!(trains.free_car_slots(), 4);
        assert!(trains.create(RideId(0), 5, location).is_none());

        if let Some(id) = first {
            trains.remove(id);
        }
        assert_eq!(trains.free_car_slots(), 10);
    }
}
