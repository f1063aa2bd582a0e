use crate::config::SimConfig;
use crate::ride::{Ride, RideType};

use super::RideId;

/// Arena of rides indexed by [`RideId`].
///
/// Slots freed by [`remove`](Self::remove) are reused by the next insert, so
/// ids stay below [`SimConfig::MAX_RIDES`].
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RideRegistry {
    slots: Vec<Option<Ride>>,
}

impl RideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a closed ride of `ride_type` in the first free slot.
    pub fn create(&mut self, ride_type: RideType) -> Option<RideId> {
        let index = match self.slots.iter().position(Option::is_none) {
            Some(index) => index,
            None if self.slots.len() < SimConfig::MAX_RIDES => {
                self.slots.push(None);
                self.slots.len() - 1
            }
            None => return None,
        };
        let id = RideId(u16::try_from(index).ok()?);
        self.slots[index] = Some(Ride::new(id, ride_type));
        Some(id)
    }

    pub fn get(&self, id: RideId) -> Option<&Ride> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: RideId) -> Option<&mut Ride> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, id: RideId) -> Option<Ride> {
        self.slots.get_mut(id.index()).and_then(Option::take)
    }

    /// Rides in registry-index order.
    pub fn iter(&self) -> impl Iterator<Item = &Ride> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ride> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    pub fn ids(&self) -> Vec<RideId> {
        self.iter().map(|ride| ride.id).collect()
    }

    /// First live ride strictly after `id` in index order.
    pub fn next_after(&self, id: RideId) -> Option<&Ride> {
        self.slots
            .iter()
            .skip(id.index() + 1)
            .find_map(Option::as_ref)
    }

    pub fn first(&self) -> Option<&Ride> {
        self.iter().next()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_slots_are_reused() {
        let mut rides = RideRegistry::new();
        let a = rides.create(RideType::LoopingCoaster);
        let b = rides.create(RideType::GoKarts);
        assert_eq!(a, Some(RideId(0)));
        assert_eq!(b, Some(RideId(1)));

        rides.remove(RideId(0));
        assert_eq!(rides.len(), 1);
        assert_eq!(rides.create(RideType::Maze), Some(RideId(0)));
    }

    #[test]
    fn next_after_skips_holes() {
        let mut rides = RideRegistry::new();
        for _ in 0..4 {
            rides.create(RideType::Dodgems);
        }
        rides.remove(RideId(1));
        rides.remove(RideId(2));
        assert_eq!(rides.next_after(RideId(0)).map(|r| r.id), Some(RideId(3)));
        assert!(rides.next_after(RideId(3)).is_none());
    }
}
