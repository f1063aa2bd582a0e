//! Binary world snapshots.
//!
//! A snapshot carries the map, the rides, the trains, the clock, the weather
//! and the seed. Pending events are not saved, and rating passes are owned
//! by the engine, so they restart from the first ride after a load.

use crate::error::{ErrorSeverity, ParkError};

use super::World;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to encode world snapshot: {0}")]
    Encode(bincode::Error),

    #[error("failed to decode world snapshot: {0}")]
    Decode(bincode::Error),
}

impl ParkError for SnapshotError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Encode(_) => ErrorSeverity::Internal,
            Self::Decode(_) => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Encode(_) => "SNAPSHOT_ENCODE",
            Self::Decode(_) => "SNAPSHOT_DECODE",
        }
    }
}

impl World {
    /// Encodes the world with bincode. Equal worlds give equal bytes.
    pub fn to_snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(SnapshotError::Encode)
    }

    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(bytes).map_err(SnapshotError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ride::{LifecycleFlags, RatingTuple, RideMode, RideType};
    use crate::track::{LayoutBuilder, TrackElemType};
    use crate::world::{
        Direction, ParkEvent, RideId, TileCoordsXY, TileCoordsXYZ, TileElement, TileMap,
    };

    use TrackElemType::*;

    fn built_world() -> (World, RideId) {
        let mut world = World::new(TileMap::flat(32, 32, 2), 77);
        let id = world.rides.create(RideType::LoopingCoaster).expect("slot");
        let layout = LayoutBuilder::new(id, TileCoordsXYZ::new(3, 12, 2), Direction::East)
            .pieces([BeginStation, EndStation, RightQuarterTurn3, RightQuarterTurn3])
            .pieces([Flat, Flat, RightQuarterTurn3, RightQuarterTurn3])
            .place(&mut world.map)
            .expect("layout fits");
        world
            .map
            .push(TileCoordsXY::new(10, 10), TileElement::small_scenery(2, 6));
        let ride = world.rides.get_mut(id).expect("created");
        ride.mode = RideMode::ContinuousCircuit;
        for station in &layout.stations {
            ride.register_station(station);
        }
        ride.ratings = RatingTuple::new(650, 480, 320);
        ride.lifecycle_flags |= LifecycleFlags::TESTED;
        world.clock.months = 3;
        world.weather.raining = true;
        (world, id)
    }

    #[test]
    fn snapshot_restores_rides_and_map() {
        let (mut world, id) = built_world();
        world.emit(ParkEvent::BreakdownFixed { ride: id });
        let bytes = world.to_snapshot().expect("encodes");
        let loaded = World::from_snapshot(&bytes).expect("decodes");

        assert_eq!(loaded.rides.get(id), world.rides.get(id));
        assert_eq!(
            loaded.rides.get(id).map(|ride| ride.state_digest()),
            world.rides.get(id).map(|ride| ride.state_digest())
        );
        assert_eq!(loaded.map, world.map);
        assert_eq!(loaded.clock, world.clock);
        assert_eq!(loaded.weather, world.weather);
        assert_eq!(loaded.seed, 77);
        assert_eq!(loaded.events.len(), 0);
        assert_eq!(loaded.to_snapshot().expect("encodes"), bytes);
    }

    #[test]
    fn truncated_snapshot_is_rejected() {
        let (world, _) = built_world();
        let bytes = world.to_snapshot().expect("encodes");
        let error = World::from_snapshot(&bytes[..bytes.len() / 2]).expect_err("truncated");
        assert_eq!(error.error_code(), "SNAPSHOT_DECODE");
        assert_eq!(error.severity(), ErrorSeverity::Recoverable);
    }
}
