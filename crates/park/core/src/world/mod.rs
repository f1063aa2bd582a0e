//! World context: tile map, ride arena, trains, clock and event queue.
//!
//! A [`World`] is passed explicitly to every engine entry point so several
//! independent simulations can coexist in one process.
mod coords;
mod events;
mod ids;
mod map;
mod registry;
#[cfg(feature = "serde")]
mod snapshot;
mod trains;

pub use coords::{COORDS_Z_STEP, Direction, TileCoordsXY, TileCoordsXYZ, TileCoordsXYZD};
pub use events::{EventQueue, ParkEvent, ParkEventRecord};
pub use ids::{RideEntryId, RideId, StationIndex, Tick, TrainId};
pub use map::{EntranceKind, TileElement, TileElementKind, TileMap, TrackElement};
pub use registry::RideRegistry;
#[cfg(feature = "serde")]
pub use snapshot::SnapshotError;
pub use trains::{Train, TrainRegistry};

/// Simulation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParkClock {
    pub tick: Tick,
    /// Months elapsed since the park opened.
    pub months: u32,
}

impl ParkClock {
    pub const TICKS_PER_MONTH: u64 = 16_384;

    /// Advances one tick, rolling the month over when it completes.
    pub fn advance(&mut self) {
        self.tick = self.tick + 1;
        if self.tick.is_every(Self::TICKS_PER_MONTH) {
            self.months += 1;
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weather {
    pub raining: bool,
}

/// Mutable simulation state shared by the rating engine and the lifecycle.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct World {
    pub map: TileMap,
    pub rides: RideRegistry,
    pub trains: TrainRegistry,
    /// Not part of snapshots.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub events: EventQueue,
    pub clock: ParkClock,
    pub weather: Weather,
    /// Base seed for every random roll made by the simulation.
    pub seed: u64,
}

impl World {
    pub fn new(map: TileMap, seed: u64) -> Self {
        Self {
            map,
            rides: RideRegistry::new(),
            trains: TrainRegistry::new(),
            events: EventQueue::new(),
            clock: ParkClock::default(),
            weather: Weather::default(),
            seed,
        }
    }

    pub fn tick(&self) -> Tick {
        self.clock.tick
    }

    pub fn emit(&mut self, event: ParkEvent) {
        let tick = self.clock.tick;
        self.events.push(tick, event);
    }
}
