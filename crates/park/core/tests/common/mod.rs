//! Shared fixtures for the park-core integration tests.
#![allow(dead_code)]

use park_core::track::PlacedLayout;
use park_core::{
    Direction, LayoutBuilder, RideId, RideMode, RideType, TileCoordsXYZ, TileCoordsXYZD, TileMap,
    TrackElemType, World,
};

use TrackElemType::*;

/// Closed loop of ten pieces with a two-piece station.
pub const TEN_PIECE_LOOP: [TrackElemType; 10] = [
    BeginStation,
    EndStation,
    Flat,
    RightQuarterTurn3,
    RightQuarterTurn3,
    Flat,
    Flat,
    Flat,
    RightQuarterTurn3,
    RightQuarterTurn3,
];

pub fn empty_world() -> World {
    World::new(TileMap::flat(48, 48, 2), 2024)
}

/// Places `pieces` for a new ride of `ride_type` starting at row `y`.
pub fn build_ride(
    world: &mut World,
    ride_type: RideType,
    y: i32,
    pieces: &[TrackElemType],
) -> (RideId, PlacedLayout) {
    let id = world.rides.create(ride_type).expect("free ride slot");
    let layout = LayoutBuilder::new(id, TileCoordsXYZ::new(4, y, 2), Direction::East)
        .pieces(pieces.iter().copied())
        .place(&mut world.map)
        .expect("layout fits on the map");
    let ride = world.rides.get_mut(id).expect("ride created");
    ride.mode = RideMode::ContinuousCircuit;
    for station in &layout.stations {
        ride.register_station(station);
    }
    (id, layout)
}

/// Puts an entrance south and an exit north of every station start.
pub fn add_entrances(world: &mut World, id: RideId, layout: &PlacedLayout, exits: bool) {
    let ride = world.rides.get_mut(id).expect("ride exists");
    for station in &layout.stations {
        let tile = station.start;
        let slot = &mut ride.stations[station.index.index()];
        slot.entrance = Some(TileCoordsXYZD::new(tile.x, tile.y + 1, tile.z, Direction::North));
        if exits {
            slot.exit = Some(TileCoordsXYZD::new(tile.x, tile.y - 1, tile.z, Direction::South));
        }
    }
}

/// A coaster on the ten-piece loop with its entrance and exit built.
pub fn finished_coaster(world: &mut World, y: i32) -> RideId {
    let (id, layout) = build_ride(world, RideType::LoopingCoaster, y, &TEN_PIECE_LOOP);
    add_entrances(world, id, &layout, true);
    id
}
