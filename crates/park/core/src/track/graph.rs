//! Read-only traversal of track pieces placed on the tile map.

use crate::world::{
    Direction, RideId, StationIndex, TileCoordsXY, TileCoordsXYZ, TileElement, TileMap,
    TrackElement,
};

use super::{TrackBlock, TrackElemType, TrackFlags};

/// Maps a block offset in a piece's local frame to a map tile.
pub fn local_to_world(
    origin: TileCoordsXY,
    direction: Direction,
    forward: i32,
    right: i32,
) -> TileCoordsXY {
    let (fx, fy) = direction.delta();
    let (rx, ry) = direction.rotate_cw().delta();
    origin.offset(forward * fx + right * rx, forward * fy + right * ry)
}

/// A placed track piece identified by its origin (sequence 0) element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackPiece {
    /// Origin tile; `z` is the origin element's base height.
    pub origin: TileCoordsXYZ,
    pub direction: Direction,
    pub track_type: TrackElemType,
    pub ride: RideId,
    pub station: StationIndex,
    pub has_chain: bool,
}

impl TrackPiece {
    pub fn from_element(tile: TileCoordsXY, element: &TileElement, track: &TrackElement) -> Self {
        Self {
            origin: tile.with_z(element.base_z()),
            direction: track.direction,
            track_type: track.track_type,
            ride: track.ride,
            station: track.station,
            has_chain: track.has_chain,
        }
    }

    /// Map position of one of this piece's blocks.
    pub fn block_location(&self, block: TrackBlock) -> TileCoordsXYZ {
        local_to_world(
            self.origin.xy(),
            self.direction,
            block.forward as i32,
            block.right as i32,
        )
        .with_z(self.origin.z + block.z as i32)
    }

    pub fn block_locations(&self) -> impl Iterator<Item = TileCoordsXYZ> + '_ {
        self.track_type
            .def()
            .blocks
            .iter()
            .map(move |block| self.block_location(*block))
    }

    pub fn exit_direction(&self) -> Direction {
        self.direction.turned(self.track_type.def().turn)
    }

    pub fn entry_height(&self) -> i32 {
        self.origin.z + self.track_type.def().entry_z as i32
    }

    pub fn exit_height(&self) -> i32 {
        self.origin.z + self.track_type.def().exit_z as i32
    }

    /// Tile on which the following piece must have its origin.
    pub fn next_origin_tile(&self) -> TileCoordsXY {
        let def = self.track_type.def();
        let exit_tile = self.block_location(def.exit_block()).xy();
        if def.flags.contains(TrackFlags::VERTICAL) {
            exit_tile
        } else {
            exit_tile.step(self.exit_direction())
        }
    }

    /// True when `next` is placed where this piece leads.
    pub fn connects_to(&self, next: &TrackPiece) -> bool {
        next.ride == self.ride
            && next.origin.xy() == self.next_origin_tile()
            && next.direction == self.exit_direction()
            && next.entry_height() == self.exit_height()
    }

    pub fn is_same_piece(&self, other: &TrackPiece) -> bool {
        self.origin == other.origin
            && self.direction == other.direction
            && self.track_type == other.track_type
    }
}

/// Track graph accessor over a tile map.
///
/// Only `elements_at` and `is_valid_tile` are required; traversal is derived
/// from the static piece geometry.
pub trait TrackGraph {
    fn elements_at(&self, tile: TileCoordsXY) -> &[TileElement];

    fn is_valid_tile(&self, tile: TileCoordsXY) -> bool;

    /// Origin piece of `ride` at `location`.
    fn piece_at(&self, location: TileCoordsXYZ, ride: RideId) -> Option<TrackPiece> {
        let tile = location.xy();
        self.elements_at(tile)
            .iter()
            .filter(|element| !element.ghost && element.base_z() == location.z)
            .find_map(|element| {
                element
                    .as_track()
                    .filter(|track| track.ride == ride && track.sequence == 0)
                    .map(|track| TrackPiece::from_element(tile, element, track))
            })
    }

    fn next_piece(&self, piece: &TrackPiece) -> Option<TrackPiece> {
        let tile = piece.next_origin_tile();
        let direction = piece.exit_direction();
        let exit_height = piece.exit_height();
        self.elements_at(tile)
            .iter()
            .filter(|element| !element.ghost)
            .find_map(|element| {
                let track = element.as_track()?;
                let entry = element.base_z() + track.track_type.def().entry_z as i32;
                (track.ride == piece.ride
                    && track.sequence == 0
                    && track.direction == direction
                    && entry == exit_height)
                    .then(|| TrackPiece::from_element(tile, element, track))
            })
    }

    fn previous_piece(&self, piece: &TrackPiece) -> Option<TrackPiece> {
        let behind = piece.origin.xy().step(piece.direction.reverse());
        for tile in [behind, piece.origin.xy()] {
            for element in self.elements_at(tile).iter().filter(|e| !e.ghost) {
                let Some(track) = element.as_track() else {
                    continue;
                };
                if track.ride != piece.ride {
                    continue;
                }
                let Some(block) = track.track_type.def().block(track.sequence) else {
                    continue;
                };
                let origin_tile = local_to_world(
                    tile,
                    track.direction,
                    -(block.forward as i32),
                    -(block.right as i32),
                );
                let origin = origin_tile.with_z(element.base_z() - block.z as i32);
                let Some(candidate) = self.piece_at(origin, piece.ride) else {
                    continue;
                };
                if candidate.track_type != track.track_type
                    || candidate.direction != track.direction
                    || candidate.is_same_piece(piece)
                {
                    continue;
                }
                if candidate.connects_to(piece) {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

impl TrackGraph for TileMap {
    fn elements_at(&self, tile: TileCoordsXY) -> &[TileElement] {
        TileMap::elements_at(self, tile)
    }

    fn is_valid_tile(&self, tile: TileCoordsXY) -> bool {
        self.is_valid(tile)
    }
}
