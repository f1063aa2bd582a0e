//! In-memory tile map.
//!
//! Each tile holds a stack of elements (surface, paths, track, scenery,
//! entrances). Heights are stored in element levels, see
//! [`COORDS_Z_STEP`](super::COORDS_Z_STEP).

use crate::track::TrackElemType;

use super::{Direction, RideId, StationIndex, TileCoordsXY, TileCoordsXYZ};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntranceKind {
    RideEntrance,
    RideExit,
    ParkEntrance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackElement {
    pub track_type: TrackElemType,
    pub ride: RideId,
    /// Block index within a multi-tile piece; 0 is the piece origin.
    pub sequence: u8,
    pub direction: Direction,
    pub station: StationIndex,
    pub has_chain: bool,
    /// Set on pieces that start a block section.
    #[cfg_attr(feature = "serde", serde(default))]
    pub block_start: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TileElementKind {
    /// Terrain. `water_height` is the water level in element levels, 0 when dry.
    Surface { water_height: u8 },
    Path { queue: bool },
    Track(TrackElement),
    SmallScenery,
    LargeScenery,
    Entrance {
        ride: RideId,
        station: StationIndex,
        kind: EntranceKind,
        direction: Direction,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileElement {
    pub base_height: u8,
    pub clearance_height: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ghost: bool,
    pub kind: TileElementKind,
}

impl TileElement {
    pub const fn new(base_height: u8, clearance_height: u8, kind: TileElementKind) -> Self {
        Self {
            base_height,
            clearance_height,
            ghost: false,
            kind,
        }
    }

    pub const fn surface(base_height: u8, water_height: u8) -> Self {
        Self::new(base_height, base_height, TileElementKind::Surface { water_height })
    }

    pub const fn path(base_height: u8, queue: bool) -> Self {
        Self::new(base_height, base_height + 4, TileElementKind::Path { queue })
    }

    pub const fn small_scenery(base_height: u8, clearance_height: u8) -> Self {
        Self::new(base_height, clearance_height, TileElementKind::SmallScenery)
    }

    pub const fn large_scenery(base_height: u8, clearance_height: u8) -> Self {
        Self::new(base_height, clearance_height, TileElementKind::LargeScenery)
    }

    #[inline]
    pub const fn base_z(&self) -> i32 {
        self.base_height as i32
    }

    #[inline]
    pub const fn clearance_z(&self) -> i32 {
        self.clearance_height as i32
    }

    pub fn as_track(&self) -> Option<&TrackElement> {
        match &self.kind {
            TileElementKind::Track(track) => Some(track),
            _ => None,
        }
    }

    pub fn as_track_mut(&mut self) -> Option<&mut TrackElement> {
        match &mut self.kind {
            TileElementKind::Track(track) => Some(track),
            _ => None,
        }
    }

    pub fn is_surface(&self) -> bool {
        matches!(self.kind, TileElementKind::Surface { .. })
    }
}

/// Rectangular grid of tile element stacks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileMap {
    width: u32,
    height: u32,
    tiles: Vec<Vec<TileElement>>,
}

impl TileMap {
    /// Creates a map with no elements at all.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Vec::new(); (width as usize) * (height as usize)],
        }
    }

    /// Creates a map covered by dry terrain at `surface_height`.
    pub fn flat(width: u32, height: u32, surface_height: u8) -> Self {
        let mut map = Self::new(width, height);
        for stack in &mut map.tiles {
            stack.push(TileElement::surface(surface_height, 0));
        }
        map
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub fn is_valid(&self, tile: TileCoordsXY) -> bool {
        tile.x >= 0 && tile.y >= 0 && (tile.x as u32) < self.width && (tile.y as u32) < self.height
    }

    fn index(&self, tile: TileCoordsXY) -> Option<usize> {
        self.is_valid(tile)
            .then(|| tile.y as usize * self.width as usize + tile.x as usize)
    }

    /// Element stack at `tile`; empty for tiles outside the map.
    pub fn elements_at(&self, tile: TileCoordsXY) -> &[TileElement] {
        match self.index(tile) {
            Some(index) => &self.tiles[index],
            None => &[],
        }
    }

    pub fn elements_at_mut(&mut self, tile: TileCoordsXY) -> Option<&mut Vec<TileElement>> {
        let index = self.index(tile)?;
        self.tiles.get_mut(index)
    }

    /// Appends an element to a tile stack. Returns false if the tile is off the map.
    pub fn push(&mut self, tile: TileCoordsXY, element: TileElement) -> bool {
        match self.elements_at_mut(tile) {
            Some(stack) => {
                stack.push(element);
                true
            }
            None => false,
        }
    }

    /// Removes every element on `tile` matching `predicate`.
    pub fn remove_where(&mut self, tile: TileCoordsXY, predicate: impl Fn(&TileElement) -> bool) {
        if let Some(stack) = self.elements_at_mut(tile) {
            stack.retain(|element| !predicate(element));
        }
    }

    pub fn surface_at(&self, tile: TileCoordsXY) -> Option<&TileElement> {
        self.elements_at(tile).iter().find(|element| element.is_surface())
    }

    /// Terrain height at `tile` in element levels.
    pub fn surface_height(&self, tile: TileCoordsXY) -> Option<u8> {
        self.surface_at(tile).map(|element| element.base_height)
    }

    /// Sets the water level of the terrain at `tile`.
    pub fn set_water_height(&mut self, tile: TileCoordsXY, level: u8) {
        if let Some(stack) = self.elements_at_mut(tile) {
            for element in stack.iter_mut() {
                if let TileElementKind::Surface { water_height } = &mut element.kind {
                    *water_height = level;
                }
            }
        }
    }

    /// Mutable access to the non-ghost track element of `ride` at `location`.
    pub fn track_element_mut(
        &mut self,
        location: TileCoordsXYZ,
        ride: RideId,
    ) -> Option<&mut TrackElement> {
        self.elements_at_mut(location.xy())?
            .iter_mut()
            .filter(|element| !element.ghost && element.base_z() == location.z)
            .filter_map(TileElement::as_track_mut)
            .find(|track| track.ride == ride && track.sequence == 0)
    }

    /// Removes every element that belongs to `ride` (track and entrances).
    pub fn clear_ride(&mut self, ride: RideId) {
        for stack in &mut self.tiles {
            stack.retain(|element| match &element.kind {
                TileElementKind::Track(track) => track.ride != ride,
                TileElementKind::Entrance { ride: owner, .. } => *owner != ride,
                _ => true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_tiles_are_empty() {
        let map = TileMap::flat(4, 4, 2);
        assert!(map.elements_at(TileCoordsXY::new(-1, 0)).is_empty());
        assert!(map.elements_at(TileCoordsXY::new(4, 0)).is_empty());
        assert_eq!(map.elements_at(TileCoordsXY::new(3, 3)).len(), 1);
    }

    #[test]
    fn surface_height_and_water() {
        let mut map = TileMap::flat(2, 2, 6);
        let tile = TileCoordsXY::new(1, 1);
        assert_eq!(map.surface_height(tile), Some(6));

        map.set_water_height(tile, 8);
        let surface = map.surface_at(tile).copied();
        assert_eq!(
            surface.map(|element| element.kind),
            Some(TileElementKind::Surface { water_height: 8 })
        );
    }

    #[test]
    fn push_rejects_tiles_off_the_map() {
        let mut map = TileMap::new(2, 2);
        assert!(!map.push(TileCoordsXY::new(5, 5), TileElement::path(2, false)));
        assert!(map.push(TileCoordsXY::new(1, 0), TileElement::path(2, false)));
    }
}
