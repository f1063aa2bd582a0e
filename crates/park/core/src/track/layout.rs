//! Places a sequence of track pieces end to end.

use crate::world::{
    Direction, RideId, StationIndex, TileCoordsXY, TileCoordsXYZ, TileElement, TileElementKind,
    TileMap, TrackElement,
};

use super::{TrackElemType, TrackPiece};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("piece {index} ({track_type}) leaves the map at {tile}")]
    OffMap {
        index: usize,
        track_type: TrackElemType,
        tile: TileCoordsXY,
    },

    #[error("piece {index} ({track_type}) has an out of range height {height}")]
    HeightOutOfRange {
        index: usize,
        track_type: TrackElemType,
        height: i32,
    },
}

/// Station platform produced by a layout: the front-most station piece and
/// the number of consecutive station pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedStation {
    pub index: StationIndex,
    pub start: TileCoordsXYZ,
    pub direction: Direction,
    pub length: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacedLayout {
    pub pieces: Vec<TrackPiece>,
    pub stations: Vec<PlacedStation>,
    /// True when the last piece leads back into the first one.
    pub closed: bool,
}

#[derive(Clone, Copy, Debug)]
struct Planned {
    track_type: TrackElemType,
    station: StationIndex,
    has_chain: bool,
}

/// Builder that lays pieces out from a start position.
///
/// ```ignore
/// let layout = LayoutBuilder::new(ride, TileCoordsXYZ::new(4, 4, 2), Direction::East)
///     .piece(TrackElemType::BeginStation)
///     .piece(TrackElemType::EndStation)
///     .place(&mut map)?;
/// ```
#[derive(Clone, Debug)]
pub struct LayoutBuilder {
    ride: RideId,
    start: TileCoordsXYZ,
    direction: Direction,
    station: StationIndex,
    chain: bool,
    planned: Vec<Planned>,
}

impl LayoutBuilder {
    /// `start.z` is the level at which the first piece is entered.
    pub fn new(ride: RideId, start: TileCoordsXYZ, direction: Direction) -> Self {
        Self {
            ride,
            start,
            direction,
            station: StationIndex(0),
            chain: false,
            planned: Vec::new(),
        }
    }

    /// Station index recorded on subsequent station pieces.
    #[must_use]
    pub fn station(mut self, index: StationIndex) -> Self {
        self.station = index;
        self
    }

    /// Fits a chain lift to subsequent pieces.
    #[must_use]
    pub fn chain(mut self, on: bool) -> Self {
        self.chain = on;
        self
    }

    #[must_use]
    pub fn piece(mut self, track_type: TrackElemType) -> Self {
        self.planned.push(Planned {
            track_type,
            station: self.station,
            has_chain: self.chain,
        });
        self
    }

    #[must_use]
    pub fn pieces(self, track_types: impl IntoIterator<Item = TrackElemType>) -> Self {
        track_types.into_iter().fold(self, Self::piece)
    }

    /// Resolves piece positions without touching a map.
    pub fn plan(&self) -> Result<Vec<TrackPiece>, LayoutError> {
        let mut tile = self.start.xy();
        let mut direction = self.direction;
        let mut height = self.start.z;
        let mut pieces = Vec::with_capacity(self.planned.len());

        for (index, planned) in self.planned.iter().enumerate() {
            let def = planned.track_type.def();
            let base = height - def.entry_z as i32;
            let piece = TrackPiece {
                origin: tile.with_z(base),
                direction,
                track_type: planned.track_type,
                ride: self.ride,
                station: planned.station,
                has_chain: planned.has_chain,
            };
            for location in piece.block_locations() {
                let top = location.z + def.clearance as i32;
                if location.z < 0 || top > u8::MAX as i32 {
                    return Err(LayoutError::HeightOutOfRange {
                        index,
                        track_type: planned.track_type,
                        height: location.z,
                    });
                }
            }
            tile = piece.next_origin_tile();
            direction = piece.exit_direction();
            height = piece.exit_height();
            pieces.push(piece);
        }
        Ok(pieces)
    }

    /// Writes the planned pieces onto `map`.
    pub fn place(self, map: &mut TileMap) -> Result<PlacedLayout, LayoutError> {
        let pieces = self.plan()?;

        for (index, piece) in pieces.iter().enumerate() {
            let def = piece.track_type.def();
            if let Some(tile) = piece
                .block_locations()
                .map(|location| location.xy())
                .find(|tile| !map.is_valid(*tile))
            {
                return Err(LayoutError::OffMap {
                    index,
                    track_type: piece.track_type,
                    tile,
                });
            }
            for (sequence, location) in piece.block_locations().enumerate() {
                // Heights were range checked by `plan`.
                let base = location.z as u8;
                let element = TileElement::new(
                    base,
                    base.saturating_add(def.clearance),
                    TileElementKind::Track(TrackElement {
                        track_type: piece.track_type,
                        ride: piece.ride,
                        sequence: sequence as u8,
                        direction: piece.direction,
                        station: piece.station,
                        has_chain: piece.has_chain,
                        block_start: false,
                    }),
                );
                map.push(location.xy(), element);
            }
        }

        let closed = match (pieces.first(), pieces.last()) {
            (Some(first), Some(last)) => last.connects_to(first),
            _ => false,
        };
        let stations = collect_stations(&pieces);
        Ok(PlacedLayout {
            pieces,
            stations,
            closed,
        })
    }
}

/// Groups consecutive station pieces; the last piece of each run is the start.
fn collect_stations(pieces: &[TrackPiece]) -> Vec<PlacedStation> {
    let mut stations: Vec<PlacedStation> = Vec::new();
    let mut run: Option<PlacedStation> = None;

    for piece in pieces {
        if piece.track_type.is_station() {
            run = Some(match run {
                Some(current) if current.index == piece.station => PlacedStation {
                    start: piece.origin,
                    direction: piece.direction,
                    length: current.length.saturating_add(1),
                    ..current
                },
                previous => {
                    stations.extend(previous);
                    PlacedStation {
                        index: piece.station,
                        start: piece.origin,
                        direction: piece.direction,
                        length: 1,
                    }
                }
            });
        } else if let Some(done) = run.take() {
            stations.push(done);
        }
    }
    stations.extend(run);
    stations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackGraph;

    fn oval(ride: RideId) -> LayoutBuilder {
        use TrackElemType::*;
        LayoutBuilder::new(ride, TileCoordsXYZ::new(3, 10, 2), Direction::East).pieces([
            BeginStation,
            EndStation,
            RightQuarterTurn3,
            RightQuarterTurn3,
            Flat,
            Flat,
            RightQuarterTurn3,
            RightQuarterTurn3,
        ])
    }

    #[test]
    fn oval_closes_and_links_both_ways() {
        let mut map = TileMap::flat(16, 16, 2);
        let layout = oval(RideId(0)).place(&mut map).expect("layout fits");
        assert!(layout.closed);

        for window in layout.pieces.windows(2) {
            assert_eq!(map.next_piece(&window[0]), Some(window[1]));
            assert_eq!(map.previous_piece(&window[1]), Some(window[0]));
        }
        let first = layout.pieces[0];
        let last = layout.pieces[layout.pieces.len() - 1];
        assert_eq!(map.next_piece(&last), Some(first));
    }

    #[test]
    fn station_run_is_collected() {
        let mut map = TileMap::flat(16, 16, 2);
        let layout = oval(RideId(0)).place(&mut map).expect("layout fits");
        assert_eq!(layout.stations.len(), 1);
        assert_eq!(layout.stations[0].length, 2);
        assert_eq!(layout.stations[0].start, layout.pieces[1].origin);
    }

    #[test]
    fn slopes_change_height() {
        use TrackElemType::*;
        let builder = LayoutBuilder::new(RideId(0), TileCoordsXYZ::new(0, 0, 2), Direction::East)
            .pieces([FlatToUp25, Up25, Up25ToFlat, FlatToDown25, Down25, Down25ToFlat]);
        let pieces = builder.plan().expect("heights in range");
        let heights: Vec<i32> = pieces.iter().map(|piece| piece.origin.z).collect();
        assert_eq!(heights, vec![2, 3, 5, 5, 3, 2]);
        assert_eq!(pieces[5].exit_height(), 2);
    }

    #[test]
    fn leaving_the_map_is_rejected() {
        let mut map = TileMap::flat(2, 2, 2);
        let result = LayoutBuilder::new(RideId(0), TileCoordsXYZ::new(0, 0, 2), Direction::East)
            .pieces([TrackElemType::Flat, TrackElemType::Flat, TrackElemType::Flat])
            .place(&mut map);
        assert!(matches!(result, Err(LayoutError::OffMap { index: 2, .. })));
    }

    #[test]
    fn vertical_loop_connects() {
        use TrackElemType::*;
        let mut map = TileMap::flat(16, 16, 2);
        let layout = LayoutBuilder::new(RideId(3), TileCoordsXYZ::new(2, 6, 4), Direction::East)
            .pieces([Flat, LeftVerticalLoop, Flat])
            .place(&mut map)
            .expect("layout fits");
        assert_eq!(map.next_piece(&layout.pieces[1]), Some(layout.pieces[2]));
        assert_eq!(map.previous_piece(&layout.pieces[2]), Some(layout.pieces[1]));
    }
}
