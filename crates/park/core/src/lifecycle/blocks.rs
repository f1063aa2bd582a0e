//! Start and finish points: block sections on circuits and the return
//! point of boat hire courses.

use crate::track::{CircuitIterator, TrackElemType, TrackGraph, TrackPiece, track_back};
use crate::world::{TileCoordsXYZD, TileMap};

/// Whether `piece` ends a block section when counted.
fn counts_as_block(piece: &TrackPiece) -> bool {
    match piece.track_type {
        TrackElemType::BlockBrakes | TrackElemType::CableLiftHill => true,
        TrackElemType::Up25ToFlat => piece.has_chain,
        _ => false,
    }
}

/// Block brakes on the circuit through `origin`, counting chained lift tops
/// and cable lift hills.
pub fn count_block_brakes<G: TrackGraph + ?Sized>(
    graph: &G,
    origin: TrackPiece,
    step_limit: usize,
) -> u16 {
    CircuitIterator::new(graph, origin)
        .take(step_limit)
        .filter(counts_as_block)
        .count()
        .min(u16::MAX as usize) as u16
}

/// Marks every block point on the circuit through `origin` as the start of
/// a block section and clears the mark everywhere else.
///
/// Returns the number of pieces marked.
pub fn set_block_points(map: &mut TileMap, origin: TrackPiece, step_limit: usize) -> usize {
    let pieces: Vec<TrackPiece> = CircuitIterator::new(&*map, origin).take(step_limit).collect();
    let mut marked = 0;
    for piece in pieces {
        let is_point = piece.track_type.is_block_point();
        if let Some(element) = map.track_element_mut(piece.origin, piece.ride) {
            element.block_start = is_point;
            if is_point {
                marked += 1;
            }
        }
    }
    marked
}

/// Where hired boats return: the first piece behind `origin`, facing the
/// way the piece is entered. On a closed course the walk stops just after
/// `origin`.
pub fn boat_hire_return_point<G: TrackGraph + ?Sized>(
    graph: &G,
    origin: TrackPiece,
    step_limit: usize,
) -> TileCoordsXYZD {
    let first = track_back(graph, origin, step_limit);
    TileCoordsXYZD::new(first.origin.x, first.origin.y, first.origin.z, first.direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::LayoutBuilder;
    use crate::world::{Direction, RideId, TileCoordsXYZ, TileElement};

    use TrackElemType::*;

    fn place(map: &mut TileMap, chain: bool) -> Vec<TrackPiece> {
        LayoutBuilder::new(RideId(0), TileCoordsXYZ::new(3, 12, 2), Direction::East)
            .pieces([BeginStation, EndStation, RightQuarterTurn3, RightQuarterTurn3])
            .chain(chain)
            .pieces([FlatToUp25, Up25ToFlat])
            .chain(false)
            .pieces([BlockBrakes, RightQuarterTurn3, RightQuarterTurn3])
            .place(map)
            .expect("layout fits")
            .pieces
    }

    fn block_start(map: &TileMap, piece: &TrackPiece) -> bool {
        map.elements_at(piece.origin.xy())
            .iter()
            .filter_map(TileElement::as_track)
            .find(|track| track.ride == piece.ride && track.sequence == 0)
            .is_some_and(|track| track.block_start)
    }

    #[test]
    fn chained_lift_tops_count_as_blocks() {
        let mut map = TileMap::flat(32, 32, 2);
        let pieces = place(&mut map, true);
        assert_eq!(count_block_brakes(&map, pieces[1], 100), 2);

        let mut unchained = TileMap::flat(32, 32, 2);
        let pieces = place(&mut unchained, false);
        assert_eq!(count_block_brakes(&unchained, pieces[1], 100), 1);
    }

    #[test]
    fn block_points_are_marked() {
        let mut map = TileMap::flat(32, 32, 2);
        let pieces = place(&mut map, true);
        assert_eq!(set_block_points(&mut map, pieces[1], 100), 3);
        assert!(block_start(&map, &pieces[1]));
        assert!(block_start(&map, &pieces[5]));
        assert!(block_start(&map, &pieces[6]));
        assert!(!block_start(&map, &pieces[0]));
        assert!(!block_start(&map, &pieces[4]));
    }

    #[test]
    fn boats_return_to_the_start_of_an_open_course() {
        let mut map = TileMap::flat(32, 32, 2);
        let pieces = LayoutBuilder::new(RideId(0), TileCoordsXYZ::new(3, 12, 2), Direction::East)
            .pieces([Flat, Flat, BeginStation, EndStation, Flat])
            .place(&mut map)
            .expect("layout fits")
            .pieces;
        let start = pieces[0].origin;
        assert_eq!(
            boat_hire_return_point(&map, pieces[3], 100),
            TileCoordsXYZD::new(start.x, start.y, start.z, Direction::East)
        );
        assert_eq!(
            boat_hire_return_point(&map, pieces[0], 100),
            TileCoordsXYZD::new(start.x, start.y, start.z, Direction::East)
        );
    }
}
