//! Proximity scoring: what a rider passes close to.
//!
//! Each visited piece tallies categories for the elements stacked on its
//! origin tile, on the two tiles either side of it, and for vertical loops on
//! the tiles the loop threads through. Heights are compared in element levels.

use crate::track::{TrackElemType, TrackGraph, TrackPiece};
use crate::world::{Direction, TileCoordsXY, TileElement, TileElementKind};

use super::state::{ProximityCategory as Cat, RatingUpdateState, ScanFlags};

/// Water this many levels below the track counts as low water.
const WATER_LOW_LEVELS: i32 = 2;
/// Water at least this many levels below the track counts as high track.
const WATER_HIGH_LEVELS: i32 = 16;
/// Lateral neighbours within this many levels count as close.
const SIDE_CLOSE_LEVELS: i32 = 2;
/// Height window of a vertical loop above its base.
const LOOP_WINDOW_LEVELS: i32 = 16;

/// Heights and identity of the element being scored.
#[derive(Clone, Copy, Debug)]
struct Input {
    tile: TileCoordsXY,
    z: i32,
    base: i32,
    clearance: i32,
    direction: Direction,
    piece: TrackPiece,
}

impl Input {
    fn new(piece: &TrackPiece) -> Self {
        let base = piece.origin.z;
        Self {
            tile: piece.origin.xy(),
            z: base,
            base,
            clearance: base + piece.track_type.def().clearance as i32,
            direction: piece.direction,
            piece: *piece,
        }
    }
}

/// Scores the piece at the scan cursor.
///
/// Does nothing but count brakes and reversers while the current station has
/// no entrance. Returns true when the scorer ran.
pub fn score_close_proximity<G: TrackGraph + ?Sized>(
    graph: &G,
    state: &mut RatingUpdateState,
    piece: &TrackPiece,
) -> bool {
    if state.station_flags.contains(ScanFlags::NO_ENTRANCE) {
        return false;
    }
    state.proximity_total = state.proximity_total.saturating_add(1);

    let input = Input::new(piece);
    score_own_tile(graph, state, &input);
    score_side(graph, state, &input, input.direction.rotate_cw());
    score_side(graph, state, &input, input.direction.rotate_ccw());
    score_loops(graph, state, &input);

    match state.proximity_track_type {
        Some(TrackElemType::Brakes) => state.num_brakes = state.num_brakes.saturating_add(1),
        Some(TrackElemType::LeftReverser | TrackElemType::RightReverser) => {
            state.num_reversers = state.num_reversers.saturating_add(1);
        }
        _ => {}
    }
    true
}

fn score_own_tile<G: TrackGraph + ?Sized>(
    graph: &G,
    state: &mut RatingUpdateState,
    input: &Input,
) {
    for element in graph.elements_at(input.tile).iter().filter(|e| !e.ghost) {
        let (base, clearance) = (element.base_z(), element.clearance_z());
        match element.kind {
            TileElementKind::Surface { water_height } => {
                state.proximity_base_height = base;
                if base == input.z {
                    state.increment(Cat::SurfaceTouch);
                }
                score_water(state, water_height as i32, input.z);
            }
            TileElementKind::Path { queue: false } => {
                if clearance == input.base {
                    state.increment(Cat::PathTouchAbove);
                }
                if base == input.clearance {
                    state.increment(Cat::PathTouchUnder);
                }
            }
            TileElementKind::Path { queue: true } => {
                if clearance <= input.base {
                    state.increment(Cat::QueuePathOver);
                }
                if clearance == input.base {
                    state.increment(Cat::QueuePathTouchAbove);
                }
                if base == input.clearance {
                    state.increment(Cat::QueuePathTouchUnder);
                }
            }
            TileElementKind::Track(track) => {
                if track.track_type.is_vertical_loop()
                    && matches!(track.sequence, 3 | 6)
                    && base - input.clearance <= 10
                {
                    state.increment(Cat::ThroughVerticalLoop);
                }
                if track.ride != input.piece.ride {
                    score_foreign_track(state, input, base, clearance);
                } else {
                    score_own_track(state, input, element, track.track_type.is_station());
                }
            }
            _ => {}
        }
    }
}

fn score_water(state: &mut RatingUpdateState, water: i32, z: i32) {
    if water == 0 || water > z {
        return;
    }
    state.increment(Cat::WaterOver);
    if water == z {
        state.increment(Cat::WaterTouch);
    }
    if water + WATER_LOW_LEVELS == z {
        state.increment(Cat::WaterLow);
    }
    if water + WATER_HIGH_LEVELS <= z {
        state.increment(Cat::WaterHigh);
    }
}

fn score_foreign_track(state: &mut RatingUpdateState, input: &Input, base: i32, clearance: i32) {
    state.increment(Cat::ForeignTrackAboveOrBelow);
    if clearance == input.base {
        state.increment(Cat::ForeignTrackTouchAbove);
    }
    if clearance + 2 <= input.base && clearance + 10 >= input.base {
        state.increment(Cat::ForeignTrackCloseAbove);
    }
    if input.clearance == base {
        state.increment(Cat::ForeignTrackTouchAbove);
    }
    // Only the exact two-level gap counts from below.
    if input.clearance + 2 == base {
        state.increment(Cat::ForeignTrackCloseAbove);
    }
}

fn score_own_track(
    state: &mut RatingUpdateState,
    input: &Input,
    element: &TileElement,
    is_station: bool,
) {
    let (base, clearance) = (element.base_z(), element.clearance_z());
    let touch = |state: &mut RatingUpdateState| {
        state.increment(Cat::OwnTrackTouchAbove);
        if is_station {
            state.increment(Cat::OwnStationTouchAbove);
        }
    };
    if clearance == input.base {
        touch(state);
    }
    if input.clearance == base {
        touch(state);
    }

    let close = |state: &mut RatingUpdateState| {
        state.increment(Cat::OwnTrackCloseAbove);
        if is_station {
            state.increment(Cat::OwnStationCloseAbove);
        }
    };
    if clearance + 2 <= input.base && clearance + 10 >= input.base {
        close(state);
    }
    if input.clearance + 2 <= base && input.clearance + 10 >= base {
        close(state);
    }
}

/// Scores the neighbour tile on one side of the piece.
fn score_side<G: TrackGraph + ?Sized>(
    graph: &G,
    state: &mut RatingUpdateState,
    input: &Input,
    side: Direction,
) {
    let tile = input.tile.step(side);
    if !graph.is_valid_tile(tile) {
        return;
    }
    for element in graph.elements_at(tile).iter().filter(|e| !e.ghost) {
        let (base, clearance) = (element.base_z(), element.clearance_z());
        match element.kind {
            TileElementKind::Surface { .. } => {
                if state.proximity_base_height <= input.base && input.clearance <= base {
                    state.increment(Cat::SurfaceSideClose);
                }
            }
            TileElementKind::Path { .. } => {
                if (input.base - base).abs() <= SIDE_CLOSE_LEVELS {
                    state.increment(Cat::PathSideClose);
                }
            }
            TileElementKind::Track(track) => {
                if track.ride != input.piece.ride && (input.base - base).abs() <= SIDE_CLOSE_LEVELS
                {
                    state.increment(Cat::ForeignTrackSideClose);
                }
            }
            TileElementKind::SmallScenery | TileElementKind::LargeScenery => {
                if base < input.clearance {
                    if input.base > clearance {
                        state.increment(Cat::ScenerySideAbove);
                    } else {
                        state.increment(Cat::ScenerySideBelow);
                    }
                }
            }
            TileElementKind::Entrance { .. } => {}
        }
    }
}

/// Scores paths and crossing track threading a vertical loop.
fn score_loops<G: TrackGraph + ?Sized>(graph: &G, state: &mut RatingUpdateState, input: &Input) {
    if !input.piece.track_type.is_vertical_loop() {
        return;
    }
    for tile in [input.tile, input.tile.step(input.direction)] {
        for element in graph.elements_at(tile).iter().filter(|e| !e.ghost) {
            let rise = element.base_z() - input.base;
            let in_window = (0..=LOOP_WINDOW_LEVELS).contains(&rise);
            match element.kind {
                TileElementKind::Path { .. } if in_window => {
                    state.increment(Cat::PathThroughVerticalLoop);
                }
                TileElementKind::Track(track)
                    if in_window && track.direction.is_perpendicular_to(input.direction) =>
                {
                    state.increment(Cat::TrackThroughVerticalLoop);
                    if track.track_type.is_vertical_loop() {
                        state.increment(Cat::IntersectingVerticalLoop);
                    }
                }
                _ => {}
            }
        }
    }
}

#[inline]
fn capped(x: u32, max: u32, multiplier: u32) -> u32 {
    (x.min(max) * multiplier) >> 16
}

#[inline]
fn capped_with_bonus(x: u32, bonus: u32, max: u32, multiplier: u32) -> u32 {
    let x = if x != 0 { x + bonus } else { 0 };
    capped(x, max, multiplier)
}

#[inline]
fn flat_if_any(x: u32, value: u32) -> u32 {
    if x == 0 { 0 } else { value }
}

/// Weighted sum of the tallies; the excitement input of the proximity bonus.
pub fn proximity_score(state: &RatingUpdateState) -> u32 {
    let s = |category: Cat| state.score(category) as u32;
    capped(s(Cat::WaterOver), 60, 0x00AAAA)
        + capped(s(Cat::WaterTouch), 22, 0x0245D1)
        + capped(s(Cat::WaterLow), 10, 0x020000)
        + capped(s(Cat::WaterHigh), 40, 0x00A000)
        + capped(s(Cat::SurfaceTouch), 70, 0x01B6DB)
        + capped(s(Cat::QueuePathOver) + 8, 12, 0x064000)
        + flat_if_any(s(Cat::QueuePathTouchAbove), 40)
        + flat_if_any(s(Cat::QueuePathTouchUnder), 45)
        + capped_with_bonus(s(Cat::PathTouchAbove), 10, 20, 0x03C000)
        + capped_with_bonus(s(Cat::PathTouchUnder), 10, 20, 0x044000)
        + capped_with_bonus(s(Cat::OwnTrackTouchAbove), 10, 15, 0x035555)
        + capped(s(Cat::OwnTrackCloseAbove), 5, 0x060000)
        + capped_with_bonus(s(Cat::ForeignTrackAboveOrBelow), 10, 15, 0x02AAAA)
        + capped_with_bonus(s(Cat::ForeignTrackTouchAbove), 10, 15, 0x04AAAA)
        + capped(s(Cat::ForeignTrackCloseAbove), 5, 0x090000)
        + capped(s(Cat::ScenerySideBelow), 35, 0x016DB6)
        + capped(s(Cat::ScenerySideAbove), 35, 0x00DB6D)
        + flat_if_any(s(Cat::OwnStationTouchAbove), 55)
        + flat_if_any(s(Cat::OwnStationCloseAbove), 25)
        + capped_with_bonus(s(Cat::TrackThroughVerticalLoop), 4, 6, 0x140000)
        + capped_with_bonus(s(Cat::PathThroughVerticalLoop), 4, 6, 0x0F0000)
        + flat_if_any(s(Cat::IntersectingVerticalLoop), 100)
        + capped_with_bonus(s(Cat::ThroughVerticalLoop), 4, 6, 0x0A0000)
        + capped_with_bonus(s(Cat::PathSideClose), 10, 20, 0x01C000)
        + capped_with_bonus(s(Cat::ForeignTrackSideClose), 10, 20, 0x024000)
        + capped_with_bonus(s(Cat::SurfaceSideClose), 10, 20, 0x028000)
}
