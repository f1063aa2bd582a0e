//! Geometric test run.
//!
//! Walks a circuit once from a station and measures what a test train would:
//! length and time per station segment, speeds, G-forces, drops, turns,
//! inversions, special elements and shelter. Speeds follow a conserved
//! energy model: lifts and stations set the train's energy, gravity converts
//! height to speed, boosters add and brakes remove energy.

use arrayvec::ArrayVec;

use crate::config::SimConfig;
use crate::ride::{RideStats, ShelteredFlags, SpecialElements};
use crate::world::StationIndex;

use super::{CircuitIterator, TrackFlags, TrackGraph, TrackPiece};

/// Speed squared (mph²) gained per level of descent.
const GRAVITY: i64 = 128;
/// Speed at which trains leave a station without a lift.
const STATION_SPEED_MPH: i64 = 5;
/// Energy added by one booster piece.
const BOOSTER_ENERGY: i64 = 256;
/// Speed held by brake pieces.
const BRAKE_SPEED_MPH: i64 = 10;
/// Energy lost to friction per piece.
const FRICTION: i64 = 2;

/// Length and travel time from one station to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegmentSurvey {
    pub station: StationIndex,
    /// 16.16 fixed point.
    pub length: i32,
    pub time: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurveyReport {
    pub stats: RideStats,
    pub segments: ArrayVec<SegmentSurvey, { SimConfig::MAX_STATIONS_PER_RIDE }>,
    pub pieces: usize,
    /// True when the walk returned to its start piece.
    pub looped: bool,
}

impl SurveyReport {
    pub fn total_length(&self) -> i32 {
        self.segments.iter().map(|segment| segment.length).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TurnClass {
    Flat,
    Banked,
    Sloped,
}

#[derive(Default)]
struct Surveyor {
    stats: RideStats,
    segments: ArrayVec<SegmentSurvey, { SimConfig::MAX_STATIONS_PER_RIDE }>,
    energy: i64,
    previous_rise: i8,
    drop_start: Option<i32>,
    turn_run: Option<(TurnClass, usize)>,
    on_chain: bool,
    sheltered: bool,
    speed_length_sum: i64,
    length_sum: i64,
}

impl Surveyor {
    fn speed_sq(&self, height: i32) -> i64 {
        (self.energy - GRAVITY * height as i64).max(1)
    }

    fn segment(&mut self, station: StationIndex) -> Option<&mut SegmentSurvey> {
        if self.segments.last().map(|segment| segment.station) != Some(station) {
            let _ = self.segments.try_push(SegmentSurvey {
                station,
                ..SegmentSurvey::default()
            });
        }
        self.segments.last_mut()
    }

    fn visit<G: TrackGraph + ?Sized>(&mut self, graph: &G, piece: &TrackPiece, lift_speed: i64) {
        let def = piece.track_type.def();
        let flags = def.flags;
        let entry = piece.entry_height();
        let exit = piece.exit_height();

        if flags.contains(TrackFlags::STATION) {
            let speed = STATION_SPEED_MPH.max(self.speed_sq(entry).isqrt());
            self.energy = speed * speed + GRAVITY * entry as i64;
        }
        let lifted = piece.has_chain || flags.contains(TrackFlags::CABLE_LIFT);
        if lifted {
            self.energy = lift_speed * lift_speed + GRAVITY * exit as i64;
            if !self.on_chain {
                self.stats.powered_lifts =
                    (self.stats.powered_lifts + 1).min(RideStats::MAX_POWERED_LIFTS);
            }
        }
        self.on_chain = lifted;
        if flags.contains(TrackFlags::BOOSTER) {
            self.energy += BOOSTER_ENERGY;
        }
        if flags.contains(TrackFlags::BRAKES) || flags.contains(TrackFlags::BLOCK_BRAKES) {
            let cap = BRAKE_SPEED_MPH * BRAKE_SPEED_MPH + GRAVITY * exit as i64;
            self.energy = self.energy.min(cap);
        }

        let speed = self.speed_sq(entry.min(exit)).isqrt();
        self.record_speed(speed, def.length);
        self.record_vertical_g(def.rise(), speed, flags);
        self.record_lateral_g(speed, def.turn, def.blocks.len(), flags);
        self.record_drop(entry, exit);
        self.record_turn(def.turn, def.rise(), flags);
        self.record_elements(flags);
        self.record_shelter(graph, piece, def.length, flags);

        let time = (def.length as i64 * 2 / speed.max(1)).clamp(1, u16::MAX as i64) as u16;
        if let Some(segment) = self.segment(piece.station) {
            segment.length = segment.length.saturating_add((def.length as i32) << 16);
            segment.time = segment.time.saturating_add(time);
        }
        self.previous_rise = def.rise();
        self.energy -= FRICTION;
    }

    fn record_speed(&mut self, speed: i64, length: u16) {
        let fixed = (speed.min(i16::MAX as i64) as i32) << 16;
        self.stats.max_speed = self.stats.max_speed.max(fixed);
        self.speed_length_sum += speed * length as i64;
        self.length_sum += length as i64;
    }

    fn record_vertical_g(&mut self, rise: i8, speed: i64, flags: TrackFlags) {
        let centripetal = (speed * speed / 8) as i32;
        if flags.contains(TrackFlags::VERTICAL_LOOP) {
            let loop_g = 100 + centripetal + centripetal / 3;
            self.stats.max_positive_vertical_g = self.stats.max_positive_vertical_g.max(loop_g);
        }
        if self.previous_rise < 0 && rise >= 0 {
            let valley = 100 + centripetal;
            self.stats.max_positive_vertical_g = self.stats.max_positive_vertical_g.max(valley);
        }
        if self.previous_rise > 0 && rise <= 0 {
            let crest = 100 - centripetal;
            self.stats.max_negative_vertical_g = self.stats.max_negative_vertical_g.min(crest);
            if crest < 0 {
                self.stats.total_air_time = self.stats.total_air_time.saturating_add(4);
            }
        }
    }

    fn record_lateral_g(&mut self, speed: i64, turn: i8, blocks: usize, flags: TrackFlags) {
        if turn == 0 {
            return;
        }
        let radius = blocks.max(1) as i64;
        let mut lateral = (speed * speed * 2 / radius) as i32;
        if flags.contains(TrackFlags::BANKED) {
            lateral /= 2;
        }
        self.stats.max_lateral_g = self.stats.max_lateral_g.max(lateral);
    }

    fn record_drop(&mut self, entry: i32, exit: i32) {
        if exit < entry {
            self.drop_start.get_or_insert(entry);
            return;
        }
        if let Some(top) = self.drop_start.take() {
            self.finish_drop(top, entry);
        }
    }

    fn finish_drop(&mut self, top: i32, bottom: i32) {
        let height = (top - bottom).clamp(0, u8::MAX as i32) as u8;
        self.stats.drops = (self.stats.drops + 1).min(RideStats::MAX_DROPS);
        self.stats.highest_drop_height = self.stats.highest_drop_height.max(height);
    }

    fn record_turn(&mut self, turn: i8, rise: i8, flags: TrackFlags) {
        let class = match (turn, rise, flags.contains(TrackFlags::BANKED)) {
            (0, _, _) => None,
            (_, r, _) if r != 0 => Some(TurnClass::Sloped),
            (_, _, true) => Some(TurnClass::Banked),
            _ => Some(TurnClass::Flat),
        };
        match (self.turn_run, class) {
            (Some((current, run)), Some(next)) if current == next => {
                self.turn_run = Some((current, run + 1));
            }
            (previous, next) => {
                if let Some((current, run)) = previous {
                    self.finish_turn(current, run);
                }
                self.turn_run = next.map(|class| (class, 1));
            }
        }
    }

    fn finish_turn(&mut self, class: TurnClass, run: usize) {
        match class {
            TurnClass::Flat => self.stats.turns.record_flat(run),
            TurnClass::Banked => self.stats.turns.record_banked(run),
            TurnClass::Sloped => {
                self.stats.turns.record_sloped(run);
                if run >= 2 {
                    let sections = u8::try_from(run).unwrap_or(u8::MAX);
                    self.stats.helix_sections = self
                        .stats
                        .helix_sections
                        .saturating_add(sections)
                        .min(RideStats::MAX_HELIX_SECTIONS);
                }
            }
        }
    }

    fn record_elements(&mut self, flags: TrackFlags) {
        if flags.contains(TrackFlags::INVERSION) {
            self.stats.inversions = self.stats.inversions.saturating_add(1);
        }
        if flags.intersects(
            TrackFlags::WATER_SPLASH | TrackFlags::RAPIDS | TrackFlags::SPINNING_TUNNEL,
        ) {
            self.stats.special_elements |= SpecialElements::TUNNEL_SPLASH_OR_RAPIDS;
        }
        if flags.intersects(TrackFlags::WATERFALL | TrackFlags::FLUME_REVERSER) {
            self.stats.special_elements |= SpecialElements::REVERSER_OR_WATERFALL;
        }
        if flags.contains(TrackFlags::WHIRLPOOL) {
            self.stats.special_elements |= SpecialElements::WHIRLPOOL;
        }
    }

    fn record_shelter<G: TrackGraph + ?Sized>(
        &mut self,
        graph: &G,
        piece: &TrackPiece,
        length: u16,
        flags: TrackFlags,
    ) {
        let sheltered = is_sheltered(graph, piece);
        if sheltered {
            self.stats.sheltered_length =
                self.stats.sheltered_length.saturating_add((length as i32) << 16);
            if !self.sheltered {
                self.stats.sheltered_sections =
                    (self.stats.sheltered_sections + 1).min(RideStats::MAX_SHELTERED_SECTIONS);
            }
            if flags.contains(TrackFlags::BANKED) {
                self.stats.sheltered_flags |= ShelteredFlags::BANKING_WHILE_SHELTERED;
            }
        }
        self.sheltered = sheltered;
    }

    fn finish(mut self, pieces: usize, looped: bool) -> SurveyReport {
        if let Some((class, run)) = self.turn_run.take() {
            self.finish_turn(class, run);
        }
        if self.length_sum > 0 {
            let average = self.speed_length_sum / self.length_sum;
            self.stats.average_speed = (average.min(i16::MAX as i64) as i32) << 16;
        }
        SurveyReport {
            stats: self.stats,
            segments: self.segments,
            pieces,
            looped,
        }
    }
}

/// True when something stands above the origin block of `piece`.
pub fn is_sheltered<G: TrackGraph + ?Sized>(graph: &G, piece: &TrackPiece) -> bool {
    let def = piece.track_type.def();
    let origin = piece.block_location(def.blocks[0]);
    let top = origin.z + def.clearance as i32;
    graph
        .elements_at(origin.xy())
        .iter()
        .any(|element| !element.ghost && element.base_z() >= top)
}

/// Runs a test train once around the circuit beginning at `start`.
///
/// `lift_speed` is the chain speed in mph. At most `step_limit` pieces are
/// visited.
pub fn survey_circuit<G: TrackGraph + ?Sized>(
    graph: &G,
    start: TrackPiece,
    lift_speed: u8,
    step_limit: usize,
) -> SurveyReport {
    let mut surveyor = Surveyor {
        energy: STATION_SPEED_MPH * STATION_SPEED_MPH + GRAVITY * start.entry_height() as i64,
        stats: RideStats {
            max_positive_vertical_g: 100,
            max_negative_vertical_g: 100,
            ..RideStats::default()
        },
        ..Surveyor::default()
    };

    let mut it = CircuitIterator::new(graph, start);
    let mut pieces = 0;
    while pieces < step_limit && it.advance() {
        let piece = it.current();
        surveyor.visit(graph, &piece, lift_speed as i64);
        pieces += 1;
    }
    if let Some(top) = surveyor.drop_start.take() {
        surveyor.finish_drop(top, it.current().exit_height());
    }
    tracing::trace!(pieces, looped = it.looped(), "surveyed circuit");
    surveyor.finish(pieces, it.looped())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{LayoutBuilder, TrackElemType};
    use crate::world::{Direction, RideId, TileCoordsXY, TileCoordsXYZ, TileElement, TileMap};

    fn oval_with(middle: &[TrackElemType]) -> Vec<TrackElemType> {
        use TrackElemType::*;
        let mut pieces = vec![BeginStation, EndStation, RightQuarterTurn3, RightQuarterTurn3];
        pieces.extend_from_slice(middle);
        pieces.extend([RightQuarterTurn3, RightQuarterTurn3]);
        pieces
    }

    fn survey(map: &mut TileMap, pieces: &[TrackElemType]) -> SurveyReport {
        let layout = LayoutBuilder::new(RideId(0), TileCoordsXYZ::new(3, 10, 2), Direction::East)
            .pieces(pieces.iter().copied())
            .place(map)
            .expect("layout fits");
        survey_circuit(map, layout.pieces[0], 5, 1000)
    }

    #[test]
    fn flat_oval_has_no_drops_or_shelter() {
        use TrackElemType::*;
        let mut map = TileMap::flat(16, 16, 2);
        let report = survey(&mut map, &oval_with(&[Flat, Flat]));
        assert!(report.looped);
        assert_eq!(report.pieces, 8);
        assert_eq!(report.stats.drops, 0);
        assert_eq!(report.stats.sheltered_length, 0);
        assert_eq!(report.segments.len(), 1);
        assert!(report.total_length() > 0);
        assert!(report.stats.max_speed >= 5 << 16);
    }

    #[test]
    fn right_turns_form_one_run_per_corner() {
        use TrackElemType::*;
        let mut map = TileMap::flat(16, 16, 2);
        let report = survey(&mut map, &oval_with(&[Flat, Flat]));
        // Two corners of two quarter turns each.
        assert_eq!(report.stats.turns.flat, [0, 2, 0]);
        assert!(report.stats.max_lateral_g > 0);
    }

    #[test]
    fn hill_produces_a_drop() {
        use TrackElemType::*;
        let mut map = TileMap::flat(16, 16, 2);
        let report = survey(&mut map, &oval_with(&[FlatToUp25, Up25ToFlat]));
        assert!(!report.looped);

        let mut map = TileMap::flat(24, 24, 2);
        let layout = LayoutBuilder::new(RideId(0), TileCoordsXYZ::new(2, 2, 2), Direction::East)
            .pieces([BeginStation, EndStation])
            .chain(true)
            .pieces([FlatToUp25, Up25, Up25ToFlat])
            .chain(false)
            .pieces([FlatToDown25, Down25, Down25ToFlat, Flat])
            .place(&mut map)
            .expect("layout fits");
        let report = survey_circuit(&map, layout.pieces[0], 5, 100);
        assert_eq!(report.stats.drops, 1);
        assert_eq!(report.stats.highest_drop_height, 4);
        assert_eq!(report.stats.powered_lifts, 1);
        assert!(report.stats.max_speed > 5 << 16);
    }

    #[test]
    fn covered_track_is_sheltered() {
        use TrackElemType::*;
        let mut map = TileMap::flat(16, 16, 2);
        map.push(TileCoordsXY::new(5, 10), TileElement::small_scenery(10, 14));
        let report = survey(&mut map, &oval_with(&[Flat, Flat]));
        assert!(report.stats.sheltered_length > 0);
        assert_eq!(report.stats.sheltered_sections, 1);
    }
}
