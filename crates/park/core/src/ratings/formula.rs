//! The ratings formula.
//!
//! Ratings start from the type's base tuple and pass through its modifier
//! list in order. Every multiplication is 16.16 fixed point and every
//! addition clamps to `0..=i16::MAX` through [`RatingTuple::add`].

use crate::catalog::{
    ModifierKind, RatingsModifier, RideEntry, RideEntryFlags, RideTypeDescriptor, RideTypeFlags,
    SpecialElementRating,
};
use crate::ride::{
    LifecycleFlags, RatingTuple, Ride, RideMode, RideStats, RideType, ShelteredFlags,
    SpecialElements, Station,
};
use crate::track::TrackPiece;
use crate::world::{
    Direction, RideId, RideRegistry, TileCoordsXY, TileCoordsXYZ, TileElementKind, TileMap,
};

/// Excitement is cut by a quarter for each bound the intensity reaches.
const INTENSITY_BOUNDS: [i16; 5] = [1000, 1100, 1200, 1320, 1450];

/// Tiles searched either side of a station for synchronised neighbours.
const ADJACENCY_CHECK_DISTANCE: i32 = 5;

/// Tiles searched around the station for scenery.
const SCENERY_RADIUS: i32 = 5;

/// Score of a station below ground, where no scenery is visible.
const UNDERGROUND_SCENERY_SCORE: i32 = 40;

/// Everything the modifier list reads besides the ride itself.
#[derive(Clone, Copy, Debug)]
pub struct RatingInputs<'a> {
    pub ride: &'a Ride,
    pub descriptor: &'a RideTypeDescriptor,
    pub entry: Option<&'a RideEntry>,
    pub proximity_score: u32,
    pub scenery_score: i32,
    pub num_reversers: u16,
    /// Sheltered eighths measured on the track, before covered vehicles.
    pub track_sheltered_eighths: u8,
    pub synchronised_with_adjacent: bool,
}

/// Sheltered share of the track in eighths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShelteredEighths {
    /// Measured on the track.
    pub track: u8,
    /// After covered vehicles are taken into account.
    pub total: u8,
}

/// Counts the eighths of the total length that run under cover, at most 7.
pub fn sheltered_eighths(ride: &Ride, entry: Option<&RideEntry>) -> ShelteredEighths {
    let eighth = ride.total_length() / 8;
    let sheltered = ride.stats.sheltered_length;
    let mut counter = eighth;
    let mut measured = 0u8;
    for _ in 0..7 {
        if sheltered >= counter {
            counter = counter.saturating_add(eighth);
            measured += 1;
        }
    }

    let Some(entry) = entry else {
        return ShelteredEighths::default();
    };
    let total = if entry.has_flag(RideEntryFlags::COVERED) { 7 } else { measured };
    ShelteredEighths {
        track: measured,
        total,
    }
}

/// Base unreliability plus two per mph the lift runs above the type minimum.
pub fn unreliability_factor(descriptor: &RideTypeDescriptor, lift_hill_speed: u8) -> u8 {
    let extra = lift_hill_speed.saturating_sub(descriptor.lift.min).saturating_mul(2);
    descriptor.ratings.unreliability.saturating_add(extra)
}

/// G-force sub-rating.
pub fn g_force_rating(stats: &RideStats) -> RatingTuple {
    let positive = stats.max_positive_vertical_g;
    let negative = stats.max_negative_vertical_g;
    let lateral = stats.max_lateral_g;

    let excitement = ((positive * 5242) >> 16)
        + ((negative.clamp(-250, 0) * -15728) >> 16)
        + ((lateral.min(150) * 26214) >> 16);
    let intensity = ((positive * 52428) >> 16) + (((negative - 100) * -52428) >> 16) + lateral;
    let nausea = ((positive * 17039) >> 16)
        + (((negative - 100) * -14563) >> 16)
        + ((lateral * 21845) >> 16);
    RatingTuple::from_raw(excitement, intensity, nausea)
}

/// Penalty applied when lateral G-forces are excessive.
pub fn lateral_g_penalty(stats: &RideStats) -> RatingTuple {
    let lateral = stats.max_lateral_g;
    let (mut excitement, mut intensity, mut nausea) = (0, 0, 0);
    if lateral > 280 {
        intensity = 375;
        nausea = 200;
    }
    if lateral > 310 {
        let g_excitement = ((stats.max_positive_vertical_g * 5242) >> 16)
            + ((stats.max_negative_vertical_g.clamp(-250, 0) * -15728) >> 16)
            + ((lateral.min(150) * 26214) >> 16);
        excitement = -(g_excitement / 2);
        intensity = 1225;
        nausea = 600;
    }
    RatingTuple::from_raw(excitement, intensity, nausea)
}

fn fixed(count: u16, multiplier: i32) -> i32 {
    (count as i32 * multiplier) >> 16
}

fn flat_turns(stats: &RideStats) -> (i32, i32, i32) {
    let [one, two, three] = stats.turns.flat;
    (
        fixed(three, 0x28000) + fixed(two, 0x30000) + fixed(one, 63421),
        fixed(three, 81920) + fixed(two, 49152) + fixed(one, 21140),
        fixed(three, 0x50000) + fixed(two, 0x32000) + fixed(one, 42281),
    )
}

fn banked_turns(stats: &RideStats) -> (i32, i32, i32) {
    let [one, two, three] = stats.turns.banked;
    (
        fixed(three, 0x3C000) + fixed(two, 0x3C000) + fixed(one, 73992),
        fixed(three, 0x14000) + fixed(two, 49152) + fixed(one, 21140),
        fixed(three, 0x50000) + fixed(two, 0x32000) + fixed(one, 48623),
    )
}

fn sloped_turns(stats: &RideStats) -> (i32, i32, i32) {
    let [one, two, three, four] = stats.turns.sloped;
    let excitement = fixed(four.min(4), 0x78000)
        + fixed(three.min(6), 273066)
        + fixed(two.min(6), 0x3AAAA)
        + fixed(one.min(7), 187245);
    (excitement, 0, fixed(four.min(8), 0x78000))
}

fn inversions(count: u8) -> (i32, i32, i32) {
    let count = count as u16;
    (
        fixed(count.min(6), 0x1AAAAA),
        fixed(count, 0x320000),
        fixed(count, 0x15AAAA),
    )
}

fn special_elements(stats: &RideStats, rating: SpecialElementRating) -> (i32, i32, i32) {
    let elements = stats.special_elements;
    let (mut excitement, mut intensity, mut nausea) = (0, 0, 0);
    match rating {
        SpecialElementRating::Water => {
            if elements.contains(SpecialElements::TUNNEL_SPLASH_OR_RAPIDS) {
                excitement += 50;
                intensity += 30;
                nausea += 20;
            }
            if elements.contains(SpecialElements::REVERSER_OR_WATERFALL) {
                excitement += 55;
                intensity += 30;
            }
            if elements.contains(SpecialElements::WHIRLPOOL) {
                excitement += 35;
                intensity += 20;
                nausea += 23;
            }
        }
        SpecialElementRating::GhostTrain => {
            if elements.contains(SpecialElements::TUNNEL_SPLASH_OR_RAPIDS) {
                excitement += 40;
                intensity += 25;
                nausea += 55;
            }
        }
        SpecialElementRating::LogFlume => {
            if elements.contains(SpecialElements::REVERSER_OR_WATERFALL) {
                excitement += 48;
                intensity += 55;
                nausea += 65;
            }
        }
    }

    let helices = stats.helix_sections as i32;
    excitement += (helices.min(9) * 254862) >> 16;
    intensity += (helices.min(11) * 148945) >> 16;
    nausea += ((helices - 5).clamp(0, 10) * 0x140000) >> 16;
    (excitement, intensity, nausea)
}

/// Turn sub-rating: special elements, helices, turns and inversions.
///
/// Mini golf counts holes where other rides count inversions.
pub fn turns_rating(ride: &Ride, special: SpecialElementRating) -> RatingTuple {
    let stats = &ride.stats;
    let inverting = if ride.ride_type == RideType::MiniGolf {
        stats.holes
    } else {
        stats.inversions
    };
    let parts = [
        special_elements(stats, special),
        flat_turns(stats),
        banked_turns(stats),
        sloped_turns(stats),
        inversions(inverting),
    ];
    let (excitement, intensity, nausea) = parts
        .iter()
        .fold((0, 0, 0), |(e, i, n), (de, di, dn)| (e + de, i + di, n + dn));
    RatingTuple::from_raw(excitement, intensity, nausea)
}

/// Drop sub-rating.
pub fn drops_rating(stats: &RideStats) -> RatingTuple {
    let drops = (stats.drops & RideStats::MAX_DROPS) as i32;
    let mut rating = RatingTuple::from_raw(
        (drops.min(9) * 728177) >> 16,
        (drops * 928426) >> 16,
        (drops * 655360) >> 16,
    );
    let height = stats.highest_drop_height as i32 * 2;
    rating.add(
        (height * 16000) >> 16,
        (height * 32000) >> 16,
        (height * 10240) >> 16,
    );
    rating
}

/// Shelter sub-rating.
pub fn sheltered_rating(stats: &RideStats) -> RatingTuple {
    let length = stats.sheltered_length >> 16;
    let mut excitement = (length.min(1000) * 9175) >> 16;
    let intensity = (length.min(2000) * 0x2666) >> 16;
    let mut nausea = (length.min(1000) * 0x4000) >> 16;

    for flag in [
        ShelteredFlags::BANKING_WHILE_SHELTERED,
        ShelteredFlags::ROTATING_WHILE_SHELTERED,
    ] {
        if stats.sheltered_flags.contains(flag) {
            excitement += 20;
            nausea += 15;
        }
    }
    excitement += ((stats.sheltered_sections.min(11) as i32) * 774516) >> 16;
    RatingTuple::from_raw(excitement, intensity, nausea)
}

/// Scenery around the first station, five points per item up to 47 items.
pub fn scenery_score(map: &TileMap, ride: &Ride, descriptor: &RideTypeDescriptor) -> i32 {
    let Some((_, station)) = ride.first_station() else {
        return 0;
    };
    let Some(start) = station.start else {
        return 0;
    };
    let location = if descriptor.has_flag(RideTypeFlags::MAZE) {
        ride.stations[0]
            .entrance
            .map(|entrance| entrance.xyz().xy())
            .unwrap_or(start)
    } else {
        start
    };

    let ground = map.surface_height(location).map_or(0, i32::from);
    if ground > station.height as i32 {
        return UNDERGROUND_SCENERY_SCORE;
    }

    let max_x = map.width() as i32 - 1;
    let max_y = map.height() as i32 - 1;
    let mut items = 0usize;
    for y in (location.y - SCENERY_RADIUS).max(0)..=(location.y + SCENERY_RADIUS).min(max_y) {
        for x in (location.x - SCENERY_RADIUS).max(0)..=(location.x + SCENERY_RADIUS).min(max_x) {
            items += map
                .elements_at(TileCoordsXY::new(x, y))
                .iter()
                .filter(|element| {
                    !element.ghost
                        && matches!(
                            element.kind,
                            TileElementKind::SmallScenery | TileElementKind::LargeScenery
                        )
                })
                .count();
        }
    }
    items.min(47) as i32 * 5
}

/// True when a ride departs in sync with its neighbours.
fn synchronises(ride: &Ride) -> bool {
    ride.stations
        .iter()
        .any(|station| station.depart & Station::DEPART_FLAG != 0)
}

/// Station platform within `tolerance` levels of `z` on `tile`.
fn station_platform(map: &TileMap, tile: TileCoordsXY, z: i32, tolerance: i32) -> Option<TrackPiece> {
    map.elements_at(tile).iter().find_map(|element| {
        let track = element.as_track()?;
        (track.track_type.is_station() && (element.base_z() - z).abs() <= tolerance)
            .then(|| TrackPiece::from_element(tile, element, track))
    })
}

fn synchronised_station_towards(
    map: &TileMap,
    rides: &RideRegistry,
    start: TileCoordsXYZ,
    direction: Direction,
) -> bool {
    let mut tile = start.xy();
    let mut found = false;
    for _ in 0..=ADJACENCY_CHECK_DISTANCE {
        tile = tile.step(direction);
        if let Some(platform) = station_platform(map, tile, start.z, 2) {
            if rides.get(platform.ride).is_some_and(synchronises) {
                found = true;
            }
        }
    }
    found
}

/// True when the ride synchronises and a station beside one of its
/// platforms belongs to a ride that synchronises too.
pub fn has_adjacent_synchronised_station(map: &TileMap, rides: &RideRegistry, ride: RideId) -> bool {
    let Some(ride) = rides.get(ride) else {
        return false;
    };
    if !synchronises(ride) {
        return false;
    }
    ride.populated_stations().any(|(_, station)| {
        let Some(start) = station.start_location() else {
            return false;
        };
        let Some(platform) = station_platform(map, start.xy(), start.z, 0) else {
            return false;
        };
        let side = platform.direction.rotate_cw();
        synchronised_station_towards(map, rides, start, side)
            || synchronised_station_towards(map, rides, start, side.reverse())
    })
}

#[inline]
fn scaled(rating: i16, coefficient: i32) -> i32 {
    (rating as i32 * coefficient) >> 16
}

fn add_scaled(ratings: &mut RatingTuple, sub: RatingTuple, modifier: &RatingsModifier) {
    ratings.add(
        scaled(sub.excitement, modifier.excitement),
        scaled(sub.intensity, modifier.intensity),
        scaled(sub.nausea, modifier.nausea),
    );
}

#[inline]
fn divide(rating: i16, divisor: i32) -> i16 {
    let divisor = if divisor == 0 { 1 } else { divisor };
    (rating as i32 / divisor) as i16
}

fn divide_all(ratings: &mut RatingTuple, modifier: &RatingsModifier) {
    ratings.excitement = divide(ratings.excitement, modifier.excitement);
    ratings.intensity = divide(ratings.intensity, modifier.intensity);
    ratings.nausea = divide(ratings.nausea, modifier.nausea);
}

fn operation_option_term(option: i32, coefficient: i32) -> i32 {
    if coefficient >= 0 {
        option * coefficient
    } else {
        option / -coefficient
    }
}

/// Applies one entry of a modifier list.
pub fn apply_modifier(ratings: &mut RatingTuple, inputs: &RatingInputs<'_>, modifier: &RatingsModifier) {
    use ModifierKind::*;

    let ride = inputs.ride;
    let stats = &ride.stats;
    let m = modifier;
    let length = ride.total_length() >> 16;

    if inputs.descriptor.ratings.relax_requirements_if_inversions
        && m.kind.relaxed_by_inversions()
        && stats.inversions > 0
    {
        return;
    }

    match m.kind {
        BonusLength => ratings.add((length.min(m.threshold) * m.excitement) >> 16, 0, 0),
        BonusSynchronisation => {
            if inputs.synchronised_with_adjacent {
                ratings.add(m.excitement, m.intensity, m.nausea);
            }
        }
        BonusTrainLength => {
            let cars = ride.num_cars_per_train as i32 - 1;
            ratings.add((cars * m.excitement) >> 16, 0, 0);
        }
        BonusMaxSpeed => {
            let speed = stats.max_speed >> 16;
            ratings.add(
                (speed * m.excitement) >> 16,
                (speed * m.intensity) >> 16,
                (speed * m.nausea) >> 16,
            );
        }
        BonusAverageSpeed => {
            let speed = stats.average_speed >> 16;
            ratings.add((speed * m.excitement) >> 16, (speed * m.intensity) >> 16, 0);
        }
        BonusDuration => {
            ratings.add((ride.total_time().min(m.threshold) * m.excitement) >> 16, 0, 0);
        }
        BonusGForces => add_scaled(ratings, g_force_rating(stats), m),
        BonusTurns => add_scaled(ratings, turns_rating(ride, inputs.descriptor.special_elements), m),
        BonusDrops => add_scaled(ratings, drops_rating(stats), m),
        BonusSheltered => add_scaled(ratings, sheltered_rating(stats), m),
        BonusProximity => {
            let score = inputs.proximity_score as i64 * m.excitement as i64;
            ratings.add((score >> 16) as i32, 0, 0);
        }
        BonusScenery => ratings.add((inputs.scenery_score * m.excitement) >> 16, 0, 0),
        BonusRotations => {
            let rotations = ride.rotations as i32;
            ratings.add(rotations * m.excitement, rotations * m.intensity, rotations * m.nausea);
        }
        BonusOperationOption => {
            let option = ride.operation_option as i32;
            ratings.add(
                operation_option_term(option, m.excitement),
                operation_option_term(option, m.intensity),
                operation_option_term(option, m.nausea),
            );
        }
        BonusReversedTrains => {
            if ride.lifecycle_flags.contains(LifecycleFlags::REVERSED_TRAINS) {
                ratings.add(
                    (ratings.excitement as i32 * m.excitement) >> 7,
                    (ratings.intensity as i32 * m.intensity) >> 7,
                    (ratings.nausea as i32 * m.nausea) >> 7,
                );
            }
        }
        BonusGoKartRace => {
            if ride.mode == RideMode::Race && ride.num_trains as i32 >= m.threshold {
                ratings.add(m.excitement, m.intensity, m.nausea);
                let laps = (ride.num_laps as i32 - 1) * 30;
                ratings.add(laps, laps / 2, 0);
            }
        }
        BonusTowerRide => ratings.add(
            (length * m.excitement) >> 16,
            m.intensity,
            (length * m.nausea) >> 16,
        ),
        BonusRotoDrop => {
            let factor = (length * m.excitement) >> 16;
            ratings.add(factor, factor * m.intensity, factor * m.nausea);
        }
        BonusMazeSize => {
            let size = (stats.maze_tiles as i32).min(m.threshold);
            ratings.add(size * m.excitement, size * m.intensity, size * m.nausea);
        }
        BonusBoatHireNoCircuit => {
            if !ride.lifecycle_flags.contains(LifecycleFlags::TESTED) {
                ratings.add(m.excitement, m.intensity, m.nausea);
            }
        }
        BonusSlideUnlimitedRides => {
            if ride.mode == RideMode::UnlimitedRidesPerAdmission {
                ratings.add(m.excitement, m.intensity, m.nausea);
            }
        }
        BonusMotionSimulatorMode => match ride.mode {
            RideMode::FilmThrillRiders => ratings.set(325, 410, 330),
            _ => ratings.set(290, 350, 300),
        },
        Bonus3dCinemaMode => match ride.mode {
            RideMode::StormChasers3dFilm => ratings.set(400, 265, 155),
            RideMode::SpaceRaiders3dFilm => ratings.set(420, 260, 148),
            _ => ratings.set(350, 240, 140),
        },
        BonusTopSpinMode => match ride.mode {
            RideMode::Intense => ratings.set(300, 575, 664),
            RideMode::Berserk => ratings.set(320, 680, 794),
            _ => ratings.set(200, 480, 574),
        },
        BonusReversals => {
            let reversers = (inputs.num_reversers as i32).min(m.threshold);
            ratings.add(reversers * m.excitement, reversers * m.intensity, reversers * m.nausea);
        }
        BonusHoles => {
            let holes = stats.holes as i32;
            ratings.add(holes * m.excitement, holes * m.intensity, holes * m.nausea);
        }
        BonusNumTrains => {
            if ride.num_trains as i32 >= m.threshold {
                ratings.add(m.excitement, m.intensity, m.nausea);
            }
        }
        BonusDownwardLaunch => {
            if ride.mode == RideMode::DownwardLaunch {
                ratings.add(m.excitement, m.intensity, m.nausea);
            }
        }
        BonusLaunchedFreefallSpecial => {
            ratings.add((length * m.excitement) >> 16, 0, 0);
            if ride.mode == RideMode::UpwardLaunch {
                let option = ride.operation_option as i32;
                ratings.add(0, (option * m.intensity) >> 16, (option * m.nausea) >> 16);
            } else {
                let factor = (length * 209715) >> 16;
                ratings.add(factor, factor * 2, factor * 2);
            }
        }
        RequirementLength => {
            let first = ride.first_station().map_or(0, |(_, station)| station.segment_length);
            if first < m.threshold {
                divide_all(ratings, m);
            }
        }
        RequirementDropHeight => {
            if (stats.highest_drop_height as i32) < m.threshold {
                divide_all(ratings, m);
            }
        }
        RequirementMaxSpeed => {
            if stats.max_speed < m.threshold {
                divide_all(ratings, m);
            }
        }
        RequirementNumDrops => {
            if ((stats.drops & RideStats::MAX_DROPS) as i32) < m.threshold {
                divide_all(ratings, m);
            }
        }
        RequirementNegativeGs => {
            if stats.max_negative_vertical_g >= m.threshold {
                divide_all(ratings, m);
            }
        }
        RequirementLateralGs => {
            if stats.max_lateral_g < m.threshold {
                divide_all(ratings, m);
            }
        }
        RequirementInversions => {
            if (stats.inversions as i32) < m.threshold {
                divide_all(ratings, m);
            }
        }
        RequirementUnsheltered => {
            if inputs.track_sheltered_eighths as i32 >= m.threshold {
                divide_all(ratings, m);
            }
        }
        RequirementReversals => {
            if (inputs.num_reversers as i32) < m.threshold {
                divide_all(ratings, m);
            }
        }
        RequirementHoles => {
            if (stats.holes as i32) < m.threshold {
                divide_all(ratings, m);
            }
        }
        RequirementStations => {
            if ride.num_stations() as i32 <= m.threshold {
                ratings.excitement = 0;
                ratings.intensity = divide(ratings.intensity, m.intensity);
                ratings.nausea = divide(ratings.nausea, m.nausea);
            }
        }
        RequirementSplashdown => {
            if !stats
                .special_elements
                .contains(SpecialElements::TUNNEL_SPLASH_OR_RAPIDS)
            {
                divide_all(ratings, m);
            }
        }
        PenaltyLateralGs => add_scaled(ratings, lateral_g_penalty(stats), m),
    }
}

/// Cuts excitement as intensity climbs past each bound.
pub fn apply_intensity_penalty(ratings: &mut RatingTuple) {
    let mut excitement = ratings.excitement;
    for bound in INTENSITY_BOUNDS {
        if ratings.intensity >= bound {
            excitement -= excitement / 4;
        }
    }
    ratings.excitement = excitement;
}

/// Vehicle multipliers and the air time bonus.
pub fn apply_adjustments(
    ratings: &mut RatingTuple,
    ride: &Ride,
    descriptor: &RideTypeDescriptor,
    entry: Option<&RideEntry>,
) {
    let Some(entry) = entry else {
        return;
    };
    ratings.add(
        (ratings.excitement as i32 * entry.excitement_multiplier as i32) >> 7,
        (ratings.intensity as i32 * entry.intensity_multiplier as i32) >> 7,
        (ratings.nausea as i32 * entry.nausea_multiplier as i32) >> 7,
    );

    if descriptor.has_flag(RideTypeFlags::HAS_AIR_TIME) {
        let air_time = ride.stats.total_air_time;
        let excitement = if entry.has_flag(RideEntryFlags::LIMIT_AIRTIME_BONUS) {
            air_time.min(96) / 8
        } else {
            air_time / 8
        };
        ratings.add(excitement as i32, 0, (air_time / 16) as i32);
    }
}

/// Base ratings through the modifier list, the intensity penalty and the
/// vehicle adjustments.
pub fn compute_ratings(inputs: &RatingInputs<'_>) -> RatingTuple {
    let rules = &inputs.descriptor.ratings;
    let mut ratings = rules.base;
    for modifier in &rules.modifiers {
        apply_modifier(&mut ratings, inputs, modifier);
    }
    apply_intensity_penalty(&mut ratings);
    apply_adjustments(&mut ratings, inputs.ride, inputs.descriptor, inputs.entry);
    ratings
}
