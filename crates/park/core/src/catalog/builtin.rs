//! The classic ride set.
//!
//! Coefficients are the fixed-point multipliers of the original game's
//! rating functions; see [`ModifierKind`] for how each one is read.

use crate::ride::{BreakdownKind, RatingTuple, RideMode, RideType};
use crate::world::RideEntryId;

use super::{
    CarSpec, LiftSpeeds, ModifierKind, RatingsCalcType, RatingsDescriptor, RatingsModifier,
    RatingsMultipliers, RideCatalog, RideEntry, RideEntryFlags, RideTypeDescriptor,
    RideTypeFlags, SpecialElementRating, UpkeepCosts, breakdown_mask,
};

use BreakdownKind::*;
use ModifierKind::*;

const fn m(kind: ModifierKind, threshold: i32, e: i32, i: i32, n: i32) -> RatingsModifier {
    RatingsModifier::new(kind, threshold, e, i, n)
}

const COASTER_BREAKDOWNS: u8 = breakdown_mask(&[
    SafetyCutOut,
    RestraintsStuckClosed,
    RestraintsStuckOpen,
    VehicleMalfunction,
    BrakesFailure,
]);
const TOWER_BREAKDOWNS: u8 = breakdown_mask(&[
    SafetyCutOut,
    RestraintsStuckClosed,
    RestraintsStuckOpen,
    VehicleMalfunction,
]);
const SAFETY_ONLY: u8 = breakdown_mask(&[SafetyCutOut]);
const SAFETY_AND_VEHICLE: u8 = breakdown_mask(&[SafetyCutOut, VehicleMalfunction]);
const SAFETY_AND_CONTROL: u8 = breakdown_mask(&[SafetyCutOut, ControlFailure]);
const VEHICLE_ONLY: u8 = breakdown_mask(&[VehicleMalfunction]);

const TRACKED: RideTypeFlags = RideTypeFlags::HAS_TRACK.union(RideTypeFlags::RUNNING_TRACK);
const COASTER: RideTypeFlags = TRACKED.union(RideTypeFlags::HAS_AIR_TIME);
const FLAT: RideTypeFlags = RideTypeFlags::FLAT_RIDE;
const SHOP: RideTypeFlags = RideTypeFlags::SHOP
    .union(RideTypeFlags::FLAT_RIDE)
    .union(RideTypeFlags::NO_VEHICLES);

const fn upkeep(base: u16, track_piece: u16, per_train: u16, per_car: u16, per_station: u16) -> UpkeepCosts {
    UpkeepCosts {
        base,
        track_piece,
        per_train,
        per_car,
        per_station,
        per_reverser: UpkeepCosts::DEFAULT_PER_REVERSER,
    }
}

struct Spec {
    ride_type: RideType,
    flags: RideTypeFlags,
    modes: &'static [RideMode],
    calc_type: RatingsCalcType,
    base: (i16, i16, i16),
    unreliability: u8,
    sheltered_eighths: Option<u8>,
    modifiers: Vec<RatingsModifier>,
    value: (i32, i32, i32),
    upkeep: UpkeepCosts,
    lift: (u8, u8),
    breakdowns: u8,
    max_mass: u8,
}

impl Spec {
    fn new(ride_type: RideType, flags: RideTypeFlags, modes: &'static [RideMode]) -> Self {
        Self {
            ride_type,
            flags,
            modes,
            calc_type: RatingsCalcType::Normal,
            base: (0, 0, 0),
            unreliability: 0,
            sheltered_eighths: None,
            modifiers: Vec::new(),
            value: (0, 0, 0),
            upkeep: upkeep(50, 0, 0, 0, 0),
            lift: (5, 5),
            breakdowns: 0,
            max_mass: u8::MAX,
        }
    }

    fn flat(mut self, sheltered_eighths: u8) -> Self {
        self.calc_type = RatingsCalcType::FlatRide;
        self.sheltered_eighths = Some(sheltered_eighths);
        self
    }

    fn ratings(mut self, base: (i16, i16, i16), unreliability: u8) -> Self {
        self.base = base;
        self.unreliability = unreliability;
        self
    }

    fn modifiers(mut self, modifiers: impl IntoIterator<Item = RatingsModifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    fn value(mut self, e: i32, i: i32, n: i32) -> Self {
        self.value = (e, i, n);
        self
    }

    fn upkeep(mut self, costs: UpkeepCosts) -> Self {
        self.upkeep = costs;
        self
    }

    fn lift(mut self, min: u8, max: u8) -> Self {
        self.lift = (min, max);
        self
    }

    fn breakdowns(mut self, mask: u8) -> Self {
        self.breakdowns = mask;
        self
    }

    fn max_mass(mut self, max_mass: u8) -> Self {
        self.max_mass = max_mass;
        self
    }

    fn build(self, relax: bool, special_elements: SpecialElementRating) -> RideTypeDescriptor {
        let (e, i, n) = self.base;
        RideTypeDescriptor {
            ride_type: self.ride_type,
            flags: self.flags,
            modes: self.modes.to_vec(),
            ratings: RatingsDescriptor {
                calc_type: self.calc_type,
                base: RatingTuple::new(e, i, n),
                unreliability: self.unreliability,
                sheltered_eighths: self.sheltered_eighths,
                relax_requirements_if_inversions: relax,
                modifiers: self.modifiers,
            },
            value_multipliers: RatingsMultipliers::new(self.value.0, self.value.1, self.value.2),
            upkeep: self.upkeep,
            lift: LiftSpeeds {
                min: self.lift.0,
                max: self.lift.1,
            },
            available_breakdowns: self.breakdowns,
            max_mass: self.max_mass,
            special_elements,
        }
    }

    fn done(self) -> RideTypeDescriptor {
        self.build(false, SpecialElementRating::Water)
    }
}

fn stall(ride_type: RideType) -> RideTypeDescriptor {
    RideTypeDescriptor {
        ride_type,
        flags: SHOP,
        modes: vec![RideMode::ShopStall],
        ratings: RatingsDescriptor::stall(),
        value_multipliers: RatingsMultipliers::default(),
        upkeep: upkeep(50, 0, 0, 0, 0),
        lift: LiftSpeeds::default(),
        available_breakdowns: 0,
        max_mass: u8::MAX,
        special_elements: SpecialElementRating::Water,
    }
}

fn descriptors() -> Vec<RideTypeDescriptor> {
    use RideMode as Mode;
    use RideType::*;

    vec![
        Spec::new(
            LoopingCoaster,
            COASTER,
            &[
                Mode::ContinuousCircuit,
                Mode::ContinuousCircuitBlockSectioned,
                Mode::ReverseInclineLaunchedShuttle,
                Mode::PoweredLaunchPasstrough,
                Mode::PoweredLaunch,
                Mode::PoweredLaunchBlockSectioned,
            ],
        )
        .ratings((300, 50, 20), 15)
        .modifiers([
            m(BonusLength, 6000, 764, 0, 0),
            m(BonusSynchronisation, 0, 40, 5, 0),
            m(BonusTrainLength, 0, 187245, 0, 0),
            m(BonusMaxSpeed, 0, 44281, 88562, 35424),
            m(BonusAverageSpeed, 0, 291271, 436906, 0),
            m(BonusDuration, 150, 26214, 0, 0),
            m(BonusGForces, 0, 24576, 35746, 49648),
            m(BonusTurns, 0, 26749, 34767, 45749),
            m(BonusDrops, 0, 29127, 46811, 49152),
            m(BonusSheltered, 0, 15420, 32768, 35108),
            m(BonusProximity, 0, 20130, 0, 0),
            m(BonusScenery, 0, 6693, 0, 0),
            m(RequirementDropHeight, 14, 2, 2, 2),
            m(RequirementMaxSpeed, 0xA0000, 2, 2, 2),
            m(RequirementNegativeGs, 10, 2, 2, 2),
            m(RequirementNumDrops, 2, 2, 2, 2),
            m(PenaltyLateralGs, 0, 24576, 38130, 49648),
        ])
        .value(50, 30, 10)
        .upkeep(upkeep(40, 80, 10, 3, 10))
        .lift(4, 6)
        .breakdowns(COASTER_BREAKDOWNS)
        .max_mass(18)
        .build(true, SpecialElementRating::Water),
        Spec::new(
            JuniorCoaster,
            COASTER,
            &[Mode::ContinuousCircuit, Mode::ContinuousCircuitBlockSectioned],
        )
        .ratings((240, 250, 180), 13)
        .modifiers([
            m(BonusLength, 6000, 764, 0, 0),
            m(BonusSynchronisation, 0, 40, 5, 0),
            m(BonusTrainLength, 0, 187245, 0, 0),
            m(BonusMaxSpeed, 0, 44281, 88562, 35424),
            m(BonusAverageSpeed, 0, 291271, 436906, 0),
            m(BonusDuration, 150, 26214, 0, 0),
            m(BonusGForces, 0, 20480, 23831, 49648),
            m(BonusTurns, 0, 26749, 34767, 45749),
            m(BonusDrops, 0, 29127, 46811, 49152),
            m(BonusSheltered, 0, 25700, 30583, 35108),
            m(BonusProximity, 0, 20130, 0, 0),
            m(BonusScenery, 0, 9760, 0, 0),
            m(RequirementDropHeight, 6, 2, 2, 2),
            m(RequirementMaxSpeed, 0x70000, 2, 2, 2),
            m(RequirementNumDrops, 1, 2, 2, 2),
            m(PenaltyLateralGs, 0, 24576, 38130, 49648),
        ])
        .value(50, 30, 10)
        .upkeep(upkeep(40, 80, 8, 3, 5))
        .lift(4, 6)
        .breakdowns(COASTER_BREAKDOWNS)
        .max_mass(18)
        .done(),
        Spec::new(
            MiniatureRailway,
            TRACKED,
            &[Mode::Shuttle, Mode::ContinuousCircuit],
        )
        .ratings((250, 0, 0), 11)
        .modifiers([
            m(BonusLength, 6000, 764, 0, 0),
            m(BonusTrainLength, 0, 140434, 0, 0),
            m(BonusMaxSpeed, 0, 44281, 88562, 35424),
            m(BonusAverageSpeed, 0, 291271, 436906, 0),
            m(BonusDuration, 150, 26214, 0, 0),
            m(BonusSheltered, 0, -6425, 6553, 23405),
            m(BonusProximity, 0, 8946, 0, 0),
            m(BonusScenery, 0, 20915, 0, 0),
            m(RequirementLength, 0xC80000, 2, 2, 2),
            m(RequirementUnsheltered, 4, 4, 1, 1),
        ])
        .value(70, 6, -10)
        .upkeep(upkeep(60, 0, 10, 3, 5))
        .breakdowns(SAFETY_AND_VEHICLE)
        .max_mass(39)
        .done(),
        Spec::new(Monorail, TRACKED, &[Mode::Shuttle, Mode::ContinuousCircuit])
            .ratings((200, 0, 0), 14)
            .modifiers([
                m(BonusLength, 6000, 764, 0, 0),
                m(BonusTrainLength, 0, 93622, 0, 0),
                m(BonusMaxSpeed, 0, 44281, 70849, 35424),
                m(BonusAverageSpeed, 0, 291271, 218453, 0),
                m(BonusDuration, 150, 21845, 0, 0),
                m(BonusSheltered, 0, 5140, 6553, 18724),
                m(BonusProximity, 0, 8946, 0, 0),
                m(BonusScenery, 0, 16732, 0, 0),
                m(RequirementLength, 0xAA0000, 2, 2, 2),
                m(RequirementUnsheltered, 4, 4, 1, 1),
            ])
            .value(70, 6, -10)
            .upkeep(upkeep(65, 0, 10, 3, 10))
            .breakdowns(breakdown_mask(&[
                SafetyCutOut,
                DoorsStuckClosed,
                DoorsStuckOpen,
                VehicleMalfunction,
            ]))
            .max_mass(78)
            .done(),
        Spec::new(
            WoodenCoaster,
            COASTER,
            &[Mode::ContinuousCircuit, Mode::ContinuousCircuitBlockSectioned],
        )
        .ratings((320, 260, 200), 19)
        .modifiers([
            m(BonusLength, 6000, 873, 0, 0),
            m(BonusSynchronisation, 0, 40, 5, 0),
            m(BonusTrainLength, 0, 187245, 0, 0),
            m(BonusMaxSpeed, 0, 44281, 88562, 35424),
            m(BonusAverageSpeed, 0, 364088, 655360, 0),
            m(BonusDuration, 150, 26214, 0, 0),
            m(BonusGForces, 0, 40960, 34555, 49648),
            m(BonusTurns, 0, 26749, 43458, 45749),
            m(BonusDrops, 0, 40777, 46811, 49152),
            m(BonusSheltered, 0, 16705, 30583, 35108),
            m(BonusProximity, 0, 22367, 0, 0),
            m(BonusScenery, 0, 11155, 0, 0),
            m(RequirementDropHeight, 12, 2, 2, 2),
            m(RequirementMaxSpeed, 0xA0000, 2, 2, 2),
            m(RequirementNegativeGs, 10, 2, 2, 2),
            m(RequirementLength, 0x1720000, 2, 2, 2),
            m(RequirementNumDrops, 2, 2, 2, 2),
            m(PenaltyLateralGs, 0, 24576, 38130, 49648),
        ])
        .value(52, 33, 8)
        .upkeep(upkeep(40, 80, 10, 3, 10))
        .lift(5, 7)
        .breakdowns(COASTER_BREAKDOWNS)
        .max_mass(15)
        .done(),
        Spec::new(GoKarts, TRACKED, &[Mode::Race, Mode::ContinuousCircuit])
            .ratings((142, 173, 40), 16)
            .modifiers([
                m(BonusLength, 700, 32768, 0, 0),
                m(BonusGoKartRace, 4, 140, 50, 0),
                m(BonusTurns, 0, 4458, 3476, 5718),
                m(BonusDrops, 0, 8738, 5461, 6553),
                m(BonusSheltered, 0, 2570, 8738, 2340),
                m(BonusProximity, 0, 11183, 0, 0),
                m(BonusScenery, 0, 16732, 0, 0),
                m(RequirementUnsheltered, 6, 2, 1, 1),
            ])
            .value(120, 20, 0)
            .upkeep(upkeep(50, 0, 8, 0, 0))
            .breakdowns(VEHICLE_ONLY)
            .done(),
        Spec::new(
            Maze,
            RideTypeFlags::MAZE.union(RideTypeFlags::NO_VEHICLES),
            &[Mode::Maze],
        )
        .flat(0)
        .ratings((130, 50, 0), 8)
        .modifiers([
            m(BonusMazeSize, 100, 1, 2, 0),
            m(BonusScenery, 0, 22310, 0, 0),
        ])
        .value(50, 0, 0)
        .upkeep(upkeep(50, 0, 0, 0, 0))
        .done(),
        Spec::new(MiniGolf, TRACKED, &[Mode::ContinuousCircuit])
            .ratings((150, 90, 0), 0)
            .modifiers([
                m(BonusLength, 6000, 873, 0, 0),
                m(BonusTurns, 0, 14860, 0, 0),
                m(BonusSheltered, 0, 5140, 6553, 4681),
                m(BonusProximity, 0, 15657, 0, 0),
                m(BonusScenery, 0, 27887, 0, 0),
                m(BonusHoles, 0, 5, 0, 0),
                m(RequirementHoles, 1, 8, 2, 2),
            ])
            .value(50, 30, 10)
            .upkeep(upkeep(30, 80, 11, 3, 10))
            .done(),
        Spec::new(TopSpin, FLAT, &[Mode::Beginners, Mode::Intense, Mode::Berserk])
            .flat(0)
            .ratings((200, 480, 574), 19)
            .modifiers([
                m(BonusTopSpinMode, 0, 0, 0, 0),
                m(BonusScenery, 0, 11155, 0, 0),
            ])
            .value(24, 20, 10)
            .breakdowns(SAFETY_ONLY)
            .done(),
        Spec::new(
            MotionSimulator,
            FLAT,
            &[Mode::FilmAvengingAviators, Mode::FilmThrillRiders],
        )
        .flat(7)
        .ratings((290, 350, 300), 21)
        .modifiers([m(BonusMotionSimulatorMode, 0, 0, 0, 0)])
        .value(24, 20, 10)
        .breakdowns(SAFETY_ONLY)
        .done(),
        Spec::new(
            Cinema3d,
            FLAT,
            &[
                Mode::MouseTails3dFilm,
                Mode::StormChasers3dFilm,
                Mode::SpaceRaiders3dFilm,
            ],
        )
        .flat(7)
        .ratings((350, 240, 140), 21)
        .modifiers([m(Bonus3dCinemaMode, 0, 0, 0, 0)])
        .value(20, 10, 0)
        .breakdowns(SAFETY_ONLY)
        .done(),
        Spec::new(MerryGoRound, FLAT, &[Mode::Rotation])
            .flat(7)
            .ratings((60, 15, 30), 16)
            .modifiers([
                m(BonusRotations, 0, 5, 5, 5),
                m(BonusScenery, 0, 19521, 0, 0),
            ])
            .value(50, 10, 0)
            .breakdowns(SAFETY_AND_CONTROL)
            .done(),
        Spec::new(LogFlume, TRACKED, &[Mode::ContinuousCircuit])
            .ratings((150, 55, 30), 15)
            .modifiers([
                m(BonusLength, 2000, 7208, 0, 0),
                m(BonusSynchronisation, 0, 40, 5, 0),
                m(BonusMaxSpeed, 0, 531372, 655360, 301111),
                m(BonusDuration, 300, 13107, 0, 0),
                m(BonusTurns, 0, 22291, 20860, 4574),
                m(BonusDrops, 0, 69905, 62415, 49152),
                m(BonusSheltered, 0, 16705, 30583, 35108),
                m(BonusProximity, 0, 22367, 0, 0),
                m(BonusScenery, 0, 11155, 0, 0),
                m(RequirementDropHeight, 2, 2, 2, 2),
            ])
            .value(80, 34, 6)
            .upkeep(upkeep(80, 0, 9, 0, 10))
            .breakdowns(SAFETY_AND_CONTROL)
            .build(false, SpecialElementRating::LogFlume),
        Spec::new(RiverRapids, TRACKED, &[Mode::ContinuousCircuit])
            .ratings((120, 70, 50), 16)
            .modifiers([
                m(BonusLength, 2000, 6225, 0, 0),
                m(BonusSynchronisation, 0, 30, 5, 0),
                m(BonusMaxSpeed, 0, 115130, 159411, 106274),
                m(BonusDuration, 500, 13107, 0, 0),
                m(BonusTurns, 0, 29721, 22598, 5718),
                m(BonusDrops, 0, 40777, 46811, 49152),
                m(BonusSheltered, 0, 16705, 30583, 35108),
                m(BonusProximity, 0, 31314, 0, 0),
                m(BonusScenery, 0, 13943, 0, 0),
                m(RequirementDropHeight, 2, 2, 2, 2),
                m(RequirementLength, 0xC80000, 2, 2, 2),
            ])
            .value(72, 26, 6)
            .upkeep(upkeep(82, 0, 10, 0, 10))
            .breakdowns(SAFETY_AND_CONTROL)
            .done(),
        Spec::new(
            GhostTrain,
            TRACKED,
            &[Mode::ContinuousCircuit, Mode::ContinuousCircuitBlockSectioned],
        )
        .ratings((200, 20, 3), 12)
        .modifiers([
            m(BonusLength, 6000, 764, 0, 0),
            m(BonusSynchronisation, 0, 15, 0, 0),
            m(BonusMaxSpeed, 0, 44281, 88562, 35424),
            m(BonusAverageSpeed, 0, 291271, 436906, 0),
            m(BonusDuration, 150, 26214, 0, 0),
            m(BonusTurns, 0, 14860, 0, 11437),
            m(BonusDrops, 0, 8738, 0, 0),
            m(BonusSheltered, 0, 25700, 6553, 4681),
            m(BonusProximity, 0, 11183, 0, 0),
            m(BonusScenery, 0, 8366, 0, 0),
            m(RequirementLength, 0xB40000, 2, 2, 2),
        ])
        .value(70, 10, 10)
        .upkeep(upkeep(80, 0, 8, 3, 5))
        .breakdowns(SAFETY_AND_VEHICLE)
        .max_mass(2)
        .build(false, SpecialElementRating::GhostTrain),
        Spec::new(
            LaunchedFreefall,
            TRACKED,
            &[Mode::UpwardLaunch, Mode::DownwardLaunch],
        )
        .ratings((270, 300, 350), 16)
        .modifiers([
            m(BonusDownwardLaunch, 0, 30, 65, 45),
            m(BonusLaunchedFreefallSpecial, 0, 32768, 1355917, 451972),
            m(BonusProximity, 0, 20130, 0, 0),
            m(BonusScenery, 0, 25098, 0, 0),
        ])
        .value(50, 50, 10)
        .upkeep(upkeep(50, 0, 10, 0, 0))
        .breakdowns(TOWER_BREAKDOWNS)
        .max_mass(15)
        .done(),
        stall(FoodStall),
        Spec::new(BoatHire, RideTypeFlags::HAS_TRACK, &[Mode::BoatHire])
            .ratings((190, 80, 90), 7)
            .modifiers([
                m(BonusBoatHireNoCircuit, 0, 20, 0, 0),
                m(BonusProximity, 0, 11183, 0, 0),
                m(BonusScenery, 0, 22310, 0, 0),
            ])
            .value(70, 6, 0)
            .upkeep(upkeep(50, 0, 4, 0, 0))
            .breakdowns(VEHICLE_ONLY)
            .untested(0),
        Spec::new(
            SpiralSlide,
            FLAT.union(RideTypeFlags::NO_VEHICLES),
            &[
                Mode::SingleRidePerAdmission,
                Mode::UnlimitedRidesPerAdmission,
            ],
        )
        .flat(2)
        .ratings((150, 140, 90), 8)
        .modifiers([
            m(BonusSlideUnlimitedRides, 0, 40, 20, 25),
            m(BonusScenery, 0, 25098, 0, 0),
        ])
        .value(50, 10, 0)
        .breakdowns(SAFETY_ONLY)
        .done(),
        Spec::new(RotoDrop, TRACKED, &[Mode::FreefallDrop])
            .ratings((280, 350, 350), 24)
            .modifiers([
                m(BonusRotoDrop, 0, 209715, 2, 2),
                m(BonusProximity, 0, 11183, 0, 0),
                m(BonusScenery, 0, 25098, 0, 0),
            ])
            .value(50, 50, 10)
            .upkeep(upkeep(50, 0, 10, 0, 0))
            .breakdowns(TOWER_BREAKDOWNS)
            .max_mass(15)
            .done(),
        Spec::new(
            AirPoweredVerticalCoaster,
            COASTER.union(RideTypeFlags::AIR_POWERED),
            &[Mode::PoweredLaunchPasstrough, Mode::PoweredLaunch],
        )
        .ratings((413, 250, 280), 28)
        .modifiers([
            m(BonusLength, 6000, 327, 0, 0),
            m(BonusSynchronisation, 0, 60, 5, 0),
            m(BonusMaxSpeed, 0, 509724, 364088, 320398),
            m(BonusGForces, 0, 24576, 35746, 59578),
            m(BonusSheltered, 0, 15420, 21845, 11702),
            m(BonusProximity, 0, 17893, 0, 0),
            m(BonusScenery, 0, 11155, 0, 0),
            m(RequirementDropHeight, 34, 2, 1, 1),
            m(PenaltyLateralGs, 0, 24576, 38130, 49648),
        ])
        .value(44, 66, 10)
        .upkeep(upkeep(90, 0, 0, 0, 10))
        .breakdowns(TOWER_BREAKDOWNS)
        .done(),
        Spec::new(
            Chairlift,
            TRACKED.union(RideTypeFlags::ALLOW_MORE_VEHICLES_THAN_STATION_FITS),
            &[Mode::StationToStation],
        )
        .ratings((160, 40, 50), 14)
        .modifiers([
            m(BonusLength, 6000, 764, 0, 0),
            m(BonusTrainLength, 0, 187245, 0, 0),
            m(BonusMaxSpeed, 0, 44281, 88562, 35424),
            m(BonusAverageSpeed, 0, 291271, 436906, 0),
            m(BonusDuration, 150, 26214, 0, 0),
            m(BonusTurns, 0, 7430, 3476, 4574),
            m(BonusSheltered, 0, -19275, 21845, 23405),
            m(BonusProximity, 0, 11183, 0, 0),
            m(BonusScenery, 0, 25098, 0, 0),
            m(RequirementLength, 0x960000, 2, 2, 2),
            m(RequirementStations, 1, 0, 2, 1),
            m(RequirementUnsheltered, 4, 4, 1, 1),
        ])
        .value(70, 10, 0)
        .upkeep(upkeep(60, 0, 4, 3, 10))
        .breakdowns(SAFETY_ONLY)
        .max_mass(18)
        .done(),
        Spec::new(ObservationTower, TRACKED, &[Mode::Rotation])
            .ratings((150, 0, 10), 15)
            .modifiers([
                m(BonusTowerRide, 0, 45875, 0, 26214),
                m(BonusProximity, 0, 20130, 0, 0),
                m(BonusScenery, 0, 83662, 0, 0),
                m(RequirementUnsheltered, 5, 4, 1, 1),
            ])
            .value(80, 10, 0)
            .upkeep(upkeep(50, 0, 10, 0, 0))
            .breakdowns(SAFETY_AND_VEHICLE)
            .max_mass(15)
            .sheltered(7)
            .done(),
        Spec::new(ReverserCoaster, TRACKED, &[Mode::ContinuousCircuit])
            .ratings((240, 180, 170), 19)
            .modifiers([
                m(BonusLength, 6000, 873, 0, 0),
                m(BonusSynchronisation, 0, 40, 5, 0),
                m(BonusTrainLength, 0, 187245, 0, 0),
                m(BonusMaxSpeed, 0, 44281, 88562, 35424),
                m(BonusAverageSpeed, 0, 364088, 655360, 0),
                m(BonusReversals, 6, 20, 20, 20),
                m(BonusDuration, 150, 26214, 0, 0),
                m(BonusGForces, 0, 28672, 23831, 49648),
                m(BonusTurns, 0, 26749, 43458, 45749),
                m(BonusDrops, 0, 40777, 46811, 49152),
                m(BonusSheltered, 0, 16705, 30583, 35108),
                m(BonusProximity, 0, 22367, 0, 0),
                m(BonusScenery, 0, 11155, 0, 0),
                m(RequirementReversals, 1, 8, 1, 1),
                m(RequirementLength, 0xC80000, 2, 1, 1),
                m(RequirementNumDrops, 2, 2, 1, 1),
                m(PenaltyLateralGs, 0, 24576, 38130, 49648),
            ])
            .value(48, 28, 7)
            .upkeep(UpkeepCosts {
                per_reverser: 10,
                ..upkeep(39, 80, 10, 3, 10)
            })
            .lift(3, 4)
            .breakdowns(breakdown_mask(&[SafetyCutOut, VehicleMalfunction, BrakesFailure]))
            .max_mass(15)
            .done(),
        Spec::new(Dodgems, FLAT, &[Mode::Dodgems])
            .flat(7)
            .ratings((130, 50, 35), 16)
            .modifiers([
                m(BonusNumTrains, 4, 40, 0, 0),
                m(BonusOperationOption, 0, 1, -2, 0),
                m(BonusNumTrains, 4, 40, 0, 0),
                m(BonusScenery, 0, 5577, 0, 0),
            ])
            .value(40, 20, 0)
            .upkeep(upkeep(50, 0, 5, 0, 0))
            .breakdowns(SAFETY_ONLY)
            .done(),
        stall(Toilets),
    ]
}

impl Spec {
    fn sheltered(mut self, eighths: u8) -> Self {
        self.sheltered_eighths = Some(eighths);
        self
    }

    fn untested(mut self, sheltered_eighths: u8) -> RideTypeDescriptor {
        self.calc_type = RatingsCalcType::Untested;
        self.sheltered_eighths = Some(sheltered_eighths);
        self.done()
    }
}

struct Vehicle {
    name: &'static str,
    ride_type: RideType,
    cars: (u8, u8),
    flat_units: Option<u8>,
    spacing: u32,
    friction: u16,
    powered_max_speed: u8,
    flags: RideEntryFlags,
}

const fn tracked(name: &'static str, ride_type: RideType, cars: (u8, u8), spacing: u32, friction: u16) -> Vehicle {
    Vehicle {
        name,
        ride_type,
        cars,
        flat_units: None,
        spacing,
        friction,
        powered_max_speed: 0,
        flags: RideEntryFlags::empty(),
    }
}

const fn flat(name: &'static str, ride_type: RideType, units: u8) -> Vehicle {
    Vehicle {
        name,
        ride_type,
        cars: (1, 1),
        flat_units: Some(units),
        spacing: 0,
        friction: 0,
        powered_max_speed: 0,
        flags: RideEntryFlags::empty(),
    }
}

impl Vehicle {
    fn flags(mut self, flags: RideEntryFlags) -> Self {
        self.flags = flags;
        self
    }

    fn powered(mut self, max_speed: u8) -> Self {
        self.powered_max_speed = max_speed;
        self
    }

    fn into_entry(self) -> RideEntry {
        RideEntry {
            id: RideEntryId(self.ride_type as u16),
            name: self.name.to_owned(),
            ride_type: self.ride_type,
            flags: self.flags,
            min_cars_per_train: self.cars.0,
            max_cars_per_train: self.cars.1,
            cars_per_flat_ride: self.flat_units,
            car: CarSpec {
                spacing: self.spacing,
                friction: self.friction,
                powered_max_speed: self.powered_max_speed,
            },
            excitement_multiplier: 0,
            intensity_multiplier: 0,
            nausea_multiplier: 0,
        }
    }
}

fn entries() -> Vec<RideEntry> {
    use RideType::*;

    const NO_INVERSIONS: RideEntryFlags = RideEntryFlags::NO_INVERSIONS;
    const TAME: RideEntryFlags = NO_INVERSIONS.union(RideEntryFlags::NO_BANKED_TRACK);
    const NEVER_BREAKS: RideEntryFlags = RideEntryFlags::CANNOT_BREAK_DOWN;

    [
        tracked("Looping Coaster Trains", LoopingCoaster, (2, 7), 110_000, 800),
        tracked("Junior Coaster Cars", JuniorCoaster, (2, 8), 80_000, 500).flags(NO_INVERSIONS),
        tracked("Steam Train", MiniatureRailway, (2, 6), 120_000, 1_000).flags(TAME),
        tracked("Monorail Cars", Monorail, (2, 5), 150_000, 1_500)
            .flags(TAME.union(RideEntryFlags::COVERED)),
        tracked("Wooden Coaster Trains", WoodenCoaster, (2, 6), 120_000, 900),
        tracked("Go Karts", GoKarts, (1, 1), 60_000, 300)
            .flags(NO_INVERSIONS)
            .powered(10),
        flat("Maze", Maze, 0).flags(NEVER_BREAKS),
        tracked("Mini Golf Players", MiniGolf, (1, 1), 50_000, 200)
            .flags(TAME.union(NEVER_BREAKS)),
        flat("Top Spin", TopSpin, 1),
        flat("Motion Simulator", MotionSimulator, 1).flags(RideEntryFlags::COVERED),
        flat("3D Cinema", Cinema3d, 1).flags(RideEntryFlags::COVERED),
        flat("Merry-Go-Round", MerryGoRound, 1),
        tracked("Log Boats", LogFlume, (1, 1), 90_000, 600).flags(TAME),
        tracked("Rapids Rafts", RiverRapids, (1, 1), 100_000, 700).flags(TAME),
        tracked("Ghost Train Cars", GhostTrain, (1, 4), 90_000, 250).flags(TAME),
        tracked("Launched Freefall Car", LaunchedFreefall, (1, 1), 60_000, 300).flags(TAME),
        flat("Food Stall", FoodStall, 0).flags(NEVER_BREAKS),
        tracked("Rowing Boats", BoatHire, (1, 1), 60_000, 300).flags(TAME),
        flat("Spiral Slide", SpiralSlide, 0),
        tracked("Roto-Drop Car", RotoDrop, (1, 1), 60_000, 300).flags(TAME),
        tracked(
            "Air Powered Coaster Train",
            AirPoweredVerticalCoaster,
            (2, 6),
            110_000,
            800,
        ),
        tracked("Chairlift Chairs", Chairlift, (1, 1), 40_000, 100)
            .flags(TAME)
            .powered(5),
        tracked("Observation Cabin", ObservationTower, (1, 1), 60_000, 300)
            .flags(TAME.union(RideEntryFlags::COVERED)),
        tracked("Reverser Cars", ReverserCoaster, (2, 4), 100_000, 700).flags(NO_INVERSIONS),
        flat("Dodgem Cars", Dodgems, 12).powered(8),
        flat("Toilets", Toilets, 0).flags(NEVER_BREAKS),
    ]
    .into_iter()
    .map(Vehicle::into_entry)
    .collect()
}

impl RideCatalog {
    /// The classic ride set: one descriptor per [`RideType`] and one vehicle
    /// entry per type, whose id is the type's declaration index.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for descriptor in descriptors() {
            catalog.override_descriptor(descriptor);
        }
        for entry in entries() {
            if let Err(error) = catalog.insert_entry(entry) {
                tracing::warn!(%error, "skipping builtin vehicle entry");
            }
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::CatalogOracle;
    use strum::IntoEnumIterator;

    #[test]
    fn entry_ids_follow_declaration_order() {
        let catalog = RideCatalog::builtin();
        for (index, ride_type) in RideType::iter().enumerate() {
            let entry = catalog.default_entry(ride_type).expect("entry");
            assert_eq!(entry.id, RideEntryId(index as u16));
        }
    }

    #[test]
    fn shops_have_no_ratings() {
        let catalog = RideCatalog::builtin();
        for ride_type in [RideType::FoodStall, RideType::Toilets] {
            let descriptor = catalog.descriptor(ride_type).expect("described");
            assert_eq!(descriptor.ratings.calc_type, RatingsCalcType::Stall);
            assert!(descriptor.has_flag(RideTypeFlags::SHOP));
            assert_eq!(descriptor.available_breakdowns, 0);
        }
    }

    #[test]
    fn only_the_reverser_coaster_has_cheap_reversers() {
        let catalog = RideCatalog::builtin();
        let reverser = catalog.descriptor(RideType::ReverserCoaster).expect("reverser");
        assert_eq!(reverser.upkeep.per_reverser, 10);
        let looping = catalog.descriptor(RideType::LoopingCoaster).expect("looping");
        assert_eq!(looping.upkeep.per_reverser, UpkeepCosts::DEFAULT_PER_REVERSER);
    }

    #[test]
    fn chairlift_keeps_the_single_station_penalty() {
        let catalog = RideCatalog::builtin();
        let chairlift = catalog.descriptor(RideType::Chairlift).expect("chairlift");
        let stations = chairlift
            .ratings
            .modifiers
            .iter()
            .find(|modifier| modifier.kind == RequirementStations)
            .expect("stations requirement");
        assert_eq!((stations.threshold, stations.intensity, stations.nausea), (1, 2, 1));
    }

    #[test]
    fn first_mode_is_the_default() {
        let catalog = RideCatalog::builtin();
        let looping = catalog.descriptor(RideType::LoopingCoaster).expect("looping");
        assert_eq!(looping.default_mode(), RideMode::ContinuousCircuit);
        assert!(looping.can_break_down(BreakdownKind::BrakesFailure));
        assert!(!looping.can_break_down(BreakdownKind::DoorsStuckOpen));
    }
}
