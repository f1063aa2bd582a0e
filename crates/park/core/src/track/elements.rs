//! Static geometry of every track piece.
//!
//! A piece occupies one or more blocks. Block offsets are expressed in the
//! piece's local frame: `forward` along the entry direction, `right` towards
//! the entry direction rotated clockwise, `z` in element levels above the
//! origin block's base height.

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TrackFlags: u32 {
        /// Station platform piece; counts towards station length.
        const STATION = 1 << 0;
        const INVERSION = 1 << 1;
        const BANKED = 1 << 2;
        const BRAKES = 1 << 3;
        const BLOCK_BRAKES = 1 << 4;
        const BOOSTER = 1 << 5;
        const REVERSER = 1 << 6;
        /// Chain lift may be fitted.
        const LIFT_CAPABLE = 1 << 7;
        const CABLE_LIFT = 1 << 8;
        const VERTICAL_LOOP = 1 << 9;
        const CURVED_LIFT_HILL = 1 << 10;
        /// The train leaves straight up through the same tile.
        const VERTICAL = 1 << 11;
        const WATER_SPLASH = 1 << 12;
        const WATERFALL = 1 << 13;
        const RAPIDS = 1 << 14;
        const WHIRLPOOL = 1 << 15;
        const SPINNING_TUNNEL = 1 << 16;
        const FLUME_REVERSER = 1 << 17;
        const ON_RIDE_PHOTO = 1 << 18;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackBlock {
    pub forward: i8,
    pub right: i8,
    pub z: i8,
}

const fn blk(forward: i8, right: i8, z: i8) -> TrackBlock {
    TrackBlock { forward, right, z }
}

/// Geometry and classification of one track piece type.
#[derive(Clone, Copy, Debug)]
pub struct TrackPieceDef {
    pub blocks: &'static [TrackBlock],
    /// Level above the origin base where the train enters.
    pub entry_z: i8,
    /// Level above the origin base where the train leaves (from the last block).
    pub exit_z: i8,
    /// Quarter turns applied to the travel direction, positive is clockwise.
    pub turn: i8,
    /// Clearance of each block above its base, in levels.
    pub clearance: u8,
    /// Distance travelled along the piece.
    pub length: u16,
    pub flags: TrackFlags,
}

impl TrackPieceDef {
    pub const fn rise(&self) -> i8 {
        self.exit_z - self.entry_z
    }

    pub fn exit_block(&self) -> TrackBlock {
        self.blocks.last().copied().unwrap_or(blk(0, 0, 0))
    }

    pub fn block(&self, sequence: u8) -> Option<TrackBlock> {
        self.blocks.get(sequence as usize).copied()
    }
}

const SINGLE: &[TrackBlock] = &[blk(0, 0, 0)];
const QUARTER3_LEFT: &[TrackBlock] = &[blk(0, 0, 0), blk(1, 0, 0), blk(1, -1, 0)];
const QUARTER3_RIGHT: &[TrackBlock] = &[blk(0, 0, 0), blk(1, 0, 0), blk(1, 1, 0)];
const QUARTER5_LEFT: &[TrackBlock] = &[
    blk(0, 0, 0),
    blk(1, 0, 0),
    blk(1, -1, 0),
    blk(2, -1, 0),
    blk(2, -2, 0),
];
const QUARTER5_RIGHT: &[TrackBlock] = &[
    blk(0, 0, 0),
    blk(1, 0, 0),
    blk(1, 1, 0),
    blk(2, 1, 0),
    blk(2, 2, 0),
];
const LOOP_LEFT: &[TrackBlock] = &[
    blk(0, 0, 0),
    blk(1, 0, 0),
    blk(2, 0, 2),
    blk(2, 0, 8),
    blk(1, 0, 12),
    blk(1, -1, 12),
    blk(2, -1, 8),
    blk(2, -1, 2),
    blk(3, -1, 0),
];
const LOOP_RIGHT: &[TrackBlock] = &[
    blk(0, 0, 0),
    blk(1, 0, 0),
    blk(2, 0, 2),
    blk(2, 0, 8),
    blk(1, 0, 12),
    blk(1, 1, 12),
    blk(2, 1, 8),
    blk(2, 1, 2),
    blk(3, 1, 0),
];
const CORKSCREW_UP_LEFT: &[TrackBlock] = &[blk(0, 0, 0), blk(1, 0, 4), blk(1, -1, 8)];
const CORKSCREW_UP_RIGHT: &[TrackBlock] = &[blk(0, 0, 0), blk(1, 0, 4), blk(1, 1, 8)];
const CORKSCREW_DOWN_LEFT: &[TrackBlock] = &[blk(0, 0, 6), blk(1, 0, 2), blk(1, -1, 0)];
const CORKSCREW_DOWN_RIGHT: &[TrackBlock] = &[blk(0, 0, 6), blk(1, 0, 2), blk(1, 1, 0)];

const fn piece(
    blocks: &'static [TrackBlock],
    entry_z: i8,
    exit_z: i8,
    turn: i8,
    length: u16,
    flags: TrackFlags,
) -> TrackPieceDef {
    TrackPieceDef {
        blocks,
        entry_z,
        exit_z,
        turn,
        clearance: 3,
        length,
        flags,
    }
}

const fn straight(entry_z: i8, exit_z: i8, flags: TrackFlags) -> TrackPieceDef {
    piece(SINGLE, entry_z, exit_z, 0, 32, flags)
}

const NONE: TrackFlags = TrackFlags::empty();
const LIFT: TrackFlags = TrackFlags::LIFT_CAPABLE;
const STATION: TrackFlags = TrackFlags::STATION;
const BANKED: TrackFlags = TrackFlags::BANKED;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::EnumString,
    strum::AsRefStr, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TrackElemType {
    Flat,
    EndStation,
    BeginStation,
    MiddleStation,
    Up25,
    Up60,
    FlatToUp25,
    Up25ToUp60,
    Up60ToUp25,
    Up25ToFlat,
    Down25,
    Down60,
    FlatToDown25,
    Down25ToDown60,
    Down60ToDown25,
    Down25ToFlat,
    LeftQuarterTurn1,
    RightQuarterTurn1,
    LeftQuarterTurn3,
    RightQuarterTurn3,
    LeftQuarterTurn5,
    RightQuarterTurn5,
    FlatToLeftBank,
    FlatToRightBank,
    LeftBankToFlat,
    RightBankToFlat,
    LeftBank,
    RightBank,
    BankedLeftQuarterTurn3,
    BankedRightQuarterTurn3,
    BankedLeftQuarterTurn5,
    BankedRightQuarterTurn5,
    LeftQuarterTurn1Up25,
    RightQuarterTurn1Up25,
    LeftQuarterTurn1Down25,
    RightQuarterTurn1Down25,
    LeftVerticalLoop,
    RightVerticalLoop,
    LeftCorkscrewUp,
    RightCorkscrewUp,
    LeftCorkscrewDown,
    RightCorkscrewDown,
    Brakes,
    BlockBrakes,
    Booster,
    LeftReverser,
    RightReverser,
    CableLiftHill,
    LeftCurvedLiftHill,
    RightCurvedLiftHill,
    Waterfall,
    Rapids,
    Watersplash,
    Whirlpool,
    SpinningTunnel,
    LogFlumeReverser,
    OnRidePhoto,
    TowerBase,
    TowerSection,
    Maze,
    FlatRideBase,
    FacilityBase,
}

impl TrackElemType {
    pub fn def(self) -> &'static TrackPieceDef {
        use TrackElemType::*;

        const FLAT: TrackPieceDef = straight(0, 0, LIFT);
        const END_STATION: TrackPieceDef = straight(0, 0, STATION);
        const UP25: TrackPieceDef = straight(0, 2, LIFT);
        const UP60: TrackPieceDef = straight(0, 8, LIFT);
        const FLAT_TO_UP25: TrackPieceDef = straight(0, 1, LIFT);
        const UP25_TO_UP60: TrackPieceDef = straight(0, 4, LIFT);
        const DOWN25: TrackPieceDef = straight(2, 0, LIFT);
        const DOWN60: TrackPieceDef = straight(8, 0, LIFT);
        const FLAT_TO_DOWN25: TrackPieceDef = straight(1, 0, LIFT);
        const DOWN25_TO_DOWN60: TrackPieceDef = straight(4, 0, LIFT);
        const LEFT_TURN1: TrackPieceDef = piece(SINGLE, 0, 0, -1, 24, NONE);
        const RIGHT_TURN1: TrackPieceDef = piece(SINGLE, 0, 0, 1, 24, NONE);
        const LEFT_TURN3: TrackPieceDef = piece(QUARTER3_LEFT, 0, 0, -1, 75, NONE);
        const RIGHT_TURN3: TrackPieceDef = piece(QUARTER3_RIGHT, 0, 0, 1, 75, NONE);
        const LEFT_TURN5: TrackPieceDef = piece(QUARTER5_LEFT, 0, 0, -1, 128, NONE);
        const RIGHT_TURN5: TrackPieceDef = piece(QUARTER5_RIGHT, 0, 0, 1, 128, NONE);
        const BANK: TrackPieceDef = straight(0, 0, BANKED);
        const BANKED_LEFT_TURN3: TrackPieceDef = piece(QUARTER3_LEFT, 0, 0, -1, 75, BANKED);
        const BANKED_RIGHT_TURN3: TrackPieceDef = piece(QUARTER3_RIGHT, 0, 0, 1, 75, BANKED);
        const BANKED_LEFT_TURN5: TrackPieceDef = piece(QUARTER5_LEFT, 0, 0, -1, 128, BANKED);
        const BANKED_RIGHT_TURN5: TrackPieceDef = piece(QUARTER5_RIGHT, 0, 0, 1, 128, BANKED);
        const LEFT_TURN1_UP: TrackPieceDef = piece(SINGLE, 0, 2, -1, 32, NONE);
        const RIGHT_TURN1_UP: TrackPieceDef = piece(SINGLE, 0, 2, 1, 32, NONE);
        const LEFT_TURN1_DOWN: TrackPieceDef = piece(SINGLE, 2, 0, -1, 32, NONE);
        const RIGHT_TURN1_DOWN: TrackPieceDef = piece(SINGLE, 2, 0, 1, 32, NONE);
        const LOOP: TrackFlags = TrackFlags::INVERSION.union(TrackFlags::VERTICAL_LOOP);
        const LEFT_LOOP: TrackPieceDef = TrackPieceDef {
            clearance: 4,
            ..piece(LOOP_LEFT, 0, 0, 0, 220, LOOP)
        };
        const RIGHT_LOOP: TrackPieceDef = TrackPieceDef {
            clearance: 4,
            ..piece(LOOP_RIGHT, 0, 0, 0, 220, LOOP)
        };
        const CORKSCREW: TrackFlags = TrackFlags::INVERSION;
        const LEFT_CORKSCREW_UP: TrackPieceDef = piece(CORKSCREW_UP_LEFT, 0, 10, -1, 96, CORKSCREW);
        const RIGHT_CORKSCREW_UP: TrackPieceDef =
            piece(CORKSCREW_UP_RIGHT, 0, 10, 1, 96, CORKSCREW);
        const LEFT_CORKSCREW_DOWN: TrackPieceDef =
            piece(CORKSCREW_DOWN_LEFT, 10, 0, -1, 96, CORKSCREW);
        const RIGHT_CORKSCREW_DOWN: TrackPieceDef =
            piece(CORKSCREW_DOWN_RIGHT, 10, 0, 1, 96, CORKSCREW);
        const BRAKES: TrackPieceDef = straight(0, 0, TrackFlags::BRAKES);
        const BLOCK_BRAKES: TrackPieceDef = straight(0, 0, TrackFlags::BLOCK_BRAKES);
        const BOOSTER: TrackPieceDef = straight(0, 0, TrackFlags::BOOSTER);
        const REVERSER: TrackPieceDef = straight(0, 0, TrackFlags::REVERSER);
        const CABLE_LIFT_HILL: TrackPieceDef = straight(0, 8, TrackFlags::CABLE_LIFT);
        const LEFT_CURVED_LIFT: TrackPieceDef =
            piece(SINGLE, 0, 2, -1, 32, LIFT.union(TrackFlags::CURVED_LIFT_HILL));
        const RIGHT_CURVED_LIFT: TrackPieceDef =
            piece(SINGLE, 0, 2, 1, 32, LIFT.union(TrackFlags::CURVED_LIFT_HILL));
        const WATERFALL: TrackPieceDef = straight(0, 0, TrackFlags::WATERFALL);
        const RAPIDS: TrackPieceDef = straight(0, 0, TrackFlags::RAPIDS);
        const WATERSPLASH: TrackPieceDef = straight(0, 0, TrackFlags::WATER_SPLASH);
        const WHIRLPOOL: TrackPieceDef = straight(0, 0, TrackFlags::WHIRLPOOL);
        const SPINNING_TUNNEL: TrackPieceDef = straight(0, 0, TrackFlags::SPINNING_TUNNEL);
        const FLUME_REVERSER: TrackPieceDef = straight(0, 0, TrackFlags::FLUME_REVERSER);
        const ON_RIDE_PHOTO: TrackPieceDef = straight(0, 0, TrackFlags::ON_RIDE_PHOTO);
        const TOWER_BASE: TrackPieceDef = TrackPieceDef {
            clearance: 4,
            ..piece(SINGLE, 0, 4, 0, 32, STATION.union(TrackFlags::VERTICAL))
        };
        const TOWER_SECTION: TrackPieceDef = TrackPieceDef {
            clearance: 4,
            ..piece(SINGLE, 0, 4, 0, 32, TrackFlags::VERTICAL)
        };
        const STANDALONE: TrackPieceDef = TrackPieceDef {
            clearance: 4,
            ..piece(SINGLE, 0, 0, 0, 0, STATION)
        };

        match self {
            Flat => &FLAT,
            EndStation | BeginStation | MiddleStation => &END_STATION,
            Up25 => &UP25,
            Up60 => &UP60,
            FlatToUp25 | Up25ToFlat => &FLAT_TO_UP25,
            Up25ToUp60 | Up60ToUp25 => &UP25_TO_UP60,
            Down25 => &DOWN25,
            Down60 => &DOWN60,
            FlatToDown25 | Down25ToFlat => &FLAT_TO_DOWN25,
            Down25ToDown60 | Down60ToDown25 => &DOWN25_TO_DOWN60,
            LeftQuarterTurn1 => &LEFT_TURN1,
            RightQuarterTurn1 => &RIGHT_TURN1,
            LeftQuarterTurn3 => &LEFT_TURN3,
            RightQuarterTurn3 => &RIGHT_TURN3,
            LeftQuarterTurn5 => &LEFT_TURN5,
            RightQuarterTurn5 => &RIGHT_TURN5,
            FlatToLeftBank | FlatToRightBank | LeftBankToFlat | RightBankToFlat | LeftBank
            | RightBank => &BANK,
            BankedLeftQuarterTurn3 => &BANKED_LEFT_TURN3,
            BankedRightQuarterTurn3 => &BANKED_RIGHT_TURN3,
            BankedLeftQuarterTurn5 => &BANKED_LEFT_TURN5,
            BankedRightQuarterTurn5 => &BANKED_RIGHT_TURN5,
            LeftQuarterTurn1Up25 => &LEFT_TURN1_UP,
            RightQuarterTurn1Up25 => &RIGHT_TURN1_UP,
            LeftQuarterTurn1Down25 => &LEFT_TURN1_DOWN,
            RightQuarterTurn1Down25 => &RIGHT_TURN1_DOWN,
            LeftVerticalLoop => &LEFT_LOOP,
            RightVerticalLoop => &RIGHT_LOOP,
            LeftCorkscrewUp => &LEFT_CORKSCREW_UP,
            RightCorkscrewUp => &RIGHT_CORKSCREW_UP,
            LeftCorkscrewDown => &LEFT_CORKSCREW_DOWN,
            RightCorkscrewDown => &RIGHT_CORKSCREW_DOWN,
            Brakes => &BRAKES,
            BlockBrakes => &BLOCK_BRAKES,
            Booster => &BOOSTER,
            LeftReverser | RightReverser => &REVERSER,
            CableLiftHill => &CABLE_LIFT_HILL,
            LeftCurvedLiftHill => &LEFT_CURVED_LIFT,
            RightCurvedLiftHill => &RIGHT_CURVED_LIFT,
            Waterfall => &WATERFALL,
            Rapids => &RAPIDS,
            Watersplash => &WATERSPLASH,
            Whirlpool => &WHIRLPOOL,
            SpinningTunnel => &SPINNING_TUNNEL,
            LogFlumeReverser => &FLUME_REVERSER,
            OnRidePhoto => &ON_RIDE_PHOTO,
            TowerBase => &TOWER_BASE,
            TowerSection => &TOWER_SECTION,
            Maze | FlatRideBase | FacilityBase => &STANDALONE,
        }
    }

    #[inline]
    pub fn flags(self) -> TrackFlags {
        self.def().flags
    }

    #[inline]
    pub fn has_flag(self, flag: TrackFlags) -> bool {
        self.flags().contains(flag)
    }

    pub fn is_station(self) -> bool {
        self.has_flag(TrackFlags::STATION)
    }

    pub fn is_vertical_loop(self) -> bool {
        self.has_flag(TrackFlags::VERTICAL_LOOP)
    }

    /// Pieces after which a block section may start.
    pub fn is_block_point(self) -> bool {
        matches!(
            self,
            Self::EndStation
                | Self::CableLiftHill
                | Self::Up25ToFlat
                | Self::BlockBrakes
        )
    }
}
