use std::fmt;

/// Height units per tile-element level. Element heights are stored in
/// levels; one level is this many world z coordinates.
pub const COORDS_Z_STEP: i32 = 8;

/// Compass direction a track piece or entrance faces.
///
/// Directions are numbered clockwise. Turning right from `d` gives `d + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(strum::Display, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    #[default]
    West,
    North,
    East,
    South,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::West,
        Direction::North,
        Direction::East,
        Direction::South,
    ];

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn from_index(index: u8) -> Self {
        match index & 3 {
            0 => Direction::West,
            1 => Direction::North,
            2 => Direction::East,
            _ => Direction::South,
        }
    }

    #[inline]
    pub const fn rotate_cw(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    #[inline]
    pub const fn rotate_ccw(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    #[inline]
    pub const fn reverse(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Rotates by a signed number of quarter turns (positive is clockwise).
    #[inline]
    pub const fn turned(self, quarter_turns: i8) -> Self {
        Self::from_index((self.index() as i8 + quarter_turns).rem_euclid(4) as u8)
    }

    /// Unit tile offset of one step in this direction.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::West => (-1, 0),
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
        }
    }

    /// True when the two directions are perpendicular.
    #[inline]
    pub const fn is_perpendicular_to(self, other: Direction) -> bool {
        (self.index() ^ other.index()) & 1 == 1
    }
}

/// Tile position on the map grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileCoordsXY {
    pub x: i32,
    pub y: i32,
}

impl TileCoordsXY {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub const fn with_z(self, z: i32) -> TileCoordsXYZ {
        TileCoordsXYZ {
            x: self.x,
            y: self.y,
            z,
        }
    }
}

impl fmt::Display for TileCoordsXY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Tile position with a height expressed in element levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileCoordsXYZ {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TileCoordsXYZ {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn xy(self) -> TileCoordsXY {
        TileCoordsXY {
            x: self.x,
            y: self.y,
        }
    }

    /// World z coordinate of this level.
    pub const fn world_z(self) -> i32 {
        self.z * COORDS_Z_STEP
    }
}

impl fmt::Display for TileCoordsXYZ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Tile position, height and facing. Used for entrances and exits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileCoordsXYZD {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub direction: Direction,
}

impl TileCoordsXYZD {
    pub const fn new(x: i32, y: i32, z: i32, direction: Direction) -> Self {
        Self { x, y, z, direction }
    }

    pub const fn xyz(self) -> TileCoordsXYZ {
        TileCoordsXYZ {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_round_trips() {
        for d in Direction::ALL {
            assert_eq!(d.rotate_cw().rotate_ccw(), d);
            assert_eq!(d.reverse().reverse(), d);
            assert_eq!(d.turned(-1), d.rotate_ccw());
            assert_eq!(d.turned(2), d.reverse());
        }
    }

    #[test]
    fn opposite_steps_cancel() {
        let origin = TileCoordsXY::new(5, 5);
        for d in Direction::ALL {
            assert_eq!(origin.step(d).step(d.reverse()), origin);
        }
    }

    #[test]
    fn perpendicular_directions() {
        assert!(Direction::West.is_perpendicular_to(Direction::North));
        assert!(!Direction::West.is_perpendicular_to(Direction::East));
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("NORTH".parse::<Direction>().ok(), Some(Direction::North));
        assert_eq!(Direction::South.to_string(), "south");
    }
}
