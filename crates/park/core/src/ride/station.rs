use crate::world::{TileCoordsXY, TileCoordsXYZ, TileCoordsXYZD};

/// One station slot on a ride.
///
/// A slot is in use when `start` is set. Entrance and exit are placed
/// independently and may be missing while the ride is under construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Station {
    /// Front-most platform tile.
    pub start: Option<TileCoordsXY>,
    /// Platform base height in element levels.
    pub height: u8,
    /// Platform length in pieces.
    pub length: u8,
    pub entrance: Option<TileCoordsXYZD>,
    pub exit: Option<TileCoordsXYZD>,
    /// Departure counter and sync flag, see [`Station::DEPART_FLAG`].
    pub depart: u8,
    /// Distance to the next station, 16.16 fixed point.
    pub segment_length: i32,
    /// Travel time to the next station in ticks.
    pub segment_time: u16,
    pub queue_length: u16,
    pub queue_time: u8,
}

impl Station {
    pub const DEPART_FLAG: u8 = 1 << 7;

    pub fn new(start: TileCoordsXYZ, length: u8) -> Self {
        Self {
            start: Some(start.xy()),
            height: start.z.clamp(0, u8::MAX as i32) as u8,
            length,
            ..Self::default()
        }
    }

    pub fn is_populated(&self) -> bool {
        self.start.is_some()
    }

    /// Start tile with its height.
    pub fn start_location(&self) -> Option<TileCoordsXYZ> {
        self.start.map(|tile| tile.with_z(self.height as i32))
    }

    /// Empties the slot.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
