//! Measurements gathered by a ride's test run.

use bitflags::bitflags;

bitflags! {
    /// Special track features found on the circuit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SpecialElements: u8 {
        /// Water splash, rapids or spinning tunnel.
        const TUNNEL_SPLASH_OR_RAPIDS = 1 << 5;
        /// Log flume reverser or waterfall.
        const REVERSER_OR_WATERFALL = 1 << 6;
        const WHIRLPOOL = 1 << 7;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ShelteredFlags: u8 {
        const BANKING_WHILE_SHELTERED = 1 << 0;
        const ROTATING_WHILE_SHELTERED = 1 << 1;
    }
}

/// Turn counts bucketed by the length of each uninterrupted turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnCounts {
    /// Unbanked level turns lasting 1, 2 and 3+ pieces.
    pub flat: [u16; 3],
    /// Banked turns lasting 1, 2 and 3+ pieces.
    pub banked: [u16; 3],
    /// Sloped turns lasting 1, 2, 3 and 4+ pieces.
    pub sloped: [u16; 4],
}

impl TurnCounts {
    fn bucket(run: usize, buckets: usize) -> usize {
        run.clamp(1, buckets) - 1
    }

    pub fn record_flat(&mut self, run: usize) {
        let slot = &mut self.flat[Self::bucket(run, 3)];
        *slot = slot.saturating_add(1);
    }

    pub fn record_banked(&mut self, run: usize) {
        let slot = &mut self.banked[Self::bucket(run, 3)];
        *slot = slot.saturating_add(1);
    }

    pub fn record_sloped(&mut self, run: usize) {
        let slot = &mut self.sloped[Self::bucket(run, 4)];
        *slot = slot.saturating_add(1);
    }
}

/// Results of the last completed test run.
///
/// Speeds and lengths are 16.16 fixed point. G-forces are in hundredths of g.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RideStats {
    pub max_speed: i32,
    pub average_speed: i32,
    pub max_positive_vertical_g: i32,
    pub max_negative_vertical_g: i32,
    pub max_lateral_g: i32,
    /// Ticks spent airborne.
    pub total_air_time: u16,
    /// Number of drops, at most 63.
    pub drops: u8,
    /// Number of powered lift hills, at most 3.
    pub powered_lifts: u8,
    /// Highest single drop in element levels.
    pub highest_drop_height: u8,
    pub inversions: u8,
    pub holes: u8,
    pub turns: TurnCounts,
    pub special_elements: SpecialElements,
    pub helix_sections: u8,
    pub sheltered_length: i32,
    pub sheltered_sections: u8,
    pub sheltered_flags: ShelteredFlags,
    /// Tiles covered by a maze.
    pub maze_tiles: u16,
}

impl RideStats {
    pub const MAX_DROPS: u8 = 0x3F;
    pub const MAX_POWERED_LIFTS: u8 = 3;
    pub const MAX_SHELTERED_SECTIONS: u8 = 0x1F;
    pub const MAX_HELIX_SECTIONS: u8 = 0x1F;

    /// Drops and powered lifts packed into one byte, drops in the low six bits.
    pub fn packed_drops(&self) -> u8 {
        (self.drops & Self::MAX_DROPS) | ((self.powered_lifts & Self::MAX_POWERED_LIFTS) << 6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_runs_fall_into_buckets() {
        let mut turns = TurnCounts::default();
        turns.record_flat(1);
        turns.record_flat(2);
        turns.record_flat(7);
        turns.record_sloped(4);
        turns.record_sloped(9);
        assert_eq!(turns.flat, [1, 1, 1]);
        assert_eq!(turns.sloped, [0, 0, 0, 2]);
    }

    #[test]
    fn packed_drops_keeps_lifts_in_high_bits() {
        let stats = RideStats {
            drops: 5,
            powered_lifts: 2,
            ..RideStats::default()
        };
        assert_eq!(stats.packed_drops(), 5 | (2 << 6));
        assert_eq!(stats.packed_drops() >> 6 & 3, 2);
    }
}
