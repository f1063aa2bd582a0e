//! Breakdown, mechanic and inspection state carried by each ride.

/// Mechanical failure a ride can suffer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::EnumString,
    strum::AsRefStr, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BreakdownKind {
    SafetyCutOut,
    RestraintsStuckClosed,
    RestraintsStuckOpen,
    DoorsStuckClosed,
    DoorsStuckOpen,
    VehicleMalfunction,
    BrakesFailure,
    ControlFailure,
}

impl BreakdownKind {
    pub const ALL: [BreakdownKind; 8] = [
        BreakdownKind::SafetyCutOut,
        BreakdownKind::RestraintsStuckClosed,
        BreakdownKind::RestraintsStuckOpen,
        BreakdownKind::DoorsStuckClosed,
        BreakdownKind::DoorsStuckOpen,
        BreakdownKind::VehicleMalfunction,
        BreakdownKind::BrakesFailure,
        BreakdownKind::ControlFailure,
    ];

    /// Bit of this kind in a ride type's available-breakdowns mask.
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Relative chance of picking this kind when a breakdown is rolled.
    pub const fn weight(self, raining: bool) -> u32 {
        match self {
            Self::SafetyCutOut => 25,
            Self::RestraintsStuckClosed => 12,
            Self::RestraintsStuckOpen => 10,
            Self::DoorsStuckClosed => 13,
            Self::DoorsStuckOpen => 10,
            Self::VehicleMalfunction => 6,
            Self::BrakesFailure if raining => 20,
            Self::BrakesFailure => 3,
            Self::ControlFailure => 3,
        }
    }

    /// Kinds that stop the ride as soon as the mechanic status updates.
    pub const fn stops_ride_immediately(self) -> bool {
        matches!(
            self,
            Self::SafetyCutOut | Self::BrakesFailure | Self::ControlFailure
        )
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MechanicStatus {
    #[default]
    Undefined,
    Calling,
    Heading,
    Fixing,
    HasFixedStationBrakes,
}

/// How often a mechanic inspects the ride.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString,
    strum::AsRefStr, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InspectionInterval {
    Every10Minutes,
    Every20Minutes,
    #[default]
    Every30Minutes,
    Every45Minutes,
    EveryHour,
    Every2Hours,
    Never,
}

impl InspectionInterval {
    /// Interval length in game minutes, `None` for [`InspectionInterval::Never`].
    pub const fn minutes(self) -> Option<u8> {
        match self {
            Self::Every10Minutes => Some(10),
            Self::Every20Minutes => Some(20),
            Self::Every30Minutes => Some(30),
            Self::Every45Minutes => Some(45),
            Self::EveryHour => Some(60),
            Self::Every2Hours => Some(120),
            Self::Never => None,
        }
    }
}

/// Reliability and breakdown bookkeeping.
///
/// `reliability` is 8.8 fixed point; the high byte is the percentage shown
/// to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Reliability {
    pub reliability: u16,
    /// Reliability lost every 256 ticks. Recomputed by the ratings pass.
    pub unreliability_factor: u8,
    pub breakdown_reason_pending: Option<BreakdownKind>,
    pub breakdown_reason: Option<BreakdownKind>,
    pub mechanic_status: MechanicStatus,
    pub inspection_interval: InspectionInterval,
    /// Minutes since the last inspection, saturating.
    pub last_inspection: u8,
    /// Station the mechanic should head to.
    pub inspection_station: u8,
    pub broken_train: u8,
    pub broken_car: u8,
    /// Status updates spent broken without a fix.
    pub not_fixed_timeout: u8,
    /// Percentage of recent time spent broken down.
    pub downtime: u8,
    pub downtime_history: [u8; Reliability::DOWNTIME_HISTORY],
}

impl Reliability {
    /// Reliability of a new ride: 100 % plus the full fraction byte.
    pub const INITIAL: u16 = (100 << 8) | 0xFF;
    pub const DOWNTIME_HISTORY: usize = 8;

    pub const fn percentage(&self) -> u8 {
        (self.reliability >> 8) as u8
    }
}

impl Default for Reliability {
    fn default() -> Self {
        Self {
            reliability: Self::INITIAL,
            unreliability_factor: 0,
            breakdown_reason_pending: None,
            breakdown_reason: None,
            mechanic_status: MechanicStatus::Undefined,
            inspection_interval: InspectionInterval::default(),
            last_inspection: 0,
            inspection_station: 0,
            broken_train: 0,
            broken_car: 0,
            not_fixed_timeout: 0,
            downtime: 0,
            downtime_history: [0; Self::DOWNTIME_HISTORY],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_classic_total() {
        let dry: u32 = BreakdownKind::ALL.iter().map(|kind| kind.weight(false)).sum();
        let wet: u32 = BreakdownKind::ALL.iter().map(|kind| kind.weight(true)).sum();
        assert_eq!(dry, 82);
        assert_eq!(wet, 99);
    }

    #[test]
    fn new_rides_start_fully_reliable() {
        let reliability = Reliability::default();
        assert_eq!(reliability.reliability, 25_855);
        assert_eq!(reliability.percentage(), 100);
    }

    #[test]
    fn never_has_no_interval() {
        assert_eq!(InspectionInterval::Never.minutes(), None);
        assert_eq!(InspectionInterval::Every2Hours.minutes(), Some(120));
    }
}
