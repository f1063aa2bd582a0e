use std::fmt;

/// A single rating component in hundredths (`650` displays as `6.50`).
pub type RideRating = i16;

/// Excitement, intensity and nausea of a ride.
///
/// The tuple is either undefined (excitement holds [`RatingTuple::UNDEFINED`])
/// or holds three computed values. An all-zero tuple is a valid rating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingTuple {
    pub excitement: RideRating,
    pub intensity: RideRating,
    pub nausea: RideRating,
}

impl RatingTuple {
    /// Sentinel marking ratings that have not been calculated (`0xFFFF`).
    pub const UNDEFINED: RideRating = -1;

    pub const NULL: Self = Self {
        excitement: Self::UNDEFINED,
        intensity: Self::UNDEFINED,
        nausea: Self::UNDEFINED,
    };

    pub const ZERO: Self = Self {
        excitement: 0,
        intensity: 0,
        nausea: 0,
    };

    pub const fn new(excitement: RideRating, intensity: RideRating, nausea: RideRating) -> Self {
        Self {
            excitement,
            intensity,
            nausea,
        }
    }

    /// Truncates raw 32-bit sub-rating sums the way the fixed-point formula does.
    pub const fn from_raw(excitement: i32, intensity: i32, nausea: i32) -> Self {
        Self {
            excitement: excitement as i16,
            intensity: intensity as i16,
            nausea: nausea as i16,
        }
    }

    pub const fn is_null(&self) -> bool {
        self.excitement == Self::UNDEFINED
    }

    pub fn set_null(&mut self) {
        *self = Self::NULL;
    }

    /// Adds to each component, clamping the result to `0..=i16::MAX`.
    pub fn add(&mut self, excitement: i32, intensity: i32, nausea: i32) {
        self.excitement = clamp_rating(self.excitement as i32 + excitement);
        self.intensity = clamp_rating(self.intensity as i32 + intensity);
        self.nausea = clamp_rating(self.nausea as i32 + nausea);
    }

    /// Replaces all components, clamping each to `0..=i16::MAX`.
    pub fn set(&mut self, excitement: i32, intensity: i32, nausea: i32) {
        *self = Self::ZERO;
        self.add(excitement, intensity, nausea);
    }
}

impl Default for RatingTuple {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for RatingTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "not yet known");
        }
        let part = |value: RideRating| format!("{}.{:02}", value / 100, value % 100);
        write!(
            f,
            "E {} / I {} / N {}",
            part(self.excitement),
            part(self.intensity),
            part(self.nausea)
        )
    }
}

#[inline]
fn clamp_rating(value: i32) -> RideRating {
    value.clamp(0, i16::MAX as i32) as RideRating
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tuple_is_not_null() {
        assert!(!RatingTuple::ZERO.is_null());
        assert!(RatingTuple::NULL.is_null());
        assert!(RatingTuple::default().is_null());
    }

    #[test]
    fn add_clamps_instead_of_wrapping() {
        let mut ratings = RatingTuple::ZERO;
        ratings.add(40_000, -5, 100);
        assert_eq!(ratings, RatingTuple::new(i16::MAX, 0, 100));
    }

    #[test]
    fn set_from_null_starts_at_zero() {
        let mut ratings = RatingTuple::NULL;
        ratings.set(300, 50, 20);
        assert_eq!(ratings, RatingTuple::new(300, 50, 20));
    }

    #[test]
    fn display_shows_two_decimals() {
        assert_eq!(RatingTuple::new(650, 705, 12).to_string(), "E 6.50 / I 7.05 / N 0.12");
        assert_eq!(RatingTuple::NULL.to_string(), "not yet known");
    }
}
