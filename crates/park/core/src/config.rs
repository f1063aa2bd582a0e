/// Simulation capacities and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Sub-steps each rating update slot may run per tick.
    /// Clamped to [`Self::MAX_RATING_SUB_STEPS`].
    pub rating_sub_steps: usize,

    /// Allows testing a ride whose circuit is not closed (except in
    /// block-sectioned modes, which always need a complete circuit).
    pub test_unfinished_tracks: bool,

    pub disable_breakdowns: bool,
    pub disable_brakes_failure: bool,
    pub disable_train_length_limit: bool,
    pub disable_ride_value_aging: bool,

    /// Upper bound on pieces visited by a forced rating pass or a circuit walk.
    /// Guards against malformed track graphs that never terminate.
    pub scan_step_limit: usize,
}

impl SimConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_RIDES: usize = 1000;
    pub const MAX_STATIONS_PER_RIDE: usize = 4;
    pub const MAX_TRAINS_PER_RIDE: usize = 32;
    pub const MAX_CARS_PER_TRAIN: u8 = 255;
    pub const MAX_RATING_UPDATE_STATES: usize = 4;
    pub const MAX_RATING_SUB_STEPS: usize = 20;
    pub const MAX_VEHICLE_SLOTS: usize = 10_000;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_SCAN_STEP_LIMIT: usize = 100_000;

    pub fn new() -> Self {
        Self {
            rating_sub_steps: Self::MAX_RATING_SUB_STEPS,
            test_unfinished_tracks: false,
            disable_breakdowns: false,
            disable_brakes_failure: false,
            disable_train_length_limit: false,
            disable_ride_value_aging: false,
            scan_step_limit: Self::DEFAULT_SCAN_STEP_LIMIT,
        }
    }

    /// Effective per-slot sub-step budget.
    pub fn sub_step_budget(&self) -> usize {
        self.rating_sub_steps.clamp(1, Self::MAX_RATING_SUB_STEPS)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_step_budget_is_clamped() {
        let mut config = SimConfig::default();
        assert_eq!(config.sub_step_budget(), SimConfig::MAX_RATING_SUB_STEPS);

        config.rating_sub_steps = 500;
        assert_eq!(config.sub_step_budget(), SimConfig::MAX_RATING_SUB_STEPS);

        config.rating_sub_steps = 0;
        assert_eq!(config.sub_step_budget(), 1);
    }
}
