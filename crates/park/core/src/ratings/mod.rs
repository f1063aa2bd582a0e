//! Ride ratings: the resumable proximity scan and the formula it feeds.
//!
//! [`RatingEngine::update_all`] advances a few concurrent passes a bounded
//! amount each tick; [`force_update_ride`] runs one pass to completion. Both
//! end in the same calculation: ratings from the type's modifier table,
//! upkeep, and value.
mod engine;
mod formula;
mod proximity;
mod state;
mod upkeep;
mod value;

pub use engine::{RatingEngine, TickReport, force_update_ride};
pub use formula::{
    RatingInputs, ShelteredEighths, apply_adjustments, apply_intensity_penalty, apply_modifier,
    compute_ratings, drops_rating, g_force_rating, has_adjacent_synchronised_station,
    lateral_g_penalty, scenery_score, sheltered_eighths, sheltered_rating, turns_rating,
    unreliability_factor,
};
pub use proximity::{proximity_score, score_close_proximity};
pub use state::{ProximityCategory, RatingState, RatingUpdateState, ScanFlags};
pub use upkeep::compute_upkeep;
pub use value::compute_value;
