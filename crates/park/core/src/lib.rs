//! Deterministic ride simulation shared by hosts and offline tools.
//!
//! `park-core` models rides on a tile map: their track, stations and
//! vehicles, the ratings computed from the track layout, and the lifecycle
//! that takes a ride from construction through testing, opening and
//! breakdowns. Hosts drive it one tick at a time through
//! [`ratings::RatingEngine::update_all`] and [`lifecycle::update_rides`], and
//! change ride status through [`lifecycle::set_ride_status`]. Everything a
//! tick needs from outside (ride catalog, random numbers, tunables) comes in
//! through [`env::Env`].
pub mod catalog;
pub mod config;
pub mod env;
pub mod error;
pub mod lifecycle;
pub mod ratings;
pub mod ride;
pub mod track;
pub mod world;

pub use catalog::{
    CarSpec, CatalogError, RideCatalog, RideEntry, RideEntryFlags, RideTypeDescriptor,
    RideTypeFlags,
};
pub use config::SimConfig;
pub use env::{CatalogOracle, Env, OracleError, ParkEnv, PcgRng, RngOracle, RollContext};
pub use error::{ErrorContext, ErrorSeverity, ParkError};
pub use lifecycle::{
    CommandMode, StatusError, StatusPlan, TransitionPhase, ValidationError, ValidationFailure,
    complete_test_run, fix_ride, invalidate_test_results, query_status, set_ride_status,
    update_rides,
};
pub use ratings::{RatingEngine, TickReport, force_update_ride};
pub use ride::{
    BreakdownKind, InspectionInterval, LifecycleFlags, MechanicStatus, RatingTuple, Reliability,
    Ride, RideMode, RideStats, RideStatus, RideType, Station,
};
pub use track::{LayoutBuilder, TrackElemType, TrackGraph, TrackPiece};
pub use world::{
    Direction, ParkEvent, ParkEventRecord, RideId, Tick, TileCoordsXY, TileCoordsXYZ,
    TileCoordsXYZD, TileMap, World,
};
#[cfg(feature = "serde")]
pub use world::SnapshotError;
