//! Data-driven park content and its loaders.
//!
//! Ride catalogs and scenarios are RON files, simulation configuration is
//! TOML. Loaders turn them into park-core types: a [`RideCatalog`] that
//! serves as the catalog oracle, a [`SimConfig`], and a ready-built
//! [`World`] for a scenario.
//!
//! [`RideCatalog`]: park_core::RideCatalog
//! [`SimConfig`]: park_core::SimConfig
//! [`World`]: park_core::World

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    CatalogLoader, ConfigLoader, ContentFactory, LoadResult, RideSpec, Scenario, ScenarioLoader,
    ScenarioSpec, SceneryPlacement,
};
