//! Content loaders for reading park data from files.
//!
//! Catalogs and scenarios are RON, configuration is TOML. Every loader
//! returns [`LoadResult`] with the offending path in the error.

pub mod catalog;
pub mod config;
pub mod factory;
pub mod scenario;

pub use catalog::CatalogLoader;
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use scenario::{
    MapSpec, RideSpec, Scenario, ScenarioLoader, ScenarioRide, ScenarioSpec, SceneryPlacement,
};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
