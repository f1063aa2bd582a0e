//! Content factory for loading everything a simulation needs from one
//! directory.

use std::path::{Path, PathBuf};

use park_core::{CatalogOracle, RideCatalog, SimConfig};

use crate::loaders::{CatalogLoader, ConfigLoader, LoadResult, Scenario, ScenarioLoader};

/// Content factory that loads park content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml        (optional)
/// ├── catalog.ron        (optional, the classic ride set otherwise)
/// └── scenarios/
///     ├── oval.ron
///     └── lakeside.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load `config.toml`, or the defaults when there is none.
    pub fn load_config(&self) -> LoadResult<SimConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(SimConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load `catalog.ron`, or the built-in catalog when there is none.
    pub fn load_catalog(&self) -> LoadResult<RideCatalog> {
        let path = self.data_dir.join("catalog.ron");
        if !path.exists() {
            return Ok(RideCatalog::builtin());
        }
        CatalogLoader::load(&path)
    }

    /// Load `scenarios/{name}.ron`.
    pub fn load_scenario(
        &self,
        name: &str,
        catalog: &dyn CatalogOracle,
    ) -> LoadResult<Scenario> {
        let path = self.data_dir.join("scenarios").join(format!("{}.ron", name));
        ScenarioLoader::load(&path, catalog)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().expect("defaults"), SimConfig::default());
        assert_eq!(
            factory.load_catalog().expect("builtin").len(),
            RideCatalog::builtin().len()
        );
        assert!(factory.load_scenario("missing", &RideCatalog::builtin()).is_err());
    }

    #[test]
    fn scenarios_are_read_from_their_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir(dir.path().join("scenarios")).expect("mkdir");
        std::fs::write(
            dir.path().join("scenarios").join("empty.ron"),
            "(name: \"empty\", map: (width: 8, height: 8))",
        )
        .expect("write");
        std::fs::write(dir.path().join("config.toml"), "test_unfinished_tracks = true")
            .expect("write");

        let factory = ContentFactory::new(dir.path());
        let catalog = factory.load_catalog().expect("builtin");
        let scenario = factory.load_scenario("empty", &catalog).expect("loads");
        assert_eq!(scenario.name, "empty");
        assert!(scenario.rides.is_empty());
        assert!(factory.load_config().expect("parses").test_unfinished_tracks);
    }
}
