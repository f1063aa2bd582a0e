//! Simulation configuration loader.

use std::path::Path;

use park_core::SimConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`SimConfig`] from TOML files.
///
/// Missing keys keep their defaults, so an empty file yields the classic
/// behaviour.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<SimConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<SimConfig> {
        let config: SimConfig = toml::from_str(content)?;
        if config.rating_sub_steps > SimConfig::MAX_RATING_SUB_STEPS {
            tracing::warn!(
                "rating_sub_steps {} clamped to {}",
                config.rating_sub_steps,
                SimConfig::MAX_RATING_SUB_STEPS
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"").expect("write");
        let config = ConfigLoader::load(file.path()).expect("parses");
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "rating_sub_steps = 5\ndisable_breakdowns = true").expect("write");
        let config = ConfigLoader::load(file.path()).expect("parses");
        assert_eq!(config.rating_sub_steps, 5);
        assert!(config.disable_breakdowns);
        assert!(!config.disable_brakes_failure);
        assert_eq!(config.scan_step_limit, SimConfig::DEFAULT_SCAN_STEP_LIMIT);
    }

    #[test]
    fn errors_name_the_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "rating_sub_steps = \"many\"").expect("write");
        let error = ConfigLoader::load(file.path()).expect_err("bad type");
        assert!(error.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(ConfigLoader::load(&dir.path().join("config.toml")).is_err());
    }
}
