//! Ride catalog loader.
//!
//! A catalog file lists ride-type descriptors and vehicle entries. With
//! `extends_builtin` the file is layered over the classic ride set:
//! descriptors replace the built-in ones for their type and entries are
//! added alongside.

use std::path::Path;

use park_core::{RideCatalog, RideEntry, RideTypeDescriptor};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// On-disk catalog layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    pub extends_builtin: bool,
    pub descriptors: Vec<RideTypeDescriptor>,
    pub entries: Vec<RideEntry>,
}

/// Loader for [`RideCatalog`] from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn load(path: &Path) -> LoadResult<RideCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load catalog RON {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<RideCatalog> {
        let file: CatalogFile = ron::from_str(content)?;
        let catalog = Self::build(file)?;
        tracing::debug!("loaded catalog with {} ride types", catalog.len());
        Ok(catalog)
    }

    fn build(file: CatalogFile) -> LoadResult<RideCatalog> {
        if !file.extends_builtin {
            return Ok(RideCatalog::from_parts(file.descriptors, file.entries)?);
        }
        let mut catalog = RideCatalog::builtin();
        for descriptor in file.descriptors {
            if descriptor.modes.is_empty() {
                anyhow::bail!("ride type {} supports no operating mode", descriptor.ride_type);
            }
            catalog.override_descriptor(descriptor);
        }
        for entry in file.entries {
            catalog.insert_entry(entry)?;
        }
        Ok(catalog)
    }
}
