//! Read-only collaborators of the simulation.
//!
//! The ride catalog, the random source and the configuration are bundled in
//! an [`Env`] so the rating engine and the lifecycle reach them without
//! depending on concrete implementations.
mod catalog;
mod error;
mod rng;

pub use catalog::CatalogOracle;
pub use error::OracleError;
pub use rng::{PcgRng, RngOracle, RollContext, compute_seed};

use crate::catalog::{CatalogError, RideEntry, RideTypeDescriptor};
use crate::config::SimConfig;
use crate::ride::RideType;
use crate::world::RideEntryId;

/// Aggregates the read-only collaborators of the engine entry points.
pub struct Env<'a, C, R>
where
    C: CatalogOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    catalog: Option<&'a C>,
    rng: Option<&'a R>,
    config: Option<&'a SimConfig>,
}

impl<C, R> Clone for Env<'_, C, R>
where
    C: CatalogOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, R> Copy for Env<'_, C, R>
where
    C: CatalogOracle + ?Sized,
    R: RngOracle + ?Sized,
{
}

pub type ParkEnv<'a> = Env<'a, dyn CatalogOracle + 'a, dyn RngOracle + 'a>;

impl<'a, C, R> Env<'a, C, R>
where
    C: CatalogOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(catalog: Option<&'a C>, rng: Option<&'a R>, config: Option<&'a SimConfig>) -> Self {
        Self {
            catalog,
            rng,
            config,
        }
    }

    pub fn with_all(catalog: &'a C, rng: &'a R, config: &'a SimConfig) -> Self {
        Self::new(Some(catalog), Some(rng), Some(config))
    }

    pub fn empty() -> Self {
        Self {
            catalog: None,
            rng: None,
            config: None,
        }
    }

    /// # Errors
    ///
    /// Returns `OracleError::CatalogNotAvailable` if no catalog was provided.
    pub fn catalog(&self) -> Result<&'a C, OracleError> {
        self.catalog.ok_or(OracleError::CatalogNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng was provided.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::ConfigNotAvailable` if no config was provided.
    pub fn config(&self) -> Result<&'a SimConfig, OracleError> {
        self.config.ok_or(OracleError::ConfigNotAvailable)
    }

    /// Descriptor of `ride_type`.
    ///
    /// # Errors
    ///
    /// Fails when there is no catalog or it has no descriptor for the type.
    pub fn descriptor(&self, ride_type: RideType) -> Result<&'a RideTypeDescriptor, OracleError> {
        self.catalog()?
            .descriptor(ride_type)
            .ok_or(OracleError::Catalog(CatalogError::MissingDescriptor(
                ride_type,
            )))
    }

    /// Vehicle entry `id`.
    ///
    /// # Errors
    ///
    /// Fails when there is no catalog or the entry does not exist.
    pub fn entry(&self, id: RideEntryId) -> Result<&'a RideEntry, OracleError> {
        self.catalog()?
            .entry(id)
            .ok_or(OracleError::Catalog(CatalogError::MissingEntry(id)))
    }
}

impl<'a, C, R> Env<'a, C, R>
where
    C: CatalogOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts into the trait-object form used by engine entry points.
    pub fn into_park_env(self) -> ParkEnv<'a> {
        self.as_park_env()
    }

    pub fn as_park_env(&self) -> ParkEnv<'a> {
        let catalog: Option<&'a dyn CatalogOracle> = self.catalog.map(|catalog| catalog as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|rng| rng as _);
        Env::new(catalog, rng, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RideCatalog;
    use crate::error::{ErrorSeverity, ParkError};

    #[test]
    fn missing_oracles_are_fatal() {
        let env: ParkEnv<'_> = Env::empty();
        let error = env.catalog().err().expect("no catalog");
        assert_eq!(error.severity(), ErrorSeverity::Fatal);
        assert_eq!(error.error_code(), "ORACLE_CATALOG_NOT_AVAILABLE");
    }

    #[test]
    fn lookups_go_through_the_catalog() {
        let catalog = RideCatalog::builtin();
        let config = SimConfig::default();
        let env = Env::with_all(&catalog, &PcgRng, &config).into_park_env();

        let descriptor = env.descriptor(RideType::LoopingCoaster).expect("builtin");
        assert_eq!(descriptor.ride_type, RideType::LoopingCoaster);

        let error = env.entry(RideEntryId(9_999)).err().expect("unknown entry");
        assert_eq!(error.severity(), ErrorSeverity::Internal);
        assert_eq!(error.error_code(), "CATALOG_MISSING_ENTRY");
    }
}
