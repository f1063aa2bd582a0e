//! Oracle access errors.

use crate::catalog::CatalogError;
use crate::error::{ErrorSeverity, ParkError};

/// Errors raised when the environment cannot supply required data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("CatalogOracle not available")]
    CatalogNotAvailable,

    #[error("RngOracle not available")]
    RngNotAvailable,

    #[error("SimConfig not available")]
    ConfigNotAvailable,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ParkError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            CatalogNotAvailable | RngNotAvailable | ConfigNotAvailable => ErrorSeverity::Fatal,
            Catalog(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            CatalogNotAvailable => "ORACLE_CATALOG_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            ConfigNotAvailable => "ORACLE_CONFIG_NOT_AVAILABLE",
            Catalog(error) => error.error_code(),
        }
    }
}
