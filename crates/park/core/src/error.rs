//! Common error infrastructure for park-core.
//!
//! Domain-specific errors (`ValidationError`, `StatusError`, `CatalogError`)
//! live next to the operations that produce them. This module holds the shared
//! severity classification and the trait every error implements.
//!
//! # Design Principles
//!
//! - **Type Safety**: each subsystem has its own error enum
//! - **Rich Context**: errors carry the ride and tile they concern
//! - **Severity Classification**: callers pick a recovery strategy from the severity

use crate::world::{RideId, TileCoordsXYZ};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: transient conditions that clear on a later tick
/// - **Validation**: player-authored content is invalid; report it, do not retry
/// - **Internal**: unexpected state inconsistency that should be investigated
/// - **Fatal**: unrecoverable, the simulation state is corrupted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: the ride being scanned was removed mid-scan.
    Recoverable,

    /// Examples: missing entrance, incomplete circuit.
    Validation,

    /// Examples: ride type without a descriptor.
    Internal,

    /// Examples: ride registry slot table corrupted.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Ride the error concerns (if applicable).
    pub ride: Option<RideId>,

    /// Tile the player should be shown (if applicable).
    pub tile: Option<TileCoordsXYZ>,

    /// Simulation tick at the time of the error.
    pub tick: u64,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    /// Creates a new error context at the given tick.
    #[must_use]
    pub const fn new(tick: u64) -> Self {
        Self {
            ride: None,
            tile: None,
            tick,
            message: None,
        }
    }

    /// Attaches a ride to this context (builder pattern).
    #[must_use]
    pub const fn with_ride(mut self, ride: RideId) -> Self {
        self.ride = Some(ride);
        self
    }

    /// Attaches a tile to this context (builder pattern).
    #[must_use]
    pub const fn with_tile(mut self, tile: TileCoordsXYZ) -> Self {
        self.tile = Some(tile);
        self
    }

    /// Attaches a static message to this context (builder pattern).
    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Common trait for all park-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - `error_code` returns a stable upper-snake identifier
/// - Classify severity based on recoverability, not impact
pub trait ParkError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns the context information for this error, if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
