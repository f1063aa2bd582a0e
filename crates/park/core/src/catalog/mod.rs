//! Ride type descriptors and vehicle entries.
//!
//! [`RideCatalog`] is the in-memory [`CatalogOracle`]. [`RideCatalog::builtin`]
//! carries the classic ride set; content files can replace or extend it.
mod builtin;
mod descriptor;
mod entry;
mod ratings;

use std::collections::BTreeMap;

pub use descriptor::{
    LiftSpeeds, RatingsMultipliers, RideTypeDescriptor, RideTypeFlags, SpecialElementRating,
    UpkeepCosts, breakdown_mask,
};
pub use entry::{CarSpec, RideEntry, RideEntryFlags};
pub use ratings::{ModifierKind, RatingsCalcType, RatingsDescriptor, RatingsModifier};

use crate::env::CatalogOracle;
use crate::error::{ErrorSeverity, ParkError};
use crate::ride::RideType;
use crate::world::RideEntryId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CatalogError {
    #[error("no descriptor for ride type {0}")]
    MissingDescriptor(RideType),

    #[error("no vehicle entry {0}")]
    MissingEntry(RideEntryId),

    #[error("ride type {0} is described twice")]
    DuplicateDescriptor(RideType),

    #[error("vehicle entry {0} is defined twice")]
    DuplicateEntry(RideEntryId),

    #[error("vehicle entry {entry} is for {ride_type}, which has no descriptor")]
    OrphanEntry { entry: RideEntryId, ride_type: RideType },

    #[error("vehicle entry {entry} allows {min} to {max} cars")]
    InvalidCarRange { entry: RideEntryId, min: u8, max: u8 },

    #[error("ride type {0} supports no operating mode")]
    NoModes(RideType),
}

impl ParkError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        use CatalogError::*;
        match self {
            MissingDescriptor(_) | MissingEntry(_) => ErrorSeverity::Internal,
            DuplicateDescriptor(_)
            | DuplicateEntry(_)
            | OrphanEntry { .. }
            | InvalidCarRange { .. }
            | NoModes(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use CatalogError::*;
        match self {
            MissingDescriptor(_) => "CATALOG_MISSING_DESCRIPTOR",
            MissingEntry(_) => "CATALOG_MISSING_ENTRY",
            DuplicateDescriptor(_) => "CATALOG_DUPLICATE_DESCRIPTOR",
            DuplicateEntry(_) => "CATALOG_DUPLICATE_ENTRY",
            OrphanEntry { .. } => "CATALOG_ORPHAN_ENTRY",
            InvalidCarRange { .. } => "CATALOG_INVALID_CAR_RANGE",
            NoModes(_) => "CATALOG_NO_MODES",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RideCatalog {
    descriptors: BTreeMap<RideType, RideTypeDescriptor>,
    entries: BTreeMap<RideEntryId, RideEntry>,
}

impl RideCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog, rejecting duplicates and entries without a type.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn from_parts(
        descriptors: impl IntoIterator<Item = RideTypeDescriptor>,
        entries: impl IntoIterator<Item = RideEntry>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog.insert_descriptor(descriptor)?;
        }
        for entry in entries {
            catalog.insert_entry(entry)?;
        }
        Ok(catalog)
    }

    /// # Errors
    ///
    /// Fails when the type is already described or supports no mode.
    pub fn insert_descriptor(&mut self, descriptor: RideTypeDescriptor) -> Result<(), CatalogError> {
        if descriptor.modes.is_empty() {
            return Err(CatalogError::NoModes(descriptor.ride_type));
        }
        if self.descriptors.contains_key(&descriptor.ride_type) {
            return Err(CatalogError::DuplicateDescriptor(descriptor.ride_type));
        }
        self.descriptors.insert(descriptor.ride_type, descriptor);
        Ok(())
    }

    /// # Errors
    ///
    /// Fails on a duplicate id, an unknown ride type or an empty car range.
    pub fn insert_entry(&mut self, entry: RideEntry) -> Result<(), CatalogError> {
        if self.entries.contains_key(&entry.id) {
            return Err(CatalogError::DuplicateEntry(entry.id));
        }
        if !self.descriptors.contains_key(&entry.ride_type) {
            return Err(CatalogError::OrphanEntry {
                entry: entry.id,
                ride_type: entry.ride_type,
            });
        }
        if entry.min_cars_per_train > entry.max_cars_per_train {
            return Err(CatalogError::InvalidCarRange {
                entry: entry.id,
                min: entry.min_cars_per_train,
                max: entry.max_cars_per_train,
            });
        }
        self.entries.insert(entry.id, entry);
        Ok(())
    }

    /// Replaces the descriptor of an already described type, or adds it.
    pub fn override_descriptor(&mut self, descriptor: RideTypeDescriptor) {
        self.descriptors.insert(descriptor.ride_type, descriptor);
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &RideTypeDescriptor> {
        self.descriptors.values()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RideEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl CatalogOracle for RideCatalog {
    fn descriptor(&self, ride_type: RideType) -> Option<&RideTypeDescriptor> {
        self.descriptors.get(&ride_type)
    }

    fn entry(&self, id: RideEntryId) -> Option<&RideEntry> {
        self.entries.get(&id)
    }

    fn default_entry(&self, ride_type: RideType) -> Option<&RideEntry> {
        self.entries
            .values()
            .find(|entry| entry.ride_type == ride_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn builtin_describes_every_ride_type() {
        let catalog = RideCatalog::builtin();
        for ride_type in RideType::iter() {
            let descriptor = catalog.descriptor(ride_type).expect("described");
            assert!(!descriptor.modes.is_empty(), "{ride_type} has no modes");
        }
        assert_eq!(catalog.len(), RideType::iter().count());
    }

    #[test]
    fn builtin_has_a_vehicle_for_every_ride_type() {
        let catalog = RideCatalog::builtin();
        for ride_type in RideType::iter() {
            let entry = catalog.default_entry(ride_type).expect("vehicle entry");
            assert_eq!(entry.ride_type, ride_type);
            assert!(entry.min_cars_per_train <= entry.max_cars_per_train);
        }
    }

    #[test]
    fn entries_need_a_described_type() {
        let mut catalog = RideCatalog::new();
        let entry = RideCatalog::builtin()
            .default_entry(RideType::Maze)
            .cloned()
            .expect("maze entry");
        assert_eq!(
            catalog.insert_entry(entry),
            Err(CatalogError::OrphanEntry {
                entry: RideEntryId(6),
                ride_type: RideType::Maze,
            })
        );
    }

    #[test]
    fn duplicate_descriptors_are_rejected() {
        let builtin = RideCatalog::builtin();
        let looping = builtin
            .descriptor(RideType::LoopingCoaster)
            .cloned()
            .expect("looping");
        let error = RideCatalog::from_parts([looping.clone(), looping], [])
            .expect_err("duplicate");
        assert_eq!(error, CatalogError::DuplicateDescriptor(RideType::LoopingCoaster));
        assert_eq!(error.severity(), ErrorSeverity::Validation);
    }
}
