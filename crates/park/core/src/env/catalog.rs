use crate::catalog::{RideEntry, RideTypeDescriptor};
use crate::ride::RideType;
use crate::world::RideEntryId;

/// Read-only ride type descriptors and vehicle entries.
pub trait CatalogOracle: Send + Sync {
    fn descriptor(&self, ride_type: RideType) -> Option<&RideTypeDescriptor>;

    fn entry(&self, id: RideEntryId) -> Option<&RideEntry>;

    /// First vehicle entry built for `ride_type`.
    fn default_entry(&self, ride_type: RideType) -> Option<&RideEntry>;
}
