//! Metadata persistence and archival interfaces
//!
//! Encoding and on-disk layout belong to the implementor. The resize workflow
//! only needs to read a volume group (or an orphan PV), write it back and
//! commit it, and keep archive/backup copies of volume group metadata.

use crate::error::Result;
use crate::volume::{PhysicalVolume, VolumeGroup};

/// Trait for metadata storage backends
pub trait MetadataStore {
    /// Read a volume group with all of its PVs and LV segments
    fn vg_read(&mut self, vg_name: &str) -> Result<VolumeGroup>;

    /// Read a PV that does not belong to any volume group
    fn pv_read(&mut self, pv_name: &str) -> Result<PhysicalVolume>;

    /// Write volume group metadata without making it live
    fn vg_write(&mut self, vg: &VolumeGroup) -> Result<()>;

    /// Make previously written volume group metadata live
    fn vg_commit(&mut self, vg: &VolumeGroup) -> Result<()>;

    /// Write orphan PV metadata
    fn pv_write(&mut self, pv: &PhysicalVolume) -> Result<()>;
}

/// Trait for metadata history backends
pub trait Archiver {
    /// Record the current metadata before it is changed
    fn archive(&mut self, vg: &VolumeGroup) -> Result<()>;

    /// Record the metadata after a successful commit
    fn backup(&mut self, vg: &VolumeGroup) -> Result<()>;
}
