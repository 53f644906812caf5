//! Common types and constants for PV segment allocation

use core::fmt;

/// Sector size used for every size in this crate (bytes)
pub const SECTOR_SIZE: u64 = 512;

/// Minimum size of a physical volume (512 KiB, in sectors)
pub const PV_MIN_SIZE: u64 = (512 * 1024) / SECTOR_SIZE;

/// Pseudo volume group name under which orphan PVs are locked
pub const ORPHAN_VG_NAME: &str = "#orphans";

/// Handle of a physical volume inside its volume group
///
/// PVs are never removed from a volume group during a transaction, so the
/// index stays valid for the lifetime of the [`VolumeGroup`](crate::VolumeGroup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PvId(pub(crate) usize);

impl PvId {
    /// Position of the PV in the volume group's PV list
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of an LV segment inside its volume group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LvSegmentId(pub(crate) usize);

impl LvSegmentId {
    /// Position of the LV segment in the volume group's LV segment list
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LvSegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Volume group status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VgStatus {
    /// Shared between cluster nodes
    pub clustered: bool,

    /// Exported, must be imported before use
    pub exported: bool,

    /// Metadata may be written
    pub writeable: bool,
}

impl Default for VgStatus {
    fn default() -> Self {
        Self {
            clustered: false,
            exported: false,
            writeable: true,
        }
    }
}

/// Capabilities of the metadata format a PV was written with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatFeatures {
    /// Format can record a changed PV size
    pub resize_pv: bool,
}

impl Default for FormatFeatures {
    fn default() -> Self {
        Self { resize_pv: true }
    }
}

/// Represents a run of free extents on a PV
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FreeRegion {
    pub start_pe: u32,
    pub end_pe: u32,
}

impl FreeRegion {
    pub fn size_pe(&self) -> u32 {
        self.end_pe - self.start_pe + 1
    }
}
