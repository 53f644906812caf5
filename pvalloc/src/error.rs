//! Error types for PV segment operations

use alloc::string::String;
use thiserror::Error;

use crate::types::LvSegmentId;

/// Result type for PV segment operations
pub type Result<T> = core::result::Result<T, PvAllocError>;

/// Errors that can occur while manipulating PV segments or resizing a PV
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PvAllocError {
    /// No segment covers the requested extent (corrupted segment table)
    #[error("segment with extent {pe} in PV {device} not found")]
    SegmentNotFound { device: String, pe: u32 },

    /// Assign target is not exactly one free segment of the requested length
    #[error("PV segment on {device} at {pe} has {found} free extents, expected {expected}")]
    GeometryMismatch {
        device: String,
        pe: u32,
        expected: u32,
        found: u32,
    },

    /// Release of a segment that is not bound to an LV segment
    #[error("release of unallocated segment: {device} PE {pe}")]
    NotAllocated { device: String, pe: u32 },

    /// Release length is zero or larger than the bound area
    #[error("{device} PE {pe}: cannot release {reduction} of {area_len} extents")]
    InvalidReduction {
        device: String,
        pe: u32,
        reduction: u32,
        area_len: u32,
    },

    /// Extend would exceed the physical size of the PV
    #[error("{device}: cannot resize to {requested} extents as there is only room for {available}")]
    CapacityExceeded {
        device: String,
        requested: u32,
        available: u64,
    },

    /// Reduce would shrink below the allocated extent count
    #[error("{device}: cannot resize to {requested} extents as {allocated} are allocated")]
    InsufficientFreeSpace {
        device: String,
        requested: u32,
        allocated: u32,
    },

    /// Reduce would discard extents that are still allocated
    #[error("{device}: cannot resize to {requested} extents as later ones are allocated (PE {pe})")]
    AllocatedBeyondBoundary {
        device: String,
        requested: u32,
        pe: u32,
    },

    /// Consistency audit found one or more violations
    #[error("{count} PV segment consistency violation(s) in volume group {vg_name}")]
    ConsistencyViolation { vg_name: String, count: usize },

    /// Working copy could not be allocated
    #[error("PV segment allocation failed")]
    AllocationFailed,

    /// PV handle does not name a PV of this volume group
    #[error("physical volume #{index} not found in volume group {vg_name}")]
    PvNotFound { vg_name: String, index: usize },

    /// LV segment handle is dangling
    #[error("LV segment {0} not found")]
    LvSegmentNotFound(LvSegmentId),

    /// Area index beyond the LV segment's area table
    #[error("LV segment {lvseg} has no area {area}")]
    AreaOutOfRange { lvseg: LvSegmentId, area: u32 },

    /// Tracked segment paired with an untracked one in a merge
    #[error("cannot merge {device} PE {pe} with an untracked segment")]
    UntrackedMerge { device: String, pe: u32 },

    // ========================================================================
    // Resize workflow
    // ========================================================================
    /// Volume group lock could not be acquired
    #[error("can't get lock for {vg_name}")]
    LockFailed { vg_name: String },

    /// Volume group metadata not found
    #[error("volume group \"{vg_name}\" not found")]
    VgNotFound { vg_name: String },

    /// Orphan PV metadata not found
    #[error("unable to read PV \"{pv_name}\"")]
    PvReadFailed { pv_name: String },

    /// PV is not a member of the volume group it was expected in
    #[error("unable to find \"{pv_name}\" in volume group \"{vg_name}\"")]
    PvNotInVg { pv_name: String, vg_name: String },

    /// Clustered volume groups are not handled here
    #[error("volume group \"{vg_name}\" is clustered")]
    VgClustered { vg_name: String },

    /// Exported volume groups cannot be changed
    #[error("volume group \"{vg_name}\" is exported")]
    VgExported { vg_name: String },

    /// Volume group is read-only
    #[error("volume group \"{vg_name}\" is read-only")]
    VgReadOnly { vg_name: String },

    /// Orphan PV carries more metadata areas than a resize can rewrite
    #[error("{pv_name}: too many metadata areas for pvresize")]
    TooManyMetadataAreas { pv_name: String },

    /// PV format cannot be resized
    #[error("physical volume {pv_name} format does not support resizing")]
    ResizeNotSupported { pv_name: String },

    /// Device capacity probe failed
    #[error("{pv_name}: couldn't get size")]
    DeviceSize { pv_name: String },

    /// New size below the minimum PV size
    #[error("{pv_name}: size must exceed minimum of {min_size} sectors")]
    BelowMinimumSize { pv_name: String, min_size: u64 },

    /// New size does not reach the first extent
    #[error("{pv_name}: size must exceed physical extent start of {pe_start} sectors")]
    BelowPeStart { pv_name: String, pe_start: u64 },

    /// New size leaves no room for a single extent
    #[error("{pv_name}: size must leave space for at least one physical extent of {pe_size} sectors")]
    NoExtentRoom { pv_name: String, pe_size: u32 },

    /// Archive of the pre-change metadata failed
    #[error("failed to archive metadata of volume group \"{vg_name}\"")]
    ArchiveFailed { vg_name: String },

    /// Backup of the committed metadata failed
    #[error("failed to back up metadata of volume group \"{vg_name}\"")]
    BackupFailed { vg_name: String },

    /// Metadata write or commit failed, nothing was applied
    #[error("failed to store physical volume \"{pv_name}\"{}", in_vg(.vg_name))]
    MetadataWrite {
        pv_name: String,
        vg_name: Option<String>,
    },
}

fn in_vg(vg_name: &Option<String>) -> String {
    match vg_name {
        Some(name) => alloc::format!(" in volume group \"{}\"", name),
        None => String::new(),
    }
}
