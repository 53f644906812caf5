//! Allocation policy and resize workflow settings

use crate::types::PV_MIN_SIZE;

/// Policy applied by the segment operations of one volume group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocPolicy {
    /// Merge a released segment with adjacent free segments.
    ///
    /// Off by default: released extents stay as separate free segments.
    pub coalesce_on_release: bool,
}

impl AllocPolicy {
    pub const fn coalescing() -> Self {
        Self {
            coalesce_on_release: true,
        }
    }
}

/// Settings for [`resize_pv_single`](crate::tool::resize_pv_single)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeConfig {
    /// Smallest accepted PV size in sectors
    pub pv_min_size: u64,

    /// Audit the volume group before writing it back
    pub check_before_commit: bool,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            pv_min_size: PV_MIN_SIZE,
            check_before_commit: true,
        }
    }
}
