//! PV segment table
//!
//! Every physical volume keeps an ordered list of segments that exactly covers
//! its extent range `[0, pe_count)`. A segment is either free or bound to one
//! area of an LV segment. Allocation state lives entirely in the segment
//! boundaries, so the table stays small and the operations below touch only the
//! segments around the affected range.
//!
//! Operations that move extents between "free" and "allocated" also keep the
//! PV's `pe_alloc_count` and the volume group's `free_count` in step. They are
//! the only writers of those counters besides [`resize_pv`](crate::resize::resize_pv).

pub mod assign;
pub mod merge;
pub mod release;
pub mod split;

use alloc::vec::Vec;

use crate::error::{PvAllocError, Result};
use crate::types::{LvSegmentId, PvId};
use crate::volume::PhysicalVolume;

pub use assign::{assign_segment, set_lv_segment_area_pv};
pub use merge::{coalesce_free_segments, merge_lv_segments, merge_segments};
pub use release::{reduce_lv_segment, release_segment};
pub use split::split_segment;

/// LV segment area a PV segment is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaBinding {
    pub lvseg: LvSegmentId,
    pub area: u32,
}

/// Contiguous run of extents on one PV with uniform allocation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PvSegment {
    /// First extent
    pub pe: u32,

    /// Length in extents
    pub len: u32,

    /// Owning LV segment area, `None` when free
    pub binding: Option<AreaBinding>,
}

impl PvSegment {
    pub const fn free(pe: u32, len: u32) -> Self {
        Self {
            pe,
            len,
            binding: None,
        }
    }

    /// First extent past the segment
    #[inline]
    pub const fn end(&self) -> u32 {
        self.pe + self.len
    }

    #[inline]
    pub const fn is_allocated(&self) -> bool {
        self.binding.is_some()
    }
}

/// Handle to a PV segment, as stored in an LV segment's area table.
///
/// A bound segment keeps its start extent across splits (only its tail moves),
/// so `(pv, pe)` stays valid until the segment is merged away or released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PvSegmentRef {
    /// Segment on a PV with per-PV placement tracking
    Tracked { pv: PvId, pe: u32 },

    /// Placeholder for formats without per-PV tracking (missing PV).
    /// Carries no state and is never mutated.
    Untracked,
}

/// Give a PV one free segment spanning all of its extents.
///
/// Replaces any existing table. A PV with no extents keeps an empty table.
pub fn init_whole_pv(pv: &mut PhysicalVolume) {
    pv.segments.clear();

    if pv.pe_count == 0 {
        return;
    }

    pv.segments.push(PvSegment::free(0, pv.pe_count));
}

/// Deep copy of a segment table.
///
/// The copies keep their PV position and LV bindings. Nothing is returned if the
/// copy cannot be allocated.
pub fn duplicate_segments(segments: &[PvSegment]) -> Result<Vec<PvSegment>> {
    let mut copy = Vec::new();
    copy.try_reserve_exact(segments.len())
        .map_err(|_| PvAllocError::AllocationFailed)?;
    copy.extend_from_slice(segments);
    Ok(copy)
}
