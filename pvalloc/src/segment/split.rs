//! Segment boundary creation

use crate::error::{PvAllocError, Result};
use crate::segment::PvSegment;
use crate::types::PvId;
use crate::volume::{PhysicalVolume, VolumeGroup};

/// Ensure there is a PV segment boundary at extent `pe`.
///
/// The segment containing `pe` is cut in two. The new tail segment is always
/// free: if the original segment was allocated, the tail's extents leave the
/// allocation and are credited back to the PV and volume group counters.
/// Callers splitting an allocated segment for their own bookkeeping must rebind
/// the tail themselves.
pub fn split_segment(vg: &mut VolumeGroup, pv: PvId, pe: u32) -> Result<()> {
    let pv = vg.pv_checked_mut(pv)?;

    // The end of the PV is always a boundary
    if pe == pv.pe_count {
        return Ok(());
    }

    let idx = pv
        .segment_index_containing(pe)
        .ok_or_else(|| PvAllocError::SegmentNotFound {
            device: pv.dev_name.clone(),
            pe,
        })?;

    if pv.segments[idx].pe == pe {
        return Ok(());
    }

    let detached = split_at_index(pv, idx, pe);
    vg.free_count += detached;

    Ok(())
}

/// Cut segment `idx` at `pe`, returning the extents detached from an allocation
fn split_at_index(pv: &mut PhysicalVolume, idx: usize, pe: u32) -> u32 {
    let seg = &mut pv.segments[idx];
    let tail = PvSegment::free(pe, seg.end() - pe);

    seg.len -= tail.len;

    let detached = if seg.is_allocated() { tail.len } else { 0 };

    pv.segments.insert(idx + 1, tail);
    pv.pe_alloc_count = pv.pe_alloc_count.saturating_sub(detached);

    detached
}
