//! Returning PV extents to the free pool

use alloc::vec::Vec;

use crate::error::{PvAllocError, Result};
use crate::segment::{coalesce_free_segments, split_segment, PvSegmentRef};
use crate::types::LvSegmentId;
use crate::volume::{SegArea, VolumeGroup};

/// Release the last `reduction` extents of an allocated PV segment.
///
/// Releasing the full area length frees the segment and clears the LV area's
/// back-reference. A shorter release splits the segment so that the trailing
/// `reduction` extents become a separate free segment; the caller then shrinks
/// the LV segment's area length (see [`reduce_lv_segment`]).
///
/// Freed extents are only merged with free neighbours when the volume group's
/// policy asks for it.
pub fn release_segment(vg: &mut VolumeGroup, seg: PvSegmentRef, reduction: u32) -> Result<()> {
    let PvSegmentRef::Tracked { pv: pv_id, pe } = seg else {
        return Ok(());
    };

    let pv = vg.pv_checked(pv_id)?;
    let idx = pv
        .segment_index_at(pe)
        .ok_or_else(|| PvAllocError::SegmentNotFound {
            device: pv.dev_name.clone(),
            pe,
        })?;
    let binding = pv.segments[idx]
        .binding
        .ok_or_else(|| PvAllocError::NotAllocated {
            device: pv.dev_name.clone(),
            pe,
        })?;

    let area_len = vg.lv_segment_checked(binding.lvseg)?.area_len;
    if reduction == 0 || reduction > area_len {
        return Err(PvAllocError::InvalidReduction {
            device: pv.dev_name.clone(),
            pe,
            reduction,
            area_len,
        });
    }

    if reduction == area_len {
        let pv = vg.pv_checked_mut(pv_id)?;
        pv.segments[idx].binding = None;
        pv.pe_alloc_count = pv.pe_alloc_count.saturating_sub(reduction);
        vg.free_count += reduction;

        let lvseg = vg.lv_segment_checked_mut(binding.lvseg)?;
        if let Some(slot) = lvseg.areas.get_mut(binding.area as usize) {
            if *slot == SegArea::Pv(seg) {
                *slot = SegArea::Unassigned;
            }
        }
    } else {
        split_segment(vg, pv_id, pe + area_len - reduction)?;
    }

    if vg.policy.coalesce_on_release {
        coalesce_free_segments(vg, pv_id)?;
    }

    Ok(())
}

/// Shrink every area of an LV segment by `area_reduction` extents.
///
/// PV-backed areas give their trailing extents back through
/// [`release_segment`]. Reducing by the full area length detaches the LV
/// segment from the volume group.
pub fn reduce_lv_segment(
    vg: &mut VolumeGroup,
    lvseg: LvSegmentId,
    area_reduction: u32,
) -> Result<()> {
    let seg = vg.lv_segment_checked(lvseg)?;
    let area_len = seg.area_len;

    if area_reduction == 0 || area_reduction > area_len {
        return Err(PvAllocError::InvalidReduction {
            device: seg.lv_name.clone(),
            pe: seg.le,
            reduction: area_reduction,
            area_len,
        });
    }

    let backing: Vec<PvSegmentRef> = seg
        .areas
        .iter()
        .filter_map(|area| match area {
            SegArea::Pv(seg_ref) => Some(*seg_ref),
            _ => None,
        })
        .collect();

    for seg_ref in backing {
        release_segment(vg, seg_ref, area_reduction)?;
    }

    if area_reduction == area_len {
        if let Some(seg) = vg.detach_lv_segment(lvseg) {
            log::debug!("Removed segment {} of {} (LE {})", lvseg, seg.lv_name, seg.le);
        }
    } else {
        vg.lv_segment_checked_mut(lvseg)?.area_len -= area_reduction;
    }

    Ok(())
}
