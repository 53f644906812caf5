//! Binding PV extent ranges to LV segment areas

use crate::error::{PvAllocError, Result};
use crate::segment::{split_segment, AreaBinding, PvSegmentRef};
use crate::types::{LvSegmentId, PvId};
use crate::volume::{SegArea, VolumeGroup};

/// Bind extents `[pe, pe + area_len)` of a PV to area `area` of `lvseg`.
///
/// The range must lie inside a single free segment; anything else is reported
/// as [`PvAllocError::GeometryMismatch`] before the table is touched. Passing
/// `None` for the PV (a format without per-PV placement) returns
/// [`PvSegmentRef::Untracked`] and records nothing.
///
/// The returned handle is what the LV segment stores in its area table, see
/// [`set_lv_segment_area_pv`].
pub fn assign_segment(
    vg: &mut VolumeGroup,
    pv: Option<PvId>,
    pe: u32,
    area_len: u32,
    lvseg: LvSegmentId,
    area: u32,
) -> Result<PvSegmentRef> {
    let Some(pv_id) = pv else {
        return Ok(PvSegmentRef::Untracked);
    };

    let seg = vg.lv_segment_checked(lvseg)?;
    if area as usize >= seg.areas.len() {
        return Err(PvAllocError::AreaOutOfRange { lvseg, area });
    }

    let pv = vg.pv_checked(pv_id)?;

    // The whole range has to come out of one free segment
    let available = match pv.find_segment(pe) {
        Some(seg) if !seg.is_allocated() => seg.end() - pe,
        Some(_) => 0,
        None => {
            return Err(PvAllocError::SegmentNotFound {
                device: pv.dev_name.clone(),
                pe,
            })
        }
    };
    if area_len == 0 || available < area_len {
        return Err(PvAllocError::GeometryMismatch {
            device: pv.dev_name.clone(),
            pe,
            expected: area_len,
            found: available,
        });
    }

    split_segment(vg, pv_id, pe)?;
    split_segment(vg, pv_id, pe + area_len)?;

    let pv = vg.pv_checked_mut(pv_id)?;
    let idx = pv
        .segment_index_at(pe)
        .ok_or_else(|| PvAllocError::SegmentNotFound {
            device: pv.dev_name.clone(),
            pe,
        })?;

    let seg = &mut pv.segments[idx];
    if seg.is_allocated() || seg.len != area_len {
        return Err(PvAllocError::GeometryMismatch {
            device: pv.dev_name.clone(),
            pe,
            expected: area_len,
            found: seg.len,
        });
    }

    seg.binding = Some(AreaBinding { lvseg, area });
    pv.pe_alloc_count += area_len;
    vg.free_count = vg.free_count.saturating_sub(area_len);

    Ok(PvSegmentRef::Tracked { pv: pv_id, pe })
}

/// Place area `area` of `lvseg` at extent `pe` of `pv` and record the back-reference.
///
/// The area length comes from the LV segment. Returns the stored handle.
pub fn set_lv_segment_area_pv(
    vg: &mut VolumeGroup,
    lvseg: LvSegmentId,
    area: u32,
    pv: Option<PvId>,
    pe: u32,
) -> Result<PvSegmentRef> {
    let area_len = vg.lv_segment_checked(lvseg)?.area_len;

    let seg_ref = assign_segment(vg, pv, pe, area_len, lvseg, area)?;

    let seg = vg.lv_segment_checked_mut(lvseg)?;
    match seg.areas.get_mut(area as usize) {
        Some(slot) => *slot = SegArea::Pv(seg_ref),
        None => return Err(PvAllocError::AreaOutOfRange { lvseg, area }),
    }

    Ok(seg_ref)
}
