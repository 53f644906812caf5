//! Joining adjacent PV segments

use alloc::vec::Vec;

use crate::error::{PvAllocError, Result};
use crate::segment::PvSegmentRef;
use crate::types::{LvSegmentId, PvId};
use crate::volume::{SegArea, VolumeGroup};

/// Append segment `second` to segment `first` and drop `second` from the table.
///
/// Only for LV segment merging: the caller guarantees both segments belong to the
/// merged LV segment area. No counters change. `second` must directly follow
/// `first` on the same PV. Two untracked refs merge trivially; a tracked ref
/// paired with an untracked one is an error.
pub fn merge_segments(vg: &mut VolumeGroup, first: PvSegmentRef, second: PvSegmentRef) -> Result<()> {
    let (pv_id, first_pe, second_pv, second_pe) = match (first, second) {
        (
            PvSegmentRef::Tracked { pv: pv_id, pe: first_pe },
            PvSegmentRef::Tracked { pv: second_pv, pe: second_pe },
        ) => (pv_id, first_pe, second_pv, second_pe),
        (PvSegmentRef::Untracked, PvSegmentRef::Untracked) => return Ok(()),
        (PvSegmentRef::Tracked { pv, pe }, PvSegmentRef::Untracked)
        | (PvSegmentRef::Untracked, PvSegmentRef::Tracked { pv, pe }) => {
            return Err(PvAllocError::UntrackedMerge {
                device: vg.pv_checked(pv)?.dev_name.clone(),
                pe,
            });
        }
    };

    let pv = vg.pv_checked_mut(pv_id)?;
    let idx = pv
        .segment_index_at(first_pe)
        .ok_or_else(|| PvAllocError::SegmentNotFound {
            device: pv.dev_name.clone(),
            pe: first_pe,
        })?;

    let expected = pv.segments[idx].end();
    if second_pv != pv_id || pv.segments.get(idx + 1).map(|s| s.pe) != Some(second_pe) {
        return Err(PvAllocError::GeometryMismatch {
            device: pv.dev_name.clone(),
            pe: first_pe,
            expected,
            found: second_pe,
        });
    }

    let absorbed = pv.segments.remove(idx + 1);
    pv.segments[idx].len += absorbed.len;

    Ok(())
}

/// Merge LV segment `second` into `first` when their areas continue each other.
///
/// Every area pair must be PV-backed and physically contiguous on the same PV
/// (or both untracked). The PV segments of each pair are merged, `first` grows
/// by `second`'s area length and `second` is detached. Returns `false` and
/// changes nothing when the segments cannot be merged.
pub fn merge_lv_segments(vg: &mut VolumeGroup, first: LvSegmentId, second: LvSegmentId) -> Result<bool> {
    if first == second {
        return Ok(false);
    }

    let a = vg.lv_segment_checked(first)?;
    let b = vg.lv_segment_checked(second)?;

    if a.lv_name != b.lv_name || a.areas.len() != b.areas.len() {
        return Ok(false);
    }
    // `second` must continue `first` in the LV's logical address space
    if a.le.checked_add(a.area_len) != Some(b.le) {
        return Ok(false);
    }

    let mut pairs = Vec::with_capacity(a.areas.len());
    for (area_a, area_b) in a.areas.iter().zip(b.areas.iter()) {
        match (area_a, area_b) {
            (
                SegArea::Pv(PvSegmentRef::Tracked { pv: pv_a, pe: pe_a }),
                SegArea::Pv(PvSegmentRef::Tracked { pv: pv_b, pe: pe_b }),
            ) if pv_a == pv_b && pe_a + a.area_len == *pe_b => {
                pairs.push((
                    PvSegmentRef::Tracked { pv: *pv_a, pe: *pe_a },
                    PvSegmentRef::Tracked { pv: *pv_b, pe: *pe_b },
                ));
            }
            (SegArea::Pv(PvSegmentRef::Untracked), SegArea::Pv(PvSegmentRef::Untracked)) => {}
            _ => return Ok(false),
        }
    }

    let second_len = b.area_len;

    for (seg_a, seg_b) in pairs {
        merge_segments(vg, seg_a, seg_b)?;
    }

    vg.lv_segment_checked_mut(first)?.area_len += second_len;
    vg.detach_lv_segment(second);

    Ok(true)
}

/// Merge runs of adjacent free segments on a PV.
///
/// Returns the number of segments merged away. Counters are unaffected since
/// only free extents are involved.
pub fn coalesce_free_segments(vg: &mut VolumeGroup, pv: PvId) -> Result<usize> {
    let pv = vg.pv_checked_mut(pv)?;
    let before = pv.segments.len();

    pv.segments.dedup_by(|next, prev| {
        if !prev.is_allocated() && !next.is_allocated() && prev.end() == next.pe {
            prev.len += next.len;
            true
        } else {
            false
        }
    });

    let merged = before - pv.segments.len();
    if merged > 0 {
        log::debug!("{}: merged {} free segment(s)", pv.dev_name, merged);
    }

    Ok(merged)
}
