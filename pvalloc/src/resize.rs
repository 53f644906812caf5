//! Growing and shrinking the extent range of a PV

use crate::error::{PvAllocError, Result};
use crate::segment::{split_segment, PvSegment};
use crate::types::PvId;
use crate::volume::VolumeGroup;

/// Resize a PV in a volume group to `new_pe_count` extents.
///
/// Growing appends one free segment and must fit within the PV's recorded size.
/// Shrinking only removes free extents. All checks run before anything is
/// changed, so a refused resize leaves the volume group untouched.
pub fn resize_pv(vg: &mut VolumeGroup, pv: PvId, new_pe_count: u32) -> Result<()> {
    let current = vg.pv_checked(pv)?;

    if new_pe_count == current.pe_count {
        log::info!("No change to size of physical volume {}.", current.dev_name);
        return Ok(());
    }

    log::info!(
        "Resizing physical volume {} from {} to {} extents.",
        current.dev_name,
        current.pe_count,
        new_pe_count
    );

    if new_pe_count > current.pe_count {
        extend_pv(vg, pv, new_pe_count)
    } else {
        reduce_pv(vg, pv, new_pe_count)
    }
}

fn reduce_pv(vg: &mut VolumeGroup, pv_id: PvId, new_pe_count: u32) -> Result<()> {
    let pv = vg.pv_checked(pv_id)?;
    let old_pe_count = pv.pe_count;

    if new_pe_count < pv.pe_alloc_count {
        return Err(PvAllocError::InsufficientFreeSpace {
            device: pv.dev_name.clone(),
            requested: new_pe_count,
            allocated: pv.pe_alloc_count,
        });
    }

    // Extents to be removed must not be allocated
    if let Some(seg) = pv
        .segments
        .iter()
        .find(|seg| seg.end() > new_pe_count && seg.is_allocated())
    {
        return Err(PvAllocError::AllocatedBeyondBoundary {
            device: pv.dev_name.clone(),
            requested: new_pe_count,
            pe: seg.pe.max(new_pe_count),
        });
    }

    split_segment(vg, pv_id, new_pe_count)?;

    let pv = vg.pv_checked_mut(pv_id)?;
    pv.segments.retain(|seg| seg.end() <= new_pe_count);
    pv.pe_count = new_pe_count;

    let removed = old_pe_count - new_pe_count;
    vg.extent_count = vg.extent_count.saturating_sub(removed);
    vg.free_count = vg.free_count.saturating_sub(removed);

    Ok(())
}

fn extend_pv(vg: &mut VolumeGroup, pv_id: PvId, new_pe_count: u32) -> Result<()> {
    let pv = vg.pv_checked_mut(pv_id)?;
    let old_pe_count = pv.pe_count;

    if u64::from(new_pe_count) * u64::from(pv.pe_size) > pv.size {
        let available = if pv.pe_size == 0 {
            0
        } else {
            pv.size / u64::from(pv.pe_size)
        };
        return Err(PvAllocError::CapacityExceeded {
            device: pv.dev_name.clone(),
            requested: new_pe_count,
            available,
        });
    }

    let added = new_pe_count - old_pe_count;
    pv.segments.push(PvSegment::free(old_pe_count, added));
    pv.pe_count = new_pe_count;

    vg.extent_count += added;
    vg.free_count += added;

    Ok(())
}
