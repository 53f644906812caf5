//! Volume group consistency audit
//!
//! Re-derives every cached counter of a volume group from its PV segment
//! tables and cross-checks the PV segment / LV segment back-references.
//! The audit never stops at the first problem: it walks everything and
//! returns the complete list of violations, each with enough context to
//! locate it.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use thiserror::Error;

use crate::error::{PvAllocError, Result};
use crate::segment::{AreaBinding, PvSegment, PvSegmentRef};
use crate::types::{LvSegmentId, PvId};
use crate::volume::{PhysicalVolume, SegArea, VolumeGroup};

/// A single discrepancy found by [`check_pv_segments`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// Segment does not start where the previous one ended
    #[error("gap in pvsegs on {device} (segment {segno}): expected PE {expected}, found {actual}")]
    Gap {
        device: String,
        segno: usize,
        expected: u32,
        actual: u32,
    },

    /// Segment bound to an LV segment that does not exist
    #[error("{device} PE {pe}: bound to missing LV segment {lvseg}")]
    DanglingLvSegment {
        device: String,
        pe: u32,
        lvseg: LvSegmentId,
    },

    /// Bound area is not a PV area
    #[error("{device} PE {pe}: wrong lvseg area type for area {area} of LV segment {lvseg}")]
    WrongAreaType {
        device: String,
        pe: u32,
        lvseg: LvSegmentId,
        area: u32,
    },

    /// Bound area does not point back at this segment
    #[error("{device} PE {pe}: inconsistent pvseg pointers for area {area} of LV segment {lvseg}")]
    InconsistentPointer {
        device: String,
        pe: u32,
        lvseg: LvSegmentId,
        area: u32,
    },

    /// Segment length differs from the LV segment's area length
    #[error("{device} PE {pe}: inconsistent length: {len} {area_len}")]
    InconsistentLength {
        device: String,
        pe: u32,
        len: u32,
        area_len: u32,
    },

    /// Segments do not end at the PV's extent count
    #[error("{device}: PV segment pe_count mismatch: {derived} != {recorded}")]
    PeCountMismatch {
        device: String,
        derived: u32,
        recorded: u32,
    },

    /// Allocated segments do not add up to the PV's allocation counter
    #[error("{device}: PV segment pe_alloc_count mismatch: {derived} != {recorded}")]
    AllocCountMismatch {
        device: String,
        derived: u32,
        recorded: u32,
    },

    /// LV segment area points at a PV segment that is not bound to it
    #[error("area {area} of LV segment {lvseg} points at {device} PE {pe} which is not bound to it")]
    DanglingArea {
        lvseg: LvSegmentId,
        area: u32,
        device: String,
        pe: u32,
    },

    #[error("PV segment VG pv_count mismatch: {derived} != {recorded}")]
    VgPvCountMismatch { derived: u32, recorded: u32 },

    #[error("PV segment VG free_count mismatch: {derived} != {recorded}")]
    VgFreeCountMismatch { derived: u32, recorded: u32 },

    #[error("PV segment VG extent_count mismatch: {derived} != {recorded}")]
    VgExtentCountMismatch { derived: u32, recorded: u32 },
}

/// Outcome of a consistency audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub vg_name: String,
    pub violations: Vec<Violation>,
}

impl CheckReport {
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }

    /// Turn a failed audit into [`PvAllocError::ConsistencyViolation`]
    pub fn into_result(self) -> Result<()> {
        if self.is_consistent() {
            Ok(())
        } else {
            Err(PvAllocError::ConsistencyViolation {
                vg_name: self.vg_name,
                count: self.violations.len(),
            })
        }
    }
}

/// Check all PV segments of a volume group for consistency
pub fn check_pv_segments(vg: &VolumeGroup) -> CheckReport {
    let mut violations = Vec::new();
    let mut pv_count = 0u32;
    let mut free_count = 0u32;
    let mut extent_count = 0u32;

    for (pv_id, pv) in vg.pvs() {
        let mut start_pe = 0u32;
        let mut alloced = 0u32;
        pv_count += 1;

        for (segno, seg) in pv.segments().iter().enumerate() {
            trace_segment(vg, pv, segno, seg);

            if start_pe != seg.pe {
                violations.push(Violation::Gap {
                    device: pv.dev_name.clone(),
                    segno,
                    expected: start_pe,
                    actual: seg.pe,
                });
            }

            if let Some(binding) = seg.binding {
                check_binding(vg, pv_id, pv, seg, binding, &mut violations);
                alloced = alloced.saturating_add(seg.len);
            }

            start_pe = start_pe.saturating_add(seg.len);
        }

        if start_pe != pv.pe_count() {
            violations.push(Violation::PeCountMismatch {
                device: pv.dev_name.clone(),
                derived: start_pe,
                recorded: pv.pe_count(),
            });
        }

        if alloced != pv.pe_alloc_count() {
            violations.push(Violation::AllocCountMismatch {
                device: pv.dev_name.clone(),
                derived: alloced,
                recorded: pv.pe_alloc_count(),
            });
        }

        extent_count = extent_count.saturating_add(start_pe);
        free_count = free_count.saturating_add(start_pe.saturating_sub(alloced));
    }

    check_lv_areas(vg, &mut violations);

    if pv_count != vg.pv_count() {
        violations.push(Violation::VgPvCountMismatch {
            derived: pv_count,
            recorded: vg.pv_count(),
        });
    }

    if free_count != vg.free_count() {
        violations.push(Violation::VgFreeCountMismatch {
            derived: free_count,
            recorded: vg.free_count(),
        });
    }

    if extent_count != vg.extent_count() {
        violations.push(Violation::VgExtentCountMismatch {
            derived: extent_count,
            recorded: vg.extent_count(),
        });
    }

    for violation in &violations {
        log::error!("{}: {}", vg.name, violation);
    }

    CheckReport {
        vg_name: vg.name.clone(),
        violations,
    }
}

fn check_binding(
    vg: &VolumeGroup,
    pv_id: PvId,
    pv: &PhysicalVolume,
    seg: &PvSegment,
    binding: AreaBinding,
    violations: &mut Vec<Violation>,
) {
    let Some(lvseg) = vg.lv_segment(binding.lvseg) else {
        violations.push(Violation::DanglingLvSegment {
            device: pv.dev_name.clone(),
            pe: seg.pe,
            lvseg: binding.lvseg,
        });
        return;
    };

    let this = PvSegmentRef::Tracked {
        pv: pv_id,
        pe: seg.pe,
    };

    match lvseg.area(binding.area) {
        Some(SegArea::Pv(seg_ref)) if *seg_ref == this => {}
        Some(SegArea::Pv(_)) | None => violations.push(Violation::InconsistentPointer {
            device: pv.dev_name.clone(),
            pe: seg.pe,
            lvseg: binding.lvseg,
            area: binding.area,
        }),
        Some(_) => violations.push(Violation::WrongAreaType {
            device: pv.dev_name.clone(),
            pe: seg.pe,
            lvseg: binding.lvseg,
            area: binding.area,
        }),
    }

    if lvseg.area_len() != seg.len {
        violations.push(Violation::InconsistentLength {
            device: pv.dev_name.clone(),
            pe: seg.pe,
            len: seg.len,
            area_len: lvseg.area_len(),
        });
    }
}

/// Every tracked LV area must name a PV segment bound back to it
fn check_lv_areas(vg: &VolumeGroup, violations: &mut Vec<Violation>) {
    for (lvseg_id, lvseg) in vg.lv_segments() {
        for (area, slot) in lvseg.areas().iter().enumerate() {
            let SegArea::Pv(PvSegmentRef::Tracked { pv, pe }) = slot else {
                continue;
            };

            let expected = AreaBinding {
                lvseg: lvseg_id,
                area: area as u32,
            };
            let bound = vg
                .pv(*pv)
                .and_then(|p| p.segment_at(*pe))
                .and_then(|s| s.binding);

            if bound != Some(expected) {
                let device = match vg.pv(*pv) {
                    Some(p) => p.dev_name.clone(),
                    None => format!("#{}", pv.index()),
                };
                violations.push(Violation::DanglingArea {
                    lvseg: lvseg_id,
                    area: area as u32,
                    device,
                    pe: *pe,
                });
            }
        }
    }
}

fn trace_segment(vg: &VolumeGroup, pv: &PhysicalVolume, segno: usize, seg: &PvSegment) {
    match seg.binding.and_then(|b| vg.lv_segment(b.lvseg).map(|lvseg| (b, lvseg))) {
        Some((binding, lvseg)) => log::debug!(
            "{} {}: {:6} {:6}: {}({}:{})",
            pv.dev_name,
            segno,
            seg.pe,
            seg.len,
            lvseg.lv_name,
            lvseg.le,
            binding.area
        ),
        None => log::debug!(
            "{} {}: {:6} {:6}: NULL(0:0)",
            pv.dev_name,
            segno,
            seg.pe,
            seg.len
        ),
    }
}
