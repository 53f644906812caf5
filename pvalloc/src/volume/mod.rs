//! Volume group: owner of every PV, PV segment and LV segment of one transaction
//!
//! The volume group plays the role of the per-command arena: everything is
//! allocated into its vectors and released together when it is dropped.
//! Nothing is freed individually; a detached LV segment leaves an empty slot
//! so that outstanding [`LvSegmentId`] handles never alias a different segment.

pub mod logical;
pub mod physical;

use alloc::string::String;
use alloc::vec::Vec;
use uguid::Guid;

use crate::config::AllocPolicy;
use crate::error::{PvAllocError, Result};
use crate::segment::init_whole_pv;
use crate::types::{LvSegmentId, PvId, VgStatus};
use crate::utils::extents_to_sectors;

pub use logical::{LvSegment, SegArea};
pub use physical::PhysicalVolume;

/// Aggregate pool of PVs sharing one extent namespace
#[derive(Debug, Clone)]
pub struct VolumeGroup {
    /// Volume group name
    pub name: String,

    /// VG UUID
    pub id: Guid,

    /// Extent size in sectors
    pub extent_size: u32,

    /// Status flags
    pub status: VgStatus,

    /// Segment operation policy
    pub policy: AllocPolicy,

    pub(crate) pvs: Vec<PhysicalVolume>,
    pub(crate) lv_segments: Vec<Option<LvSegment>>,

    // Cached aggregates, written only by the segment and resize operations
    pub(crate) pv_count: u32,
    pub(crate) free_count: u32,
    pub(crate) extent_count: u32,
}

impl VolumeGroup {
    /// Create an empty volume group
    pub fn new(name: impl Into<String>, id: Guid, extent_size: u32) -> Self {
        Self {
            name: name.into(),
            id,
            extent_size,
            status: VgStatus::default(),
            policy: AllocPolicy::default(),
            pvs: Vec::new(),
            lv_segments: Vec::new(),
            pv_count: 0,
            free_count: 0,
            extent_count: 0,
        }
    }

    pub fn with_policy(mut self, policy: AllocPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_status(mut self, status: VgStatus) -> Self {
        self.status = status;
        self
    }

    /// Add a PV to the group.
    ///
    /// A PV without segments gets a single free segment covering all of its
    /// extents. The PV adopts the group's extent size, and its recorded size
    /// grows if it cannot hold `pe_count` extents of that size.
    pub fn add_pv(&mut self, mut pv: PhysicalVolume) -> PvId {
        if pv.segments.is_empty() {
            init_whole_pv(&mut pv);
        }

        pv.vg_name = Some(self.name.clone());
        pv.pe_size = self.extent_size;
        pv.size = pv.size.max(extents_to_sectors(pv.pe_count, self.extent_size));

        self.pv_count += 1;
        self.extent_count += pv.pe_count;
        self.free_count += pv.pe_free_count();

        log::debug!(
            "Adding physical volume {} to volume group {} ({} extents)",
            pv.dev_name,
            self.name,
            pv.pe_count
        );

        self.pvs.push(pv);
        PvId(self.pvs.len() - 1)
    }

    /// Register an LV segment and return its handle
    pub fn add_lv_segment(&mut self, seg: LvSegment) -> LvSegmentId {
        self.lv_segments.push(Some(seg));
        LvSegmentId(self.lv_segments.len() - 1)
    }

    /// Number of PVs
    pub fn pv_count(&self) -> u32 {
        self.pv_count
    }

    /// Unallocated extents over all PVs
    pub fn free_count(&self) -> u32 {
        self.free_count
    }

    /// Total extents over all PVs
    pub fn extent_count(&self) -> u32 {
        self.extent_count
    }

    pub fn pv(&self, id: PvId) -> Option<&PhysicalVolume> {
        self.pvs.get(id.0)
    }

    /// All PVs with their handles, in insertion order
    pub fn pvs(&self) -> impl Iterator<Item = (PvId, &PhysicalVolume)> {
        self.pvs.iter().enumerate().map(|(idx, pv)| (PvId(idx), pv))
    }

    /// Find a member PV by device name
    pub fn find_pv(&self, dev_name: &str) -> Option<PvId> {
        self.pvs
            .iter()
            .position(|pv| pv.dev_name == dev_name)
            .map(PvId)
    }

    pub fn lv_segment(&self, id: LvSegmentId) -> Option<&LvSegment> {
        self.lv_segments.get(id.0).and_then(Option::as_ref)
    }

    /// Live LV segments with their handles
    pub fn lv_segments(&self) -> impl Iterator<Item = (LvSegmentId, &LvSegment)> {
        self.lv_segments
            .iter()
            .enumerate()
            .filter_map(|(idx, seg)| seg.as_ref().map(|seg| (LvSegmentId(idx), seg)))
    }

    /// Reject groups that must not be modified
    pub fn check_status(&self) -> Result<()> {
        if self.status.clustered {
            return Err(PvAllocError::VgClustered {
                vg_name: self.name.clone(),
            });
        }
        if self.status.exported {
            return Err(PvAllocError::VgExported {
                vg_name: self.name.clone(),
            });
        }
        if !self.status.writeable {
            return Err(PvAllocError::VgReadOnly {
                vg_name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Deep copy of the whole group for a transactional working copy.
    ///
    /// On allocation failure the partial copy is dropped and nothing is returned.
    pub fn duplicate(&self) -> Result<Self> {
        let mut pvs: Vec<PhysicalVolume> = Vec::new();
        pvs.try_reserve_exact(self.pvs.len())
            .map_err(|_| PvAllocError::AllocationFailed)?;
        for pv in &self.pvs {
            pvs.push(pv.duplicate()?);
        }

        let mut lv_segments: Vec<Option<LvSegment>> = Vec::new();
        lv_segments
            .try_reserve_exact(self.lv_segments.len())
            .map_err(|_| PvAllocError::AllocationFailed)?;
        for lvseg in &self.lv_segments {
            lv_segments.push(match lvseg {
                Some(lvseg) => Some(lvseg.duplicate()?),
                None => None,
            });
        }

        Ok(Self {
            name: self.name.clone(),
            id: self.id,
            extent_size: self.extent_size,
            status: self.status,
            policy: self.policy,
            pvs,
            lv_segments,
            pv_count: self.pv_count,
            free_count: self.free_count,
            extent_count: self.extent_count,
        })
    }

    pub(crate) fn pv_checked(&self, id: PvId) -> Result<&PhysicalVolume> {
        self.pvs.get(id.0).ok_or_else(|| PvAllocError::PvNotFound {
            vg_name: self.name.clone(),
            index: id.0,
        })
    }

    pub(crate) fn pv_checked_mut(&mut self, id: PvId) -> Result<&mut PhysicalVolume> {
        let vg_name = &self.name;
        self.pvs.get_mut(id.0).ok_or_else(|| PvAllocError::PvNotFound {
            vg_name: vg_name.clone(),
            index: id.0,
        })
    }

    pub(crate) fn lv_segment_checked(&self, id: LvSegmentId) -> Result<&LvSegment> {
        self.lv_segment(id)
            .ok_or(PvAllocError::LvSegmentNotFound(id))
    }

    pub(crate) fn lv_segment_checked_mut(&mut self, id: LvSegmentId) -> Result<&mut LvSegment> {
        self.lv_segments
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(PvAllocError::LvSegmentNotFound(id))
    }

    /// Unlink an LV segment; its slot stays empty
    pub(crate) fn detach_lv_segment(&mut self, id: LvSegmentId) -> Option<LvSegment> {
        self.lv_segments.get_mut(id.0).and_then(Option::take)
    }
}
