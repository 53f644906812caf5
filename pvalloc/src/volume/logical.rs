//! LV segments as seen by the allocator
//!
//! Only the parts of an LV segment the PV segment table refers to are modelled:
//! the per-area length and the area table holding back-references to PV segments.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::{PvAllocError, Result};
use crate::segment::PvSegmentRef;

/// What backs one area of an LV segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegArea {
    /// Not placed yet
    Unassigned,

    /// Backed by a PV segment
    Pv(PvSegmentRef),

    /// Backed by another LV (stacked)
    Lv { lv_name: String, le: u32 },
}

/// One segment of a logical volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LvSegment {
    /// Owning logical volume
    pub lv_name: String,

    /// First logical extent covered by this segment
    pub le: u32,

    pub(crate) area_len: u32,
    pub(crate) areas: Vec<SegArea>,
}

impl LvSegment {
    /// Create an LV segment with `area_count` unassigned areas of `area_len` extents
    pub fn new(lv_name: impl Into<String>, le: u32, area_len: u32, area_count: usize) -> Self {
        Self {
            lv_name: lv_name.into(),
            le,
            area_len,
            areas: vec![SegArea::Unassigned; area_count],
        }
    }

    /// Back area `area` with a range of another LV
    pub fn with_lv_area(mut self, area: usize, lv_name: impl Into<String>, le: u32) -> Self {
        if let Some(slot) = self.areas.get_mut(area) {
            *slot = SegArea::Lv {
                lv_name: lv_name.into(),
                le,
            };
        }
        self
    }

    /// Extents per area
    pub fn area_len(&self) -> u32 {
        self.area_len
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn areas(&self) -> &[SegArea] {
        &self.areas
    }

    pub fn area(&self, area: u32) -> Option<&SegArea> {
        self.areas.get(area as usize)
    }

    /// PV segment backing `area`, if it is PV-backed
    pub fn area_pv_segment(&self, area: u32) -> Option<PvSegmentRef> {
        match self.area(area) {
            Some(SegArea::Pv(seg)) => Some(*seg),
            _ => None,
        }
    }

    /// Deep copy for a transactional working copy
    pub fn duplicate(&self) -> Result<Self> {
        let mut areas = Vec::new();
        areas
            .try_reserve_exact(self.areas.len())
            .map_err(|_| PvAllocError::AllocationFailed)?;
        areas.extend(self.areas.iter().cloned());

        Ok(Self {
            lv_name: self.lv_name.clone(),
            le: self.le,
            area_len: self.area_len,
            areas,
        })
    }
}
