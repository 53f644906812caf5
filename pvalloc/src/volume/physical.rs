//! Physical volume and its segment table

use alloc::string::String;
use alloc::vec::Vec;
use uguid::Guid;

use crate::error::Result;
use crate::segment::{duplicate_segments, PvSegment};
use crate::types::{FormatFeatures, FreeRegion};

/// A storage device contributing extents to a volume group
#[derive(Debug, Clone)]
pub struct PhysicalVolume {
    /// Device path (e.g. "/dev/sdb1")
    pub dev_name: String,

    /// PV UUID
    pub id: Guid,

    /// Owning volume group, `None` for an orphan PV
    pub vg_name: Option<String>,

    /// Metadata format capabilities
    pub format: FormatFeatures,

    /// Number of on-disk metadata areas
    pub mda_count: u32,

    /// Size in sectors usable for extents
    pub size: u64,

    /// Extent size in sectors
    pub pe_size: u32,

    /// Sector offset of the first extent
    pub pe_start: u64,

    pub(crate) pe_count: u32,
    pub(crate) pe_alloc_count: u32,
    pub(crate) segments: Vec<PvSegment>,
}

impl PhysicalVolume {
    /// Create an unallocated PV holding `pe_count` extents of `pe_size` sectors.
    ///
    /// The segment table stays empty until the PV is added to a volume group
    /// (or [`init_whole_pv`](crate::segment::init_whole_pv) is called).
    pub fn new(dev_name: impl Into<String>, id: Guid, pe_size: u32, pe_count: u32) -> Self {
        Self {
            dev_name: dev_name.into(),
            id,
            vg_name: None,
            format: FormatFeatures::default(),
            mda_count: 1,
            size: u64::from(pe_count) * u64::from(pe_size),
            pe_size,
            pe_start: 0,
            pe_count,
            pe_alloc_count: 0,
            segments: Vec::new(),
        }
    }

    /// Override the recorded size (sectors)
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Override the first extent offset (sectors)
    pub fn with_pe_start(mut self, pe_start: u64) -> Self {
        self.pe_start = pe_start;
        self
    }

    pub fn with_format(mut self, format: FormatFeatures) -> Self {
        self.format = format;
        self
    }

    pub fn with_mda_count(mut self, mda_count: u32) -> Self {
        self.mda_count = mda_count;
        self
    }

    /// Total extents
    pub fn pe_count(&self) -> u32 {
        self.pe_count
    }

    /// Extents bound to LV segments
    pub fn pe_alloc_count(&self) -> u32 {
        self.pe_alloc_count
    }

    /// Extents not bound to any LV segment
    pub fn pe_free_count(&self) -> u32 {
        self.pe_count.saturating_sub(self.pe_alloc_count)
    }

    /// Ordered segment table
    pub fn segments(&self) -> &[PvSegment] {
        &self.segments
    }

    /// Segment containing extent `pe`
    pub fn find_segment(&self, pe: u32) -> Option<&PvSegment> {
        self.segment_index_containing(pe).map(|idx| &self.segments[idx])
    }

    /// Segment starting exactly at extent `pe`
    pub fn segment_at(&self, pe: u32) -> Option<&PvSegment> {
        self.segment_index_at(pe).map(|idx| &self.segments[idx])
    }

    /// Maximal runs of free extents, adjacent free segments reported as one region
    pub fn free_regions(&self) -> Vec<FreeRegion> {
        let mut regions: Vec<FreeRegion> = Vec::new();

        for seg in self.segments.iter().filter(|s| !s.is_allocated() && s.len > 0) {
            match regions.last_mut() {
                Some(last) if last.end_pe + 1 == seg.pe => last.end_pe = seg.end() - 1,
                _ => regions.push(FreeRegion {
                    start_pe: seg.pe,
                    end_pe: seg.end() - 1,
                }),
            }
        }

        regions
    }

    /// Deep copy for a transactional working copy
    pub fn duplicate(&self) -> Result<Self> {
        Ok(Self {
            dev_name: self.dev_name.clone(),
            id: self.id,
            vg_name: self.vg_name.clone(),
            format: self.format,
            mda_count: self.mda_count,
            size: self.size,
            pe_size: self.pe_size,
            pe_start: self.pe_start,
            pe_count: self.pe_count,
            pe_alloc_count: self.pe_alloc_count,
            segments: duplicate_segments(&self.segments)?,
        })
    }

    pub(crate) fn segment_index_containing(&self, pe: u32) -> Option<usize> {
        let idx = self.segments.partition_point(|s| s.end() <= pe);
        self.segments
            .get(idx)
            .filter(|s| s.pe <= pe && pe < s.end())
            .map(|_| idx)
    }

    pub(crate) fn segment_index_at(&self, pe: u32) -> Option<usize> {
        self.segments.binary_search_by_key(&pe, |s| s.pe).ok()
    }
}
