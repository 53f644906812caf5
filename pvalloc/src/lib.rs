//! PV Segment Allocator
//!
//! A `no_std` implementation of the physical extent bookkeeping of a logical
//! volume manager.
//!
//! # Overview
//!
//! Every physical volume (PV) in a volume group is divided into extents. This
//! crate tracks which extent ranges are free and which back an area of a
//! logical volume (LV) segment, and keeps that picture consistent across
//! allocation, release and PV resize:
//! - Per-PV segment tables covering every extent exactly once
//! - Split, assign, release and merge primitives
//! - Growing and shrinking a PV's extent range
//! - A whole volume group consistency audit
//! - The locked "resize this PV" workflow over pluggable metadata, lock and
//!   device backends
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Volume layer** - Volume group, PVs and LV segments; owns everything
//! 2. **Segment layer** - Segment table and its primitives
//! 3. **Resize layer** - Extent range changes built on the segment layer
//! 4. **Check layer** - Re-derives every counter and cross-reference
//! 5. **Tool layer** - Lock, read, resize, audit, commit
//!
//! # Usage
//!
//! ```ignore
//! use pvalloc::{check_pv_segments, resize_pv, set_lv_segment_area_pv};
//! use pvalloc::{LvSegment, PhysicalVolume, VolumeGroup};
//!
//! let mut vg = VolumeGroup::new("vg0", vg_id, 8192);
//! let pv = vg.add_pv(PhysicalVolume::new("/dev/sdb1", pv_id, 8192, 100));
//!
//! // Place a 20 extent LV segment at PE 10
//! let lvseg = vg.add_lv_segment(LvSegment::new("lv0", 0, 20, 1));
//! set_lv_segment_area_pv(&mut vg, lvseg, 0, Some(pv), 10)?;
//!
//! // Shrink the PV down to the end of the allocation
//! resize_pv(&mut vg, pv, 30)?;
//! check_pv_segments(&vg).into_result()?;
//! ```
//!
//! # Resize workflow
//!
//! ```ignore
//! use pvalloc::{resize_pv_single, ToolContext};
//!
//! let mut ctx = ToolContext::new(locks, store, devices, archiver);
//! let outcome = resize_pv_single(&mut ctx, "/dev/sdb1", Some("vg0"), None)?;
//! ```

#![no_std]

extern crate alloc;

pub mod check;
pub mod config;
pub mod error;
pub mod resize;
pub mod segment;
pub mod tool;
pub mod types;
pub mod utils;
pub mod volume;

pub use config::{AllocPolicy, ResizeConfig};
pub use error::{PvAllocError, Result};
pub use types::{FormatFeatures, FreeRegion, LvSegmentId, PvId, VgStatus};
pub use volume::{LvSegment, PhysicalVolume, SegArea, VolumeGroup};

// High-level API exports
pub use check::{check_pv_segments, CheckReport, Violation};
pub use resize::resize_pv;
pub use segment::{
    assign_segment, coalesce_free_segments, duplicate_segments, init_whole_pv, merge_lv_segments,
    merge_segments, reduce_lv_segment, release_segment, set_lv_segment_area_pv, split_segment,
    AreaBinding, PvSegment, PvSegmentRef,
};
pub use tool::{resize_pv_single, ResizeOutcome, ResizeWarning, ToolContext};
