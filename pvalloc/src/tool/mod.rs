//! PV resize workflow
//!
//! Composes the external collaborators (lock manager, metadata store, device
//! probe, archiver) with the resize engine to carry out "resize this PV to
//! this size" as one locked, committed unit:
//!
//! 1. Lock the volume group (or `#orphans` for a PV outside any group)
//! 2. Read the metadata and archive it
//! 3. Work out the new size from the device, or from the caller's override
//! 4. Resize the extent range and audit the result
//! 5. Write, commit, back up
//!
//! Any failure aborts before the write; the lock is released on every path.

pub mod device;
pub mod lock;
pub mod metadata;

use alloc::string::String;
use alloc::vec::Vec;
use thiserror::Error;

use crate::check::check_pv_segments;
use crate::config::ResizeConfig;
use crate::error::{PvAllocError, Result};
use crate::resize::resize_pv;
use crate::types::ORPHAN_VG_NAME;
use crate::utils::sectors_to_extents;
use crate::volume::PhysicalVolume;

pub use device::{block_io_sectors, BlockDevices, DeviceProbe};
pub use lock::{LockManager, LockMode, VgLock};
pub use metadata::{Archiver, MetadataStore};

/// External collaborators of the resize workflow
pub struct ToolContext<L, M, D, A> {
    pub locking: L,
    pub metadata: M,
    pub devices: D,
    pub archiver: A,
    pub config: ResizeConfig,
}

impl<L, M, D, A> ToolContext<L, M, D, A>
where
    L: LockManager,
    M: MetadataStore,
    D: DeviceProbe,
    A: Archiver,
{
    pub fn new(locking: L, metadata: M, devices: D, archiver: A) -> Self {
        Self {
            locking,
            metadata,
            devices,
            archiver,
            config: ResizeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResizeConfig) -> Self {
        self.config = config;
        self
    }
}

/// Non-fatal condition reported by a successful resize
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResizeWarning {
    /// Caller-supplied size is larger than the device
    #[error("{pv_name}: overriding real size of {device_size} sectors with {size}, data may be lost")]
    SizeOverride {
        pv_name: String,
        size: u64,
        device_size: u64,
    },

    /// Metadata was committed but the backup copy could not be written
    #[error("failed to back up metadata of volume group \"{vg_name}\"")]
    BackupFailed { vg_name: String },
}

/// Result of a successful PV resize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeOutcome {
    pub pv_name: String,

    /// Volume group the PV belongs to, `None` for an orphan PV
    pub vg_name: Option<String>,

    pub old_pe_count: u32,
    pub new_pe_count: u32,

    /// Recorded PV size in sectors after the resize
    pub size: u64,

    pub warnings: Vec<ResizeWarning>,
}

/// Resize one PV to the size of its device, or to `new_size` sectors.
///
/// `vg_name` names the volume group the PV belongs to; `None` (or `#orphans`)
/// selects the orphan path, where only the PV's recorded size changes.
pub fn resize_pv_single<L, M, D, A>(
    ctx: &mut ToolContext<L, M, D, A>,
    pv_name: &str,
    vg_name: Option<&str>,
    new_size: Option<u64>,
) -> Result<ResizeOutcome>
where
    L: LockManager,
    M: MetadataStore,
    D: DeviceProbe,
    A: Archiver,
{
    let member_of = vg_name.filter(|name| !name.is_empty() && *name != ORPHAN_VG_NAME);

    let ToolContext {
        locking,
        metadata,
        devices,
        archiver,
        config,
    } = ctx;

    let _lock = VgLock::acquire(locking, member_of.unwrap_or(ORPHAN_VG_NAME), LockMode::Write)?;

    let result = match member_of {
        Some(vg_name) => resize_member(metadata, devices, archiver, config, pv_name, vg_name, new_size),
        None => resize_orphan(metadata, devices, config, pv_name, new_size),
    };

    match &result {
        Ok(_) => log::info!("Physical volume \"{}\" changed", pv_name),
        Err(err) => log::error!("{}", err),
    }

    result
}

fn resize_member<M, D, A>(
    metadata: &mut M,
    devices: &mut D,
    archiver: &mut A,
    config: &ResizeConfig,
    pv_name: &str,
    vg_name: &str,
    new_size: Option<u64>,
) -> Result<ResizeOutcome>
where
    M: MetadataStore,
    D: DeviceProbe,
    A: Archiver,
{
    let mut vg = metadata
        .vg_read(vg_name)
        .map_err(|_| PvAllocError::VgNotFound {
            vg_name: vg_name.into(),
        })?;

    vg.check_status()?;

    let pv_id = vg.find_pv(pv_name).ok_or_else(|| PvAllocError::PvNotInVg {
        pv_name: pv_name.into(),
        vg_name: vg.name.clone(),
    })?;

    archiver.archive(&vg).map_err(|_| PvAllocError::ArchiveFailed {
        vg_name: vg.name.clone(),
    })?;

    let mut warnings = Vec::new();
    let pv = vg.pv_checked(pv_id)?;
    let size = target_size(devices, config, pv, new_size, &mut warnings)?;
    let old_pe_count = pv.pe_count();

    let usable = size - pv.pe_start;
    let new_pe_count = sectors_to_extents(usable, vg.extent_size);
    if new_pe_count == 0 {
        return Err(PvAllocError::NoExtentRoom {
            pv_name: pv_name.into(),
            pe_size: pv.pe_size,
        });
    }

    vg.pv_checked_mut(pv_id)?.size = usable;
    resize_pv(&mut vg, pv_id, new_pe_count)?;

    log::info!("Resizing volume \"{}\" to {} sectors.", pv_name, usable);

    if config.check_before_commit {
        check_pv_segments(&vg).into_result()?;
    }

    log::info!("Updating physical volume \"{}\"", pv_name);
    metadata
        .vg_write(&vg)
        .and_then(|()| metadata.vg_commit(&vg))
        .map_err(|_| PvAllocError::MetadataWrite {
            pv_name: pv_name.into(),
            vg_name: Some(vg.name.clone()),
        })?;

    if archiver.backup(&vg).is_err() {
        log::warn!("Failed to back up metadata of volume group \"{}\"", vg.name);
        warnings.push(ResizeWarning::BackupFailed {
            vg_name: vg.name.clone(),
        });
    }

    Ok(ResizeOutcome {
        pv_name: pv_name.into(),
        vg_name: Some(vg.name.clone()),
        old_pe_count,
        new_pe_count,
        size: usable,
        warnings,
    })
}

fn resize_orphan<M, D>(
    metadata: &mut M,
    devices: &mut D,
    config: &ResizeConfig,
    pv_name: &str,
    new_size: Option<u64>,
) -> Result<ResizeOutcome>
where
    M: MetadataStore,
    D: DeviceProbe,
{
    let mut pv = metadata
        .pv_read(pv_name)
        .map_err(|_| PvAllocError::PvReadFailed {
            pv_name: pv_name.into(),
        })?;

    // Orphan metadata is rewritten in place; only one copy can be kept in step
    if pv.mda_count > 1 {
        return Err(PvAllocError::TooManyMetadataAreas {
            pv_name: pv_name.into(),
        });
    }

    let mut warnings = Vec::new();
    pv.size = target_size(devices, config, &pv, new_size, &mut warnings)?;

    log::info!("Resizing volume \"{}\" to {} sectors.", pv_name, pv.size);
    log::info!("Updating physical volume \"{}\"", pv_name);

    metadata
        .pv_write(&pv)
        .map_err(|_| PvAllocError::MetadataWrite {
            pv_name: pv_name.into(),
            vg_name: None,
        })?;

    Ok(ResizeOutcome {
        pv_name: pv_name.into(),
        vg_name: None,
        old_pe_count: pv.pe_count(),
        new_pe_count: pv.pe_count(),
        size: pv.size,
        warnings,
    })
}

/// New PV size in sectors: the probed device size unless overridden
fn target_size<D: DeviceProbe>(
    devices: &mut D,
    config: &ResizeConfig,
    pv: &PhysicalVolume,
    new_size: Option<u64>,
    warnings: &mut Vec<ResizeWarning>,
) -> Result<u64> {
    if !pv.format.resize_pv {
        return Err(PvAllocError::ResizeNotSupported {
            pv_name: pv.dev_name.clone(),
        });
    }

    let device_size = devices
        .device_size(&pv.dev_name)
        .map_err(|_| PvAllocError::DeviceSize {
            pv_name: pv.dev_name.clone(),
        })?;

    let size = match new_size.filter(|&size| size != 0) {
        Some(size) => {
            if size > device_size {
                log::warn!(
                    "WARNING: {}: Overriding real size. You could lose data.",
                    pv.dev_name
                );
                warnings.push(ResizeWarning::SizeOverride {
                    pv_name: pv.dev_name.clone(),
                    size,
                    device_size,
                });
            }
            log::info!(
                "{}: Pretending size is {} not {} sectors.",
                pv.dev_name,
                size,
                pv.size
            );
            size
        }
        None => device_size,
    };

    if size < config.pv_min_size {
        return Err(PvAllocError::BelowMinimumSize {
            pv_name: pv.dev_name.clone(),
            min_size: config.pv_min_size,
        });
    }

    if size < pv.pe_start {
        return Err(PvAllocError::BelowPeStart {
            pv_name: pv.dev_name.clone(),
            pe_start: pv.pe_start,
        });
    }

    Ok(size)
}
