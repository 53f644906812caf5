//! Common test utilities: in-memory devices, metadata and locks

pub mod builder;
#[allow(unused_imports)]
pub use builder::VgBuilder;

use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use pvalloc::tool::{Archiver, LockManager, LockMode, MetadataStore};
use pvalloc::{PhysicalVolume, PvAllocError, Result, VolumeGroup};
use std::collections::BTreeMap;
use std::io;

/// Sparse in-memory block device: reports a capacity, reads back zeros
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct MemoryBlockDevice {
    pub num_blocks: u64,
    pub block_size: u32,
    pub fail_probe: bool,
}

#[allow(dead_code)]
impl MemoryBlockDevice {
    /// Device of `sectors` 512-byte sectors
    pub fn with_sectors(sectors: u64) -> Self {
        Self {
            num_blocks: sectors,
            block_size: 512,
            fail_probe: false,
        }
    }

    pub fn new(num_blocks: u64, block_size: u32) -> Self {
        Self {
            num_blocks,
            block_size,
            fail_probe: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_probe: true,
            ..Self::with_sectors(0)
        }
    }

    fn check_range(&self, start_lba: Lba, len: usize) -> io::Result<()> {
        let end = start_lba.0 * u64::from(self.block_size) + len as u64;
        if end > self.num_blocks * u64::from(self.block_size) {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "access beyond end of device",
            ));
        }
        Ok(())
    }
}

impl BlockIo for MemoryBlockDevice {
    type Error = io::Error;

    fn block_size(&self) -> BlockSize {
        BlockSize::new(self.block_size).expect("valid block size")
    }

    fn num_blocks(&mut self) -> std::result::Result<u64, Self::Error> {
        if self.fail_probe {
            return Err(io::Error::new(io::ErrorKind::Other, "probe failed"));
        }
        Ok(self.num_blocks)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> std::result::Result<(), Self::Error> {
        self.check_range(start_lba, dst.len())?;
        dst.fill(0);
        Ok(())
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> std::result::Result<(), Self::Error> {
        self.check_range(start_lba, src.len())
    }

    fn flush(&mut self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// Metadata store keeping volume groups and orphan PVs in maps
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    pub vgs: BTreeMap<String, VolumeGroup>,
    pub orphans: BTreeMap<String, PhysicalVolume>,
    pub written: Vec<String>,
    pub committed: Vec<String>,
    pub fail_write: bool,
    pub fail_commit: bool,
}

#[allow(dead_code)]
impl MemoryMetadataStore {
    pub fn with_vg(vg: VolumeGroup) -> Self {
        let mut store = Self::default();
        store.vgs.insert(vg.name.clone(), vg);
        store
    }

    pub fn with_orphan(pv: PhysicalVolume) -> Self {
        let mut store = Self::default();
        store.orphans.insert(pv.dev_name.clone(), pv);
        store
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn vg_read(&mut self, vg_name: &str) -> Result<VolumeGroup> {
        self.vgs
            .get(vg_name)
            .ok_or(PvAllocError::VgNotFound {
                vg_name: vg_name.into(),
            })?
            .duplicate()
    }

    fn pv_read(&mut self, pv_name: &str) -> Result<PhysicalVolume> {
        self.orphans
            .get(pv_name)
            .ok_or(PvAllocError::PvReadFailed {
                pv_name: pv_name.into(),
            })?
            .duplicate()
    }

    fn vg_write(&mut self, vg: &VolumeGroup) -> Result<()> {
        if self.fail_write {
            return Err(PvAllocError::AllocationFailed);
        }
        self.written.push(vg.name.clone());
        Ok(())
    }

    fn vg_commit(&mut self, vg: &VolumeGroup) -> Result<()> {
        if self.fail_commit {
            return Err(PvAllocError::AllocationFailed);
        }
        self.committed.push(vg.name.clone());
        self.vgs.insert(vg.name.clone(), vg.duplicate()?);
        Ok(())
    }

    fn pv_write(&mut self, pv: &PhysicalVolume) -> Result<()> {
        if self.fail_write {
            return Err(PvAllocError::AllocationFailed);
        }
        self.written.push(pv.dev_name.clone());
        self.orphans.insert(pv.dev_name.clone(), pv.duplicate()?);
        Ok(())
    }
}

/// Lock manager recording every lock and unlock
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingLocks {
    pub events: Vec<LockEvent>,
    pub held: Vec<String>,
    pub refuse: bool,
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockEvent {
    Lock(String, LockMode),
    Unlock(String),
}

impl LockManager for RecordingLocks {
    fn lock_vg(&mut self, vg_name: &str, mode: LockMode) -> Result<()> {
        if self.refuse {
            return Err(PvAllocError::LockFailed {
                vg_name: vg_name.into(),
            });
        }
        self.events.push(LockEvent::Lock(vg_name.into(), mode));
        self.held.push(vg_name.into());
        Ok(())
    }

    fn unlock_vg(&mut self, vg_name: &str) {
        self.events.push(LockEvent::Unlock(vg_name.into()));
        self.held.retain(|name| name != vg_name);
    }
}

/// Archiver counting archive and backup calls
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingArchiver {
    pub archived: Vec<String>,
    pub backed_up: Vec<String>,
    pub fail_archive: bool,
    pub fail_backup: bool,
}

impl Archiver for RecordingArchiver {
    fn archive(&mut self, vg: &VolumeGroup) -> Result<()> {
        if self.fail_archive {
            return Err(PvAllocError::ArchiveFailed {
                vg_name: vg.name.clone(),
            });
        }
        self.archived.push(vg.name.clone());
        Ok(())
    }

    fn backup(&mut self, vg: &VolumeGroup) -> Result<()> {
        if self.fail_backup {
            return Err(PvAllocError::BackupFailed {
                vg_name: vg.name.clone(),
            });
        }
        self.backed_up.push(vg.name.clone());
        Ok(())
    }
}
