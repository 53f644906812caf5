//! Device capacity probing

use alloc::collections::BTreeMap;
use alloc::string::String;
use gpt_disk_io::BlockIo;
use gpt_disk_types::BlockSize;

use crate::error::{PvAllocError, Result};
use crate::utils::blocks_to_sectors;

/// Source of device capacities
pub trait DeviceProbe {
    /// Size of device `dev_name` in sectors
    fn device_size(&mut self, dev_name: &str) -> Result<u64>;
}

/// Capacity of a block device in sectors
pub fn block_io_sectors<B: BlockIo>(device: &mut B) -> core::result::Result<u64, B::Error> {
    let block_size: BlockSize = device.block_size();
    let num_blocks = device.num_blocks()?;
    Ok(blocks_to_sectors(num_blocks, u64::from(block_size.to_u32())))
}

/// Named block devices answering capacity probes
#[derive(Debug)]
pub struct BlockDevices<B: BlockIo> {
    devices: BTreeMap<String, B>,
}

impl<B: BlockIo> BlockDevices<B> {
    pub fn new() -> Self {
        Self {
            devices: BTreeMap::new(),
        }
    }

    /// Register `device` under `dev_name`, replacing any previous one
    pub fn insert(&mut self, dev_name: impl Into<String>, device: B) -> Option<B> {
        self.devices.insert(dev_name.into(), device)
    }

    pub fn get_mut(&mut self, dev_name: &str) -> Option<&mut B> {
        self.devices.get_mut(dev_name)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl<B: BlockIo> Default for BlockDevices<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BlockIo> DeviceProbe for BlockDevices<B> {
    fn device_size(&mut self, dev_name: &str) -> Result<u64> {
        let size_error = || PvAllocError::DeviceSize {
            pv_name: dev_name.into(),
        };

        let device = self.devices.get_mut(dev_name).ok_or_else(size_error)?;
        block_io_sectors(device).map_err(|_| size_error())
    }
}
