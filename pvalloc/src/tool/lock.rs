//! Volume group locking

use alloc::string::String;

use crate::error::{PvAllocError, Result};

/// Lock mode requested from the lock manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Read,
    Write,
}

/// External lock manager serializing access to volume group metadata
pub trait LockManager {
    /// Take the lock for `vg_name`
    fn lock_vg(&mut self, vg_name: &str, mode: LockMode) -> Result<()>;

    /// Drop the lock for `vg_name`
    fn unlock_vg(&mut self, vg_name: &str);
}

/// RAII guard that holds a volume group lock and releases it on drop.
pub struct VgLock<'a, L: LockManager + ?Sized> {
    manager: &'a mut L,
    vg_name: String,
}

impl<'a, L: LockManager + ?Sized> VgLock<'a, L> {
    /// Lock `vg_name`, returning a guard that unlocks it on drop.
    pub fn acquire(manager: &'a mut L, vg_name: &str, mode: LockMode) -> Result<Self> {
        if manager.lock_vg(vg_name, mode).is_err() {
            log::error!("Can't get lock for {}", vg_name);
            return Err(PvAllocError::LockFailed {
                vg_name: vg_name.into(),
            });
        }

        Ok(Self {
            manager,
            vg_name: vg_name.into(),
        })
    }

    pub fn vg_name(&self) -> &str {
        &self.vg_name
    }
}

impl<L: LockManager + ?Sized> Drop for VgLock<'_, L> {
    fn drop(&mut self) {
        self.manager.unlock_vg(&self.vg_name);
    }
}
