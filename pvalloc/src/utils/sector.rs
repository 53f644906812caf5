//! Sector and extent conversion utilities

use crate::types::SECTOR_SIZE;

/// Convert a byte count to whole sectors (round down)
pub fn bytes_to_sectors(bytes: u64) -> u64 {
    bytes / SECTOR_SIZE
}

/// Convert sectors to bytes
pub fn sectors_to_bytes(sectors: u64) -> u64 {
    sectors * SECTOR_SIZE
}

/// Sectors covered by `num_blocks` blocks of `block_size` bytes
pub fn blocks_to_sectors(num_blocks: u64, block_size: u64) -> u64 {
    bytes_to_sectors(num_blocks.saturating_mul(block_size))
}

/// Whole extents of `extent_size` sectors fitting in `sectors`.
///
/// Returns 0 for a zero extent size. Saturates at `u32::MAX`.
pub fn sectors_to_extents(sectors: u64, extent_size: u32) -> u32 {
    if extent_size == 0 {
        return 0;
    }
    u32::try_from(sectors / u64::from(extent_size)).unwrap_or(u32::MAX)
}

/// Sectors covered by `extents` extents of `extent_size` sectors
pub fn extents_to_sectors(extents: u32, extent_size: u32) -> u64 {
    u64::from(extents) * u64::from(extent_size)
}
