//! Helper utilities

pub mod sector;

pub use sector::{
    blocks_to_sectors, bytes_to_sectors, extents_to_sectors, sectors_to_bytes, sectors_to_extents,
};
