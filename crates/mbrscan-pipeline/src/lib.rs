//! # mbrscan pipeline
//!
//! Parent block devices for the partition scanner.
//!
//! - **ImageDevice**: a disk image (file, memory map or any stream) as a block device
//! - **MmapPipeline**: read-only memory-mapped image backing
//!
//! ## Example
//!
//! ```rust,no_run
//! use mbrscan_pipeline::{DeviceConfig, ImageDevice};
//! use mbrscan_core::BlockDevice;
//! use std::path::Path;
//!
//! let device = ImageDevice::open(Path::new("disk.img"), "sda", DeviceConfig::default()).unwrap();
//!
//! let mut sector = [0u8; 512];
//! device.read(&mut sector, 0).unwrap();
//! ```

pub mod device;
pub mod mmap;

pub use device::{DeviceConfig, ImageDevice};
pub use mmap::MmapPipeline;
