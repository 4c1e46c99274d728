//! # mbrscan zones
//!
//! MBR partition discovery for block devices.
//!
//! - **mbr**: decodes the four-slot table in block 0
//! - **partition**: a block device that exposes one partition of its parent
//! - **binding**: type code to filesystem driver dispatch
//! - **scan**: ties the above together into [`scan_partitions`]
//!
//! GPT is not interpreted; a GPT protective entry is reported like any other
//! unbound partition.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mbrscan_core::{BlockDevice, Filesystem};
//! use mbrscan_pipeline::{DeviceConfig, ImageDevice};
//! use mbrscan_zones::{scan_partitions, DriverSet};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let disk = Arc::new(ImageDevice::open(Path::new("disk.img"), "sda", DeviceConfig::default()).unwrap());
//! let mut mounted: Vec<Arc<dyn Filesystem>> = Vec::new();
//!
//! let result = scan_partitions(disk, &DriverSet::new(), &mut mounted).unwrap();
//! println!("{} partition(s)", result.count());
//! ```

pub mod binding;
pub mod mbr;
pub mod partition;
pub mod scan;

#[cfg(test)]
mod test_support;

pub use binding::{bind, driver_for, DriverKind, DriverSet, DRIVER_TABLE};
pub use mbr::{MbrPartitionTable, PartitionDescriptor, PartitionType};
pub use partition::PartitionBlockDevice;
pub use scan::{scan_partitions, Partition, PartitionReport, ScanReport, ScanResult};
