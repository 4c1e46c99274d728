//! # mbrscan territories
//!
//! Filesystem drivers that claim partitions found by a scan.
//!
//! - **FAT**: FAT12, FAT16 and FAT32 boot sector recognition
//! - **ext2**: ext2/3/4 superblock recognition
//!
//! Both drivers read the volume parameters and bind a [`ProbedFilesystem`];
//! file contents are not interpreted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mbrscan_core::Filesystem;
//! use mbrscan_pipeline::{DeviceConfig, ImageDevice};
//! use mbrscan_territories::standard_drivers;
//! use mbrscan_zones::scan_partitions;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let disk = Arc::new(ImageDevice::open(Path::new("disk.img"), "sda", DeviceConfig::default()).unwrap());
//! let mut mounted: Vec<Arc<dyn Filesystem>> = Vec::new();
//!
//! scan_partitions(disk, &standard_drivers(), &mut mounted).unwrap();
//! for fs in &mounted {
//!     println!("{}: {}", fs.device().device_name(), fs.volume());
//! }
//! ```

pub mod ext2;
pub mod fat;
pub mod volume;

pub use ext2::Ext2Driver;
pub use fat::FatDriver;
pub use volume::ProbedFilesystem;

use mbrscan_zones::DriverSet;
use std::sync::Arc;

/// A driver set with the FAT and ext2 drivers of this crate
pub fn standard_drivers() -> DriverSet {
    DriverSet::new()
        .with_fat(Arc::new(FatDriver))
        .with_ext2(Arc::new(Ext2Driver))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbrscan_core::{BlockDevice, Filesystem, FilesystemDriver};
    use mbrscan_pipeline::ImageDevice;
    use mbrscan_zones::{scan_partitions, DriverKind};

    fn put_entry(disk: &mut [u8], slot: usize, type_code: u8, start: u32, count: u32) {
        let at = 446 + slot * 16;
        disk[at + 4] = type_code;
        disk[at + 8..at + 12].copy_from_slice(&start.to_le_bytes());
        disk[at + 12..at + 16].copy_from_slice(&count.to_le_bytes());
    }

    #[test]
    fn test_standard_drivers_cover_both_families() {
        let drivers = standard_drivers();
        assert_eq!(drivers.driver(DriverKind::Fat).unwrap().name(), "fat");
        assert_eq!(drivers.driver(DriverKind::Ext2).unwrap().name(), "ext2");
        assert!(drivers.driver(DriverKind::NoDriver).is_none());
    }

    #[test]
    fn test_scan_binds_fat_and_ext2() {
        let mut disk = vec![0u8; 64 * 1024];
        disk[510] = 0x55;
        disk[511] = 0xAA;
        put_entry(&mut disk, 0, 0x06, 8, 40);
        put_entry(&mut disk, 1, 0x83, 48, 64);
        put_entry(&mut disk, 2, 0x0C, 112, 8);

        let boot = fat::types::tests::fat16_boot_sector();
        disk[8 * 512..9 * 512].copy_from_slice(&boot);
        let sb = ext2::types::tests::ext2_superblock();
        let sb_at = 48 * 512 + 1024;
        disk[sb_at..sb_at + 1024].copy_from_slice(&sb);

        let parent = Arc::new(ImageDevice::from_bytes("sda", disk, 512).unwrap());
        let mut mounted: Vec<Arc<dyn Filesystem>> = Vec::new();
        let result = scan_partitions(parent, &standard_drivers(), &mut mounted).unwrap();

        assert_eq!(result.count(), 3);
        assert_eq!(mounted.len(), 2);
        assert_eq!(mounted[0].device().device_name(), "sda_0");
        assert_eq!(mounted[0].volume().variant, "FAT16");
        assert_eq!(mounted[1].device().device_name(), "sda_1");
        assert_eq!(mounted[1].fs_name(), "ext2");

        // Unformatted FAT32 slot stays available for raw access
        let empty = result.slot(2).unwrap();
        assert!(empty.filesystem().is_none());
        let mut buf = [0xFFu8; 512];
        assert_eq!(empty.block_device().read(&mut buf, 0).unwrap(), 512);
        assert_eq!(buf, [0u8; 512]);
    }
}
