//! FAT (File Allocation Table) volume recognition

pub mod types;

use crate::volume::{read_bytes, ProbedFilesystem};
use mbrscan_core::{BlockDevice, Filesystem, FilesystemDriver, Result, VolumeInfo};
use std::sync::Arc;
use types::BiosParameterBlock;

/// Recognises FAT12, FAT16 and FAT32 volumes from their boot sector
#[derive(Debug, Default, Clone, Copy)]
pub struct FatDriver;

impl FatDriver {
    pub const NAME: &'static str = "fat";

    /// Read and validate the boot sector of `device`
    pub fn probe(device: &dyn BlockDevice) -> Result<BiosParameterBlock> {
        let boot_sector = read_bytes(device, 0, BiosParameterBlock::BOOT_SECTOR_SIZE)?;
        BiosParameterBlock::from_bytes(&boot_sector)
    }
}

impl FilesystemDriver for FatDriver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&self, device: Arc<dyn BlockDevice>) -> Result<Arc<dyn Filesystem>> {
        let bpb = Self::probe(device.as_ref())?;

        tracing::debug!(
            "{}: {} with {} sectors of {} bytes",
            device.device_name(),
            bpb.fat_type,
            bpb.total_sectors,
            bpb.bytes_per_sector
        );

        let volume = VolumeInfo {
            variant: bpb.fat_type.to_string(),
            label: bpb.label.clone(),
            allocation_unit: bpb.bytes_per_cluster(),
            total_bytes: bpb.volume_bytes(),
        };

        Ok(Arc::new(ProbedFilesystem::new(Self::NAME, device, volume)))
    }
}
