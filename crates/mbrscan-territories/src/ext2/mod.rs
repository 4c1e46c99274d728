//! ext2 family volume recognition

pub mod types;

use crate::volume::{read_bytes, ProbedFilesystem};
use mbrscan_core::{BlockDevice, Filesystem, FilesystemDriver, Result, VolumeInfo};
use std::sync::Arc;
use types::Superblock;

/// Recognises ext2, ext3 and ext4 volumes from their superblock
#[derive(Debug, Default, Clone, Copy)]
pub struct Ext2Driver;

impl Ext2Driver {
    pub const NAME: &'static str = "ext2";

    pub fn probe(device: &dyn BlockDevice) -> Result<Superblock> {
        let raw = read_bytes(device, Superblock::OFFSET, Superblock::SIZE)?;
        Superblock::from_bytes(&raw)
    }
}

impl FilesystemDriver for Ext2Driver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&self, device: Arc<dyn BlockDevice>) -> Result<Arc<dyn Filesystem>> {
        let sb = Self::probe(device.as_ref())?;

        tracing::debug!(
            "{}: {} rev {}, {} blocks of {} bytes",
            device.device_name(),
            sb.variant(),
            sb.rev_level,
            sb.blocks_count,
            sb.block_size()
        );

        let volume = VolumeInfo {
            variant: sb.variant().to_string(),
            label: sb.volume_name.clone(),
            allocation_unit: sb.block_size(),
            total_bytes: sb.volume_bytes(),
        };

        Ok(Arc::new(ProbedFilesystem::new(Self::NAME, device, volume)))
    }
}
