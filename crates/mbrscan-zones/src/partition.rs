//! Partition block device - one MBR slot exposed as a block device

use crate::mbr::{PartitionDescriptor, PartitionType};
use mbrscan_core::{translate_block, BlockDevice, Error, Result};
use std::sync::Arc;

/// A block device that exposes one partition of its parent.
///
/// Block `n` of the partition is block `n + start_block` of the parent. The
/// parent is shared and read-only; holding it in an `Arc` keeps it alive for
/// as long as any partition derived from it.
///
/// Reads are not limited to `block_count`: addresses past the declared extent
/// go straight to the parent.
pub struct PartitionBlockDevice {
    parent: Arc<dyn BlockDevice>,
    name: String,
    id: [u8; 1],
    block_size: u32,
    partition_index: u8,
    type_code: u8,
    start_block: u32,
    block_count: u32,
}

impl PartitionBlockDevice {
    /// Driver name reported for partition devices
    pub const DRIVER_NAME: &'static str = "mbr";

    /// Derive a partition device from slot `partition_index` of `parent`
    ///
    /// The name is `<parent>_<index>`, the id is the single byte `index`, and
    /// the block size is copied from the parent.
    pub fn new(
        parent: Arc<dyn BlockDevice>,
        partition_index: u8,
        descriptor: &PartitionDescriptor,
    ) -> Self {
        let name = format!("{}_{}", parent.device_name(), partition_index);
        let block_size = parent.block_size();

        Self {
            parent,
            name,
            id: [partition_index],
            block_size,
            partition_index,
            type_code: descriptor.type_code,
            start_block: descriptor.start_block,
            block_count: descriptor.block_count,
        }
    }

    /// The device this partition reads through
    pub fn parent(&self) -> &Arc<dyn BlockDevice> {
        &self.parent
    }

    /// Slot of this partition in the table (0-3)
    pub fn partition_index(&self) -> u8 {
        self.partition_index
    }

    /// Raw type code from the table entry
    pub fn type_code(&self) -> u8 {
        self.type_code
    }

    pub fn partition_type(&self) -> PartitionType {
        PartitionType::from_byte(self.type_code)
    }

    /// First parent block of this partition
    pub fn start_block(&self) -> u32 {
        self.start_block
    }

    /// Declared length in blocks (informational, not enforced on reads)
    pub fn declared_blocks(&self) -> u32 {
        self.block_count
    }
}

impl BlockDevice for PartitionBlockDevice {
    fn device_name(&self) -> &str {
        &self.name
    }

    fn device_id(&self) -> &[u8] {
        &self.id
    }

    fn block_size(&self) -> u32 {
        self.block_size
    }

    fn driver_name(&self) -> &str {
        Self::DRIVER_NAME
    }

    fn read(&self, buf: &mut [u8], start_block: u64) -> Result<usize> {
        let parent_block_size = self.parent.block_size();
        if self.block_size != parent_block_size {
            tracing::warn!(
                "MBR: read() error on {} - block size differs ({} vs {})",
                self.name,
                self.block_size,
                parent_block_size
            );
            return Err(Error::BlockSizeMismatch {
                device: self.name.clone(),
                partition: self.block_size,
                parent: parent_block_size,
            });
        }

        let parent_block = translate_block(start_block, self.start_block, &self.name)?;
        self.parent.read(buf, parent_block)
    }

    fn block_count(&self) -> Option<u64> {
        Some(self.block_count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CountingDevice;

    fn descriptor(start_block: u32, block_count: u32) -> PartitionDescriptor {
        PartitionDescriptor {
            type_code: 0x83,
            start_block,
            block_count,
        }
    }

    fn numbered_blocks(blocks: usize, block_size: usize) -> Vec<u8> {
        (0..blocks)
            .flat_map(|b| std::iter::repeat(b as u8).take(block_size))
            .collect()
    }

    #[test]
    fn test_partition_identity() {
        let parent = Arc::new(CountingDevice::new("sda", Vec::new(), 512));
        let part = PartitionBlockDevice::new(parent, 2, &descriptor(2048, 204_800));

        assert_eq!(part.device_name(), "sda_2");
        assert_eq!(part.device_id(), &[2]);
        assert_eq!(part.driver_name(), "mbr");
        assert_eq!(part.block_size(), 512);
        assert_eq!(part.start_block(), 2048);
        assert_eq!(part.declared_blocks(), 204_800);
        assert_eq!(part.block_count(), Some(204_800));
        assert_eq!(part.partition_type(), PartitionType::LinuxNative);
    }

    #[test]
    fn test_block_size_inherited_from_parent() {
        let parent = Arc::new(CountingDevice::new("nvme0", Vec::new(), 4096));
        let part = PartitionBlockDevice::new(parent, 0, &descriptor(1, 1));

        assert_eq!(part.block_size(), 4096);
    }

    #[test]
    fn test_read_translates_block_address() {
        let parent = Arc::new(CountingDevice::new("sda", numbered_blocks(16, 512), 512));
        let part = PartitionBlockDevice::new(parent.clone(), 0, &descriptor(4, 8));

        let mut via_partition = [0u8; 1024];
        let mut via_parent = [0u8; 1024];
        let n = part.read(&mut via_partition, 3).unwrap();
        let m = parent.read(&mut via_parent, 7).unwrap();

        assert_eq!(n, m);
        assert_eq!(via_partition, via_parent);
        assert_eq!(via_partition[0], 7);
        assert_eq!(via_partition[512], 8);
        assert_eq!(parent.calls(), vec![(7, 1024), (7, 1024)]);
    }

    #[test]
    fn test_read_past_declared_extent_passes_through() {
        let parent = Arc::new(CountingDevice::new("sda", numbered_blocks(16, 512), 512));
        let part = PartitionBlockDevice::new(parent.clone(), 1, &descriptor(2, 2));

        let mut buf = [0u8; 512];
        assert_eq!(part.read(&mut buf, 10).unwrap(), 512);
        assert_eq!(buf[0], 12);
        assert_eq!(parent.calls(), vec![(12, 512)]);
    }

    #[test]
    fn test_parent_error_is_propagated() {
        let parent = Arc::new(CountingDevice::failing("sda"));
        let part = PartitionBlockDevice::new(parent, 0, &descriptor(1, 1));

        let mut buf = [0u8; 512];
        assert!(matches!(part.read(&mut buf, 0), Err(Error::Io(_))));
    }

    #[test]
    fn test_block_size_mismatch_blocks_io() {
        let parent = Arc::new(CountingDevice::new("sda", numbered_blocks(16, 512), 512));
        let part = PartitionBlockDevice::new(parent.clone(), 0, &descriptor(4, 8));

        parent.set_block_size(1024);

        let mut buf = [0u8; 512];
        for block in [0, 1, 100] {
            match part.read(&mut buf, block) {
                Err(Error::BlockSizeMismatch {
                    device,
                    partition,
                    parent: parent_size,
                }) => {
                    assert_eq!(device, "sda_0");
                    assert_eq!(partition, 512);
                    assert_eq!(parent_size, 1024);
                }
                other => panic!("expected BlockSizeMismatch, got {:?}", other),
            }
        }
        assert_eq!(parent.reads(), 0);

        parent.set_block_size(512);
        assert!(part.read(&mut buf, 0).is_ok());
    }

    #[test]
    fn test_address_overflow_is_rejected() {
        let parent = Arc::new(CountingDevice::new("sda", Vec::new(), 512));
        let part = PartitionBlockDevice::new(parent.clone(), 0, &descriptor(1, 1));

        let mut buf = [0u8; 512];
        assert!(matches!(
            part.read(&mut buf, u64::MAX),
            Err(Error::InvalidOperation(_))
        ));
        assert_eq!(parent.reads(), 0);
    }

    #[test]
    fn test_partitions_stack() {
        let disk = Arc::new(CountingDevice::new("sda", numbered_blocks(32, 512), 512));
        let outer: Arc<dyn BlockDevice> =
            Arc::new(PartitionBlockDevice::new(disk.clone(), 1, &descriptor(8, 16)));
        let inner = PartitionBlockDevice::new(outer, 0, &descriptor(2, 4));

        assert_eq!(inner.device_name(), "sda_1_0");

        let mut buf = [0u8; 512];
        inner.read(&mut buf, 1).unwrap();
        assert_eq!(buf[0], 11);
        assert_eq!(disk.calls(), vec![(11, 512)]);
    }
}
