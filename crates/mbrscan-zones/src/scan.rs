//! Partition scan: parse the table, derive devices, bind filesystems

use crate::binding::{self, DriverSet};
use crate::mbr::{MbrPartitionTable, PartitionType};
use crate::partition::PartitionBlockDevice;
use mbrscan_core::{BlockDevice, Error, Filesystem, Result, VfsRegistrar};
use serde::Serialize;
use std::sync::{Arc, OnceLock};

/// A partition discovered by a scan
///
/// Holds the derived device and, once a driver claimed it, the bound
/// filesystem. The binding is write-once.
pub struct Partition {
    device: Arc<PartitionBlockDevice>,
    filesystem: OnceLock<Arc<dyn Filesystem>>,
}

impl Partition {
    fn new(device: Arc<PartitionBlockDevice>) -> Self {
        Self {
            device,
            filesystem: OnceLock::new(),
        }
    }

    /// The partition device
    pub fn device(&self) -> &Arc<PartitionBlockDevice> {
        &self.device
    }

    /// The partition device as a generic block device
    pub fn block_device(&self) -> Arc<dyn BlockDevice> {
        self.device.clone()
    }

    /// The filesystem bound to this partition, if any
    pub fn filesystem(&self) -> Option<&Arc<dyn Filesystem>> {
        self.filesystem.get()
    }

    /// Record the filesystem bound to this partition
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if a filesystem is already bound; the first binding
    /// is kept.
    pub fn bind_filesystem(&self, fs: Arc<dyn Filesystem>) -> Result<()> {
        self.filesystem.set(fs).map_err(|_| {
            Error::invalid_operation(format!(
                "{} already has a bound filesystem",
                self.device.device_name()
            ))
        })
    }

    /// Serializable summary of this partition
    pub fn report(&self) -> PartitionReport {
        let device = &self.device;
        PartitionReport {
            name: device.device_name().to_string(),
            slot: device.partition_index(),
            device_id: device.device_id().to_vec(),
            type_code: device.type_code(),
            type_name: device.partition_type().to_string(),
            start_block: device.start_block(),
            block_count: device.declared_blocks(),
            block_size: device.block_size(),
            filesystem: self.filesystem().map(|fs| fs.fs_name().to_string()),
            volume: self.filesystem().map(|fs| fs.volume().to_string()),
        }
    }
}

/// The ordered outcome of a successful scan
pub struct ScanResult {
    parent_name: String,
    disk_signature: u32,
    partitions: Vec<Partition>,
}

impl ScanResult {
    /// Discovered partitions in ascending slot order
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Number of discovered partitions
    pub fn count(&self) -> usize {
        self.partitions.len()
    }

    /// Find a partition by its table slot
    pub fn slot(&self, index: u8) -> Option<&Partition> {
        self.partitions
            .iter()
            .find(|p| p.device.partition_index() == index)
    }

    /// Name of the scanned parent device
    pub fn parent_name(&self) -> &str {
        &self.parent_name
    }

    pub fn disk_signature(&self) -> u32 {
        self.disk_signature
    }

    pub fn into_partitions(self) -> Vec<Partition> {
        self.partitions
    }

    /// Serializable summary of the whole scan
    pub fn report(&self) -> ScanReport {
        ScanReport {
            device: self.parent_name.clone(),
            disk_signature: self.disk_signature,
            count: self.count(),
            partitions: self.partitions.iter().map(Partition::report).collect(),
        }
    }
}

/// Scan summary, suitable for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub device: String,
    pub disk_signature: u32,
    pub count: usize,
    pub partitions: Vec<PartitionReport>,
}

/// Per-partition scan summary
#[derive(Debug, Clone, Serialize)]
pub struct PartitionReport {
    pub name: String,
    pub slot: u8,
    pub device_id: Vec<u8>,
    pub type_code: u8,
    pub type_name: String,
    pub start_block: u32,
    pub block_count: u32,
    pub block_size: u32,
    pub filesystem: Option<String>,
    pub volume: Option<String>,
}

/// Discover the MBR partitions of `parent`
///
/// Every active slot becomes a [`PartitionBlockDevice`], whether or not a
/// filesystem driver claims it. Filesystems that do get bound are handed to
/// `vfs`.
///
/// # Errors
///
/// Any table parse failure (`InvalidParent`, `ReadFailure`, `NoSignature`)
/// aborts the scan; no partitions are returned and `vfs` is not touched.
///
/// # Example
///
/// ```rust,no_run
/// use mbrscan_core::{BlockDevice, Filesystem};
/// use mbrscan_pipeline::{DeviceConfig, ImageDevice};
/// use mbrscan_zones::{scan_partitions, DriverSet};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let disk = Arc::new(ImageDevice::open(Path::new("disk.img"), "sda", DeviceConfig::default()).unwrap());
/// let mut mounted: Vec<Arc<dyn Filesystem>> = Vec::new();
/// let result = scan_partitions(disk, &DriverSet::new(), &mut mounted).unwrap();
/// for partition in result.partitions() {
///     println!("{}", partition.device().device_name());
/// }
/// ```
pub fn scan_partitions(
    parent: Arc<dyn BlockDevice>,
    drivers: &DriverSet,
    vfs: &mut dyn VfsRegistrar,
) -> Result<ScanResult> {
    let table = MbrPartitionTable::parse(parent.as_ref())?;

    let mut partitions = Vec::with_capacity(MbrPartitionTable::NUM_PARTITIONS);
    for (slot, descriptor) in table.active() {
        let device = Arc::new(PartitionBlockDevice::new(
            Arc::clone(&parent),
            slot as u8,
            descriptor,
        ));

        tracing::debug!(
            "MBR: partition number {} ({}) of type {}, start sector {}, sector count {}",
            slot,
            device.device_name(),
            PartitionType::from_byte(descriptor.type_code),
            descriptor.start_block,
            descriptor.block_count
        );

        let partition = Partition::new(device);
        if let Some(fs) = binding::bind(&partition.block_device(), descriptor.type_code, drivers) {
            partition.bind_filesystem(Arc::clone(&fs))?;
            vfs.register(fs);
        }
        partitions.push(partition);
    }

    tracing::info!(
        "MBR: found total of {} partition(s) on {}",
        partitions.len(),
        parent.device_name()
    );

    Ok(ScanResult {
        parent_name: parent.device_name().to_string(),
        disk_signature: table.disk_signature(),
        partitions,
    })
}
