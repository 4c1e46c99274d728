//! MBR (Master Boot Record) partition table parser

pub mod types;

use mbrscan_core::{BlockDevice, Error, Result, MBR_SECTOR_SIZE};
pub use types::{PartitionDescriptor, PartitionType};

const SLOT_COUNT: usize = 4;

/// MBR partition table
///
/// The Master Boot Record is the traditional partitioning scheme used by BIOS-based systems.
/// It holds four fixed primary partition slots.
///
/// # Structure
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0x000   440   Bootstrap code
/// 0x1B8   4     Disk signature
/// 0x1BE   16    Partition entry 1
/// 0x1CE   16    Partition entry 2
/// 0x1DE   16    Partition entry 3
/// 0x1EE   16    Partition entry 4
/// 0x1FE   2     Boot signature (0x55 0xAA)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MbrPartitionTable {
    descriptors: [PartitionDescriptor; SLOT_COUNT],
    disk_signature: u32,
}

impl MbrPartitionTable {
    /// The two bytes that must be present at offset 0x1FE
    pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];

    /// Offset of the first partition entry
    pub const PARTITION_TABLE_OFFSET: usize = 0x1BE;

    /// Offset of the disk signature
    pub const DISK_SIGNATURE_OFFSET: usize = 0x1B8;

    /// Offset of the boot signature
    pub const BOOT_SIGNATURE_OFFSET: usize = 0x1FE;

    /// Number of partition entries in MBR
    pub const NUM_PARTITIONS: usize = SLOT_COUNT;

    /// Read and decode the partition table in block 0 of `parent`
    ///
    /// The parent is never modified.
    ///
    /// # Errors
    ///
    /// - `InvalidParent` if the parent reports a zero block size or no name
    /// - `ReadFailure` if the read fails or returns fewer than 512 bytes
    /// - `NoSignature` if bytes 0x1FE/0x1FF are not 0x55/0xAA
    pub fn parse(parent: &dyn BlockDevice) -> Result<Self> {
        validate_parent(parent)?;
        let name = parent.device_name();

        tracing::debug!("MBR: reading block 0 from device {}", name);
        let mut sector = [0u8; MBR_SECTOR_SIZE];
        let read = match parent.read(&mut sector, 0) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("MBR: block read failed on {}: {}", name, e);
                return Err(Error::read_failure_from(name, "block 0 read failed", e));
            }
        };

        if read != MBR_SECTOR_SIZE {
            tracing::warn!(
                "MBR: unable to read first {} bytes of device {}, only {} bytes read",
                MBR_SECTOR_SIZE,
                name,
                read
            );
            return Err(Error::read_failure(
                name,
                format!("only {} of {} bytes read", read, MBR_SECTOR_SIZE),
            ));
        }

        let table = Self::from_sector(name, &sector)?;
        tracing::info!("MBR: found valid MBR on device {}", name);
        Ok(table)
    }

    /// Decode an already read boot sector
    ///
    /// `device` is only used for error and log messages.
    pub fn from_sector(device: &str, sector: &[u8; MBR_SECTOR_SIZE]) -> Result<Self> {
        let found = [
            sector[Self::BOOT_SIGNATURE_OFFSET],
            sector[Self::BOOT_SIGNATURE_OFFSET + 1],
        ];
        if found != Self::BOOT_SIGNATURE {
            tracing::warn!(
                "MBR: no valid mbr signature on device {} (bytes are {:02x} {:02x})",
                device,
                found[0],
                found[1]
            );
            return Err(Error::NoSignature {
                device: device.to_string(),
                found,
            });
        }

        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!("MBR: first sector of {}:\n{}", device, hex_dump(sector));
        }

        let sig = Self::DISK_SIGNATURE_OFFSET;
        let disk_signature =
            u32::from_le_bytes([sector[sig], sector[sig + 1], sector[sig + 2], sector[sig + 3]]);

        let mut descriptors = [PartitionDescriptor::default(); SLOT_COUNT];
        for (i, descriptor) in descriptors.iter_mut().enumerate() {
            let offset = Self::PARTITION_TABLE_OFFSET + i * PartitionDescriptor::ENTRY_SIZE;
            let mut entry = [0u8; PartitionDescriptor::ENTRY_SIZE];
            entry.copy_from_slice(&sector[offset..offset + PartitionDescriptor::ENTRY_SIZE]);
            *descriptor = PartitionDescriptor::from_entry(&entry);
        }

        let table = Self {
            descriptors,
            disk_signature,
        };

        if table.is_gpt_protective() {
            tracing::warn!(
                "MBR: device {} carries a GPT protective entry; GPT is not interpreted",
                device
            );
        }

        Ok(table)
    }

    /// All four slots in on-disk order, active or not
    pub fn descriptors(&self) -> &[PartitionDescriptor; SLOT_COUNT] {
        &self.descriptors
    }

    /// Active slots with their slot index, in on-disk order
    pub fn active(&self) -> impl Iterator<Item = (usize, &PartitionDescriptor)> {
        self.descriptors
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_active())
    }

    /// Get the disk signature
    pub fn disk_signature(&self) -> u32 {
        self.disk_signature
    }

    /// Check if this MBR contains a GPT protective partition
    pub fn is_gpt_protective(&self) -> bool {
        self.descriptors
            .iter()
            .any(|d| d.partition_type() == PartitionType::GptProtective)
    }
}

fn validate_parent(parent: &dyn BlockDevice) -> Result<()> {
    if parent.device_name().is_empty() {
        tracing::warn!("MBR: invalid parent device (no name)");
        return Err(Error::invalid_parent("device has no name"));
    }
    if parent.block_size() == 0 {
        tracing::warn!("MBR: invalid parent device {}", parent.device_name());
        return Err(Error::invalid_parent(format!(
            "{} reports a block size of 0",
            parent.device_name()
        )));
    }
    Ok(())
}

/// Format bytes as 16-per-line hex rows with an offset prefix
fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            format!("{:03x}: {}", row * 16, hex.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
