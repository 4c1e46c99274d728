//! FAT boot sector structures

use mbrscan_core::{Error, Result};
use std::fmt;

/// FAT type variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatType {
    Fat12,
    Fat16,
    Fat32,
}

impl fmt::Display for FatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatType::Fat12 => write!(f, "FAT12"),
            FatType::Fat16 => write!(f, "FAT16"),
            FatType::Fat32 => write!(f, "FAT32"),
        }
    }
}

/// BIOS Parameter Block (BPB) fields needed to recognise a FAT volume
#[derive(Debug, Clone)]
pub struct BiosParameterBlock {
    /// Bytes per sector (512-4096)
    pub bytes_per_sector: u16,
    /// Sectors per cluster (power of 2)
    pub sectors_per_cluster: u8,
    /// Number of reserved sectors (including boot sector)
    pub reserved_sectors: u16,
    /// Number of FAT copies (typically 2)
    pub num_fats: u8,
    /// Maximum root directory entries (FAT12/16 only, 0 for FAT32)
    pub root_entries: u16,
    /// Total sectors of the volume
    pub total_sectors: u32,
    /// Sectors per FAT (from the 32-bit field on FAT32)
    pub sectors_per_fat: u32,
    /// FAT type determined from cluster count
    pub fat_type: FatType,
    /// Volume label from the extended boot record, if present
    pub label: Option<String>,
}

impl BiosParameterBlock {
    /// Size of the boot sector holding the BPB
    pub const BOOT_SECTOR_SIZE: usize = 512;

    /// Extended boot signature marking a valid label field
    const EXTENDED_BOOT_SIGNATURE: u8 = 0x29;

    /// Parse BPB from boot sector bytes
    ///
    /// # Security
    /// Rejects zero/implausible geometry and uses checked arithmetic for the
    /// cluster count
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::BOOT_SECTOR_SIZE {
            return Err(invalid("boot sector too short"));
        }

        if bytes[510] != 0x55 || bytes[511] != 0xAA {
            return Err(invalid("missing boot sector signature"));
        }

        let bytes_per_sector = u16::from_le_bytes([bytes[11], bytes[12]]);
        let sectors_per_cluster = bytes[13];
        let reserved_sectors = u16::from_le_bytes([bytes[14], bytes[15]]);
        let num_fats = bytes[16];
        let root_entries = u16::from_le_bytes([bytes[17], bytes[18]]);
        let total_sectors_16 = u16::from_le_bytes([bytes[19], bytes[20]]);
        let sectors_per_fat_16 = u16::from_le_bytes([bytes[22], bytes[23]]);
        let total_sectors_32 = u32::from_le_bytes([bytes[32], bytes[33], bytes[34], bytes[35]]);

        if !(512..=4096).contains(&bytes_per_sector) || !bytes_per_sector.is_power_of_two() {
            return Err(invalid(format!("bytes_per_sector {}", bytes_per_sector)));
        }
        if sectors_per_cluster == 0 || !sectors_per_cluster.is_power_of_two() {
            return Err(invalid(format!("sectors_per_cluster {}", sectors_per_cluster)));
        }
        if reserved_sectors == 0 || num_fats == 0 {
            return Err(invalid("no reserved sectors or FAT copies"));
        }

        let total_sectors = if total_sectors_16 != 0 {
            total_sectors_16 as u32
        } else {
            total_sectors_32
        };

        let is_fat32_layout = sectors_per_fat_16 == 0;
        let sectors_per_fat = if is_fat32_layout {
            u32::from_le_bytes([bytes[36], bytes[37], bytes[38], bytes[39]])
        } else {
            sectors_per_fat_16 as u32
        };
        if sectors_per_fat == 0 {
            return Err(invalid("sectors_per_fat is 0"));
        }

        let root_dir_sectors = ((root_entries as u64 * 32) + bytes_per_sector as u64 - 1)
            / bytes_per_sector as u64;
        let non_data_sectors = reserved_sectors as u64
            + num_fats as u64 * sectors_per_fat as u64
            + root_dir_sectors;
        let data_sectors = (total_sectors as u64)
            .checked_sub(non_data_sectors)
            .ok_or_else(|| invalid("metadata larger than the volume"))?;
        let cluster_count = data_sectors / sectors_per_cluster as u64;

        let fat_type = if cluster_count < 4085 {
            FatType::Fat12
        } else if cluster_count < 65525 {
            FatType::Fat16
        } else {
            FatType::Fat32
        };

        // Extended boot record sits after the 32-bit FAT size block on FAT32
        let (ebr_signature, label_offset) = if is_fat32_layout { (66, 71) } else { (38, 43) };
        let label = if bytes[ebr_signature] == Self::EXTENDED_BOOT_SIGNATURE {
            crate::volume::decode_label(&bytes[label_offset..label_offset + 11])
        } else {
            None
        };

        Ok(Self {
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sectors,
            num_fats,
            root_entries,
            total_sectors,
            sectors_per_fat,
            fat_type,
            label,
        })
    }

    /// Cluster size in bytes
    pub fn bytes_per_cluster(&self) -> u64 {
        self.bytes_per_sector as u64 * self.sectors_per_cluster as u64
    }

    /// Volume size in bytes
    pub fn volume_bytes(&self) -> u64 {
        self.total_sectors as u64 * self.bytes_per_sector as u64
    }
}

fn invalid(reason: impl Into<String>) -> Error {
    Error::driver_init("fat", reason)
}
