//! MBR partition types and table entries

use std::fmt;

/// MBR partition type codes
///
/// These are the standard partition type identifiers used in the MBR partition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionType {
    /// Empty/unused partition entry
    Empty,
    /// FAT12, CHS
    Fat12,
    /// FAT16 < 32MB, CHS
    Fat16Small,
    /// Extended partition, CHS
    Extended,
    /// FAT16 >= 32MB, CHS
    Fat16,
    /// NTFS/exFAT/HPFS
    Ntfs,
    /// FAT32, CHS
    Fat32Chs,
    /// FAT32, LBA
    Fat32Lba,
    /// FAT16, LBA
    Fat16Lba,
    /// Extended partition, LBA
    ExtendedLba,
    /// Hidden FAT12
    HiddenFat12,
    /// Hidden FAT16 < 32MB
    HiddenFat16Small,
    /// Hidden FAT32, CHS
    HiddenFat32Chs,
    /// Hidden FAT32, LBA
    HiddenFat32Lba,
    /// Hidden FAT16, LBA
    HiddenFat16Lba,
    /// Linux swap
    LinuxSwap,
    /// Linux native (ext2/ext3/ext4)
    LinuxNative,
    /// GPT protective MBR
    GptProtective,
    /// EFI system partition
    EfiSystem,
    /// Unknown partition type
    Unknown(u8),
}

impl PartitionType {
    /// Create a partition type from a byte value
    pub fn from_byte(b: u8) -> Self {
        match b {
            0x00 => Self::Empty,
            0x01 => Self::Fat12,
            0x04 => Self::Fat16Small,
            0x05 => Self::Extended,
            0x06 => Self::Fat16,
            0x07 => Self::Ntfs,
            0x0B => Self::Fat32Chs,
            0x0C => Self::Fat32Lba,
            0x0E => Self::Fat16Lba,
            0x0F => Self::ExtendedLba,
            0x11 => Self::HiddenFat12,
            0x14 => Self::HiddenFat16Small,
            0x1B => Self::HiddenFat32Chs,
            0x1C => Self::HiddenFat32Lba,
            0x1E => Self::HiddenFat16Lba,
            0x82 => Self::LinuxSwap,
            0x83 => Self::LinuxNative,
            0xEE => Self::GptProtective,
            0xEF => Self::EfiSystem,
            _ => Self::Unknown(b),
        }
    }

    /// Get a human-readable name for this partition type
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Fat12 => "FAT12",
            Self::Fat16Small => "FAT16 (<32MB)",
            Self::Extended => "Extended",
            Self::Fat16 => "FAT16",
            Self::Ntfs => "NTFS/exFAT",
            Self::Fat32Chs => "FAT32 (CHS)",
            Self::Fat32Lba => "FAT32 (LBA)",
            Self::Fat16Lba => "FAT16 (LBA)",
            Self::ExtendedLba => "Extended (LBA)",
            Self::HiddenFat12 => "Hidden FAT12",
            Self::HiddenFat16Small => "Hidden FAT16 (<32MB)",
            Self::HiddenFat32Chs => "Hidden FAT32 (CHS)",
            Self::HiddenFat32Lba => "Hidden FAT32 (LBA)",
            Self::HiddenFat16Lba => "Hidden FAT16 (LBA)",
            Self::LinuxSwap => "Linux swap",
            Self::LinuxNative => "Linux",
            Self::GptProtective => "GPT Protective",
            Self::EfiSystem => "EFI System",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for PartitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(b) => write!(f, "Unknown (0x{:02X})", b),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// One decoded slot of the partition table
///
/// Only the type code and the LBA fields are decoded; status and CHS bytes
/// are not used for addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartitionDescriptor {
    /// Raw type code; 0 marks an unused slot
    pub type_code: u8,
    /// First block of the partition on the parent device
    pub start_block: u32,
    /// Declared length in blocks
    pub block_count: u32,
}

impl PartitionDescriptor {
    /// Size of an on-disk entry
    pub const ENTRY_SIZE: usize = 16;

    const TYPE_OFFSET: usize = 4;
    const START_OFFSET: usize = 8;
    const COUNT_OFFSET: usize = 12;

    /// Decode a 16-byte table entry
    pub fn from_entry(entry: &[u8; Self::ENTRY_SIZE]) -> Self {
        let le32 = |at: usize| {
            u32::from_le_bytes([entry[at], entry[at + 1], entry[at + 2], entry[at + 3]])
        };

        Self {
            type_code: entry[Self::TYPE_OFFSET],
            start_block: le32(Self::START_OFFSET),
            block_count: le32(Self::COUNT_OFFSET),
        }
    }

    /// A slot is active iff its type code is non-zero
    pub fn is_active(&self) -> bool {
        self.type_code != 0
    }

    /// Decoded partition type
    pub fn partition_type(&self) -> PartitionType {
        PartitionType::from_byte(self.type_code)
    }
}
