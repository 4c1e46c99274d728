//! ext2/3/4 superblock fields

use mbrscan_core::{Error, Result};
use std::fmt;

/// Which generation of the extended filesystem a superblock describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtVariant {
    Ext2,
    Ext3,
    Ext4,
}

impl fmt::Display for ExtVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtVariant::Ext2 => write!(f, "ext2"),
            ExtVariant::Ext3 => write!(f, "ext3"),
            ExtVariant::Ext4 => write!(f, "ext4"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Superblock {
    pub inodes_count: u32,
    pub blocks_count: u32,
    /// Block size is `1024 << log_block_size`
    pub log_block_size: u32,
    pub rev_level: u32,
    pub feature_compat: u32,
    pub feature_incompat: u32,
    pub volume_name: Option<String>,
}

impl Superblock {
    /// Byte offset of the superblock from the start of the volume
    pub const OFFSET: u64 = 1024;
    pub const SIZE: usize = 1024;

    const MAGIC: u16 = 0xEF53;
    const MAX_LOG_BLOCK_SIZE: u32 = 6;

    const COMPAT_HAS_JOURNAL: u32 = 0x0004;
    const INCOMPAT_EXTENTS: u32 = 0x0040;
    const INCOMPAT_64BIT: u32 = 0x0080;
    const INCOMPAT_FLEX_BG: u32 = 0x0200;

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(invalid("superblock too short"));
        }

        let le32 = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);

        let magic = u16::from_le_bytes([bytes[56], bytes[57]]);
        if magic != Self::MAGIC {
            return Err(invalid(format!("bad magic 0x{:04X}", magic)));
        }

        let log_block_size = le32(24);
        if log_block_size > Self::MAX_LOG_BLOCK_SIZE {
            return Err(invalid(format!("log block size {}", log_block_size)));
        }

        let blocks_count = le32(4);
        let inodes_count = le32(0);
        if blocks_count == 0 || inodes_count == 0 {
            return Err(invalid("empty block or inode count"));
        }

        Ok(Self {
            inodes_count,
            blocks_count,
            log_block_size,
            rev_level: le32(76),
            feature_compat: le32(92),
            feature_incompat: le32(96),
            volume_name: crate::volume::decode_label(&bytes[120..136]),
        })
    }

    /// Filesystem block size in bytes
    pub fn block_size(&self) -> u64 {
        1024u64 << self.log_block_size
    }

    /// Volume size in bytes
    pub fn volume_bytes(&self) -> u64 {
        self.blocks_count as u64 * self.block_size()
    }

    pub fn variant(&self) -> ExtVariant {
        let ext4_features = Self::INCOMPAT_EXTENTS | Self::INCOMPAT_64BIT | Self::INCOMPAT_FLEX_BG;
        if self.feature_incompat & ext4_features != 0 {
            ExtVariant::Ext4
        } else if self.feature_compat & Self::COMPAT_HAS_JOURNAL != 0 {
            ExtVariant::Ext3
        } else {
            ExtVariant::Ext2
        }
    }
}

fn invalid(reason: impl Into<String>) -> Error {
    Error::driver_init("ext2", reason)
}
