//! Geometry validation constants and helpers
//!
//! Partition tables are untrusted input. Every block address that is derived
//! from on-disk values goes through checked arithmetic here instead of
//! wrapping silently.

use crate::Error;

/// Size of the legacy boot sector holding the partition table
pub const MBR_SECTOR_SIZE: usize = 512;

/// Maximum block size we'll accept (4KB - common for advanced format)
pub const MAX_BLOCK_SIZE: u32 = 4096;

/// Maximum file size for memory mapping (16 GB - practical limit for most systems)
pub const MAX_MMAP_SIZE: u64 = 16 * 1024 * 1024 * 1024;

/// Validate block size is reasonable
pub fn validate_block_size(block_size: u32) -> crate::Result<()> {
    if block_size == 0 || block_size > MAX_BLOCK_SIZE {
        return Err(Error::invalid_geometry(format!(
            "Invalid block size: {} (must be 1-{})",
            block_size, MAX_BLOCK_SIZE
        )));
    }

    if !block_size.is_power_of_two() {
        return Err(Error::invalid_geometry(format!(
            "Block size {} is not a power of 2",
            block_size
        )));
    }

    Ok(())
}

/// Translate a partition-relative block into a parent-relative block
///
/// # Security
/// Rejects addresses that would wrap past `u64::MAX`
pub fn translate_block(relative: u64, partition_start: u32, context: &str) -> crate::Result<u64> {
    relative.checked_add(partition_start as u64).ok_or_else(|| {
        Error::invalid_operation(format!(
            "{}: block {} + start {} overflows",
            context, relative, partition_start
        ))
    })
}

/// Byte offset of a block, with overflow checking
pub fn block_byte_offset(block: u64, block_size: u32, context: &str) -> crate::Result<u64> {
    block.checked_mul(block_size as u64).ok_or_else(|| {
        Error::invalid_operation(format!(
            "{}: block {} x {} bytes overflows",
            context, block, block_size
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_block_size() {
        assert!(validate_block_size(512).is_ok());
        assert!(validate_block_size(4096).is_ok());

        assert!(validate_block_size(0).is_err());
        assert!(validate_block_size(8192).is_err());
        assert!(validate_block_size(1000).is_err()); // Not power of 2
    }

    #[test]
    fn test_translate_block() {
        assert_eq!(translate_block(5, 2048, "test").unwrap(), 2053);
        assert_eq!(
            translate_block(0, u32::MAX, "test").unwrap(),
            u32::MAX as u64
        );
        assert!(translate_block(u64::MAX, 1, "test").is_err());
        assert_eq!(translate_block(u64::MAX, 0, "test").unwrap(), u64::MAX);
    }

    #[test]
    fn test_block_byte_offset() {
        assert_eq!(block_byte_offset(2048, 512, "test").unwrap(), 1_048_576);
        assert!(block_byte_offset(u64::MAX, 2, "test").is_err());
    }
}
