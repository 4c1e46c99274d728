//! # mbrscan core
//!
//! Core traits, types, and error handling shared by the partition scanner.
//!
//! - **BlockDevice**: anything that can read blocks (disk images, partitions)
//! - **Filesystem**: a mounted volume bound to one block device
//! - **FilesystemDriver**: an initialiser that tries to bind a filesystem
//! - **VfsRegistrar**: the consumer of filesystems produced by a scan
//!
//! ## Example
//!
//! ```rust,no_run
//! use mbrscan_core::{BlockDevice, Result};
//!
//! fn first_block(device: &dyn BlockDevice) -> Result<Vec<u8>> {
//!     let mut buf = vec![0u8; device.block_size() as usize];
//!     let n = device.read(&mut buf, 0)?;
//!     buf.truncate(n);
//!     Ok(buf)
//! }
//! ```

pub mod error;
pub mod security;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use error::{Error, Result};
pub use security::*;
pub use traits::{BlockDevice, Filesystem, FilesystemDriver, ReadSeek, VfsRegistrar};
pub use types::{format_size, FileHandle, OccupantInfo, VolumeInfo};
