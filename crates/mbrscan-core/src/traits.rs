//! Core traits for block devices and the filesystems bound to them

use crate::{
    error::Result,
    types::{FileHandle, OccupantInfo, VolumeInfo},
};
use std::io::{Read, Seek};
use std::sync::Arc;

/// A randomly readable, block-addressed device
///
/// Physical drivers and derived partition devices implement the same trait, so
/// a partition device can itself be the parent of another layer.
pub trait BlockDevice: Send + Sync {
    /// Name of this device, unique among devices created in a run
    fn device_name(&self) -> &str;

    /// Opaque identifier of the hardware or partition slot
    fn device_id(&self) -> &[u8];

    /// Bytes per addressable block
    fn block_size(&self) -> u32;

    /// Name of the component managing this device
    fn driver_name(&self) -> &str;

    /// Read up to `buf.len()` bytes starting at block `start_block`
    ///
    /// Returns the number of bytes read. Fewer bytes than requested means the
    /// device ran out of data.
    fn read(&self, buf: &mut [u8], start_block: u64) -> Result<usize>;

    /// Number of blocks on the device, if known
    fn block_count(&self) -> Option<u64> {
        None
    }
}

/// A mounted filesystem bound to exactly one block device
pub trait Filesystem: Send + Sync {
    /// Short name of the filesystem family (e.g. "fat", "ext2")
    fn fs_name(&self) -> &str;

    /// The device this filesystem was bound to at construction
    fn device(&self) -> &Arc<dyn BlockDevice>;

    /// Volume parameters read while binding
    fn volume(&self) -> &VolumeInfo;

    /// Open a file by path
    fn open(&self, path: &str) -> Result<FileHandle>;

    /// Read from an open file
    fn read(&self, handle: &FileHandle, buf: &mut [u8]) -> Result<usize>;

    /// Close a previously opened file
    fn close(&self, handle: FileHandle) -> Result<()>;

    /// List the entries of a directory
    fn list_directory(&self, path: &str) -> Result<Vec<OccupantInfo>>;
}

/// A filesystem initialiser: claims a device or reports why it cannot
pub trait FilesystemDriver: Send + Sync {
    /// Driver name used in logs and errors
    fn name(&self) -> &str;

    /// Try to bind a filesystem to `device`
    fn init(&self, device: Arc<dyn BlockDevice>) -> Result<Arc<dyn Filesystem>>;
}

/// Receives filesystems produced by a scan
pub trait VfsRegistrar {
    /// Hand over a bound filesystem; success or failure is the registrar's concern
    fn register(&mut self, fs: Arc<dyn Filesystem>);
}

/// A plain list of filesystems in registration order
impl VfsRegistrar for Vec<Arc<dyn Filesystem>> {
    fn register(&mut self, fs: Arc<dyn Filesystem>) {
        self.push(fs);
    }
}

/// Combined trait for Read + Seek
pub trait ReadSeek: Read + Seek + Send {}

/// Blanket implementation for any type that implements Read + Seek
impl<T: Read + Seek + Send> ReadSeek for T {}
