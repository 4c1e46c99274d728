//! Image device - a whole disk image exposed as a block device

use crate::MmapPipeline;
use mbrscan_core::{
    block_byte_offset, validate_block_size, BlockDevice, Error, ReadSeek, Result,
};
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Configuration for opening an image as a block device
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Use memory mapping instead of buffered file reads
    pub use_mmap: bool,

    /// Bytes per block exposed to readers
    pub block_size: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            use_mmap: true,
            block_size: 512,
        }
    }
}

enum Backing {
    Mapped(MmapPipeline),
    // Seek + read must not interleave between callers
    Stream(Mutex<Box<dyn ReadSeek>>),
}

/// A disk image presented through the [`BlockDevice`] contract.
///
/// This is the parent device a partition scan starts from. Reads take `&self`;
/// stream-backed images serialise their seek/read pairs internally.
///
/// # Example
///
/// ```rust,no_run
/// use mbrscan_pipeline::{DeviceConfig, ImageDevice};
/// use mbrscan_core::BlockDevice;
/// use std::path::Path;
///
/// let device = ImageDevice::open(Path::new("disk.img"), "sda", DeviceConfig::default()).unwrap();
/// println!("{}: {} byte blocks", device.device_name(), device.block_size());
/// ```
pub struct ImageDevice {
    name: String,
    id: Vec<u8>,
    block_size: AtomicU32,
    length: u64,
    backing: Backing,
}

impl ImageDevice {
    /// Driver name reported for image-backed devices
    pub const DRIVER_NAME: &'static str = "image";

    /// Open an image file
    ///
    /// # Errors
    ///
    /// Returns an error if the block size is invalid or the file cannot be
    /// opened or mapped
    pub fn open(path: &Path, name: impl Into<String>, config: DeviceConfig) -> Result<Self> {
        validate_block_size(config.block_size)?;

        let file = File::open(path)?;
        let length = file.metadata()?.len();

        let backing = if config.use_mmap {
            Backing::Mapped(MmapPipeline::from_file(&file)?)
        } else {
            Backing::Stream(Mutex::new(Box::new(file)))
        };

        Ok(Self::with_backing(name.into(), backing, length, config.block_size))
    }

    /// Wrap any readable and seekable stream
    pub fn from_stream<R: Read + Seek + Send + 'static>(
        name: impl Into<String>,
        stream: R,
        length: u64,
        block_size: u32,
    ) -> Result<Self> {
        validate_block_size(block_size)?;
        Ok(Self::with_backing(
            name.into(),
            Backing::Stream(Mutex::new(Box::new(stream))),
            length,
            block_size,
        ))
    }

    /// Wrap an in-memory image
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>, block_size: u32) -> Result<Self> {
        let length = data.len() as u64;
        Self::from_stream(name, Cursor::new(data), length, block_size)
    }

    fn with_backing(name: String, backing: Backing, length: u64, block_size: u32) -> Self {
        Self {
            id: name.as_bytes().to_vec(),
            name,
            block_size: AtomicU32::new(block_size),
            length,
            backing,
        }
    }

    /// Re-declare the block geometry of this image
    ///
    /// Partition devices derived before the change keep their old block size
    /// and refuse to read until the geometries agree again.
    pub fn set_block_size(&self, block_size: u32) -> Result<()> {
        validate_block_size(block_size)?;
        let old = self.block_size.swap(block_size, Ordering::SeqCst);
        if old != block_size {
            tracing::debug!(
                "{}: block size changed from {} to {}",
                self.name,
                old,
                block_size
            );
        }
        Ok(())
    }

    /// Total image length in bytes
    pub fn length(&self) -> u64 {
        self.length
    }

    fn read_stream(stream: &mut dyn ReadSeek, offset: u64, buf: &mut [u8]) -> Result<usize> {
        stream.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buf.len() {
            match stream.read(&mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(filled)
    }
}

impl BlockDevice for ImageDevice {
    fn device_name(&self) -> &str {
        &self.name
    }

    fn device_id(&self) -> &[u8] {
        &self.id
    }

    fn block_size(&self) -> u32 {
        self.block_size.load(Ordering::SeqCst)
    }

    fn driver_name(&self) -> &str {
        Self::DRIVER_NAME
    }

    fn read(&self, buf: &mut [u8], start_block: u64) -> Result<usize> {
        let offset = block_byte_offset(start_block, self.block_size(), &self.name)?;
        if offset >= self.length || buf.is_empty() {
            return Ok(0);
        }

        let available = (self.length - offset).min(buf.len() as u64) as usize;
        let buf = &mut buf[..available];

        match &self.backing {
            Backing::Mapped(mmap) => Ok(mmap.read_at(offset, buf)),
            Backing::Stream(stream) => {
                let mut stream = stream.lock().map_err(|_| {
                    Error::read_failure(self.name.clone(), "stream lock poisoned")
                })?;
                Self::read_stream(&mut **stream, offset, buf)
            }
        }
    }

    fn block_count(&self) -> Option<u64> {
        Some(self.length / self.block_size() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_image_device_identity() {
        let device = ImageDevice::from_bytes("sda", vec![0u8; 4096], 512).unwrap();

        assert_eq!(device.device_name(), "sda");
        assert_eq!(device.device_id(), b"sda");
        assert_eq!(device.driver_name(), "image");
        assert_eq!(device.block_size(), 512);
        assert_eq!(device.block_count(), Some(8));
    }

    #[test]
    fn test_image_device_read_block() {
        let data = pattern(4096);
        let device = ImageDevice::from_bytes("sda", data.clone(), 512).unwrap();

        let mut buf = [0u8; 512];
        assert_eq!(device.read(&mut buf, 3).unwrap(), 512);
        assert_eq!(&buf[..], &data[1536..2048]);
    }

    #[test]
    fn test_image_device_short_read_at_end() {
        let device = ImageDevice::from_bytes("sda", pattern(1000), 512).unwrap();

        let mut buf = [0u8; 512];
        assert_eq!(device.read(&mut buf, 1).unwrap(), 488);
        assert_eq!(device.read(&mut buf, 2).unwrap(), 0);
    }

    #[test]
    fn test_image_device_rejects_bad_block_size() {
        assert!(ImageDevice::from_bytes("sda", vec![0u8; 512], 0).is_err());
        assert!(ImageDevice::from_bytes("sda", vec![0u8; 512], 500).is_err());
    }

    #[test]
    fn test_set_block_size() {
        let data = pattern(8192);
        let device = ImageDevice::from_bytes("sda", data.clone(), 512).unwrap();

        device.set_block_size(4096).unwrap();
        assert_eq!(device.block_size(), 4096);

        let mut buf = [0u8; 16];
        device.read(&mut buf, 1).unwrap();
        assert_eq!(&buf[..], &data[4096..4112]);

        assert!(device.set_block_size(3).is_err());
        assert_eq!(device.block_size(), 4096);
    }

    #[test]
    fn test_open_file_with_and_without_mmap() {
        let data = pattern(2048);
        let mut tmpfile = NamedTempFile::new().unwrap();
        tmpfile.write_all(&data).unwrap();
        tmpfile.flush().unwrap();

        for use_mmap in [true, false] {
            let config = DeviceConfig {
                use_mmap,
                ..DeviceConfig::default()
            };
            let device = ImageDevice::open(tmpfile.path(), "disk0", config).unwrap();
            assert_eq!(device.length(), 2048);

            let mut buf = [0u8; 1024];
            assert_eq!(device.read(&mut buf, 2).unwrap(), 1024);
            assert_eq!(&buf[..], &data[1024..]);
        }
    }
}
