//! Probed volumes and byte-addressed reads over block devices

use mbrscan_core::{
    BlockDevice, Error, FileHandle, Filesystem, OccupantInfo, Result, VolumeInfo,
};
use std::sync::Arc;

/// A filesystem recognised by a probe driver
///
/// The volume parameters are known; directory and file access are not
/// provided and report `Unsupported`.
pub struct ProbedFilesystem {
    fs_name: &'static str,
    device: Arc<dyn BlockDevice>,
    volume: VolumeInfo,
}

impl ProbedFilesystem {
    pub fn new(fs_name: &'static str, device: Arc<dyn BlockDevice>, volume: VolumeInfo) -> Self {
        Self {
            fs_name,
            device,
            volume,
        }
    }

    fn unsupported(&self, what: &str) -> Error {
        Error::unsupported(format!(
            "{} on {} ({}) is not available from a probed volume",
            what,
            self.device.device_name(),
            self.fs_name
        ))
    }
}

impl Filesystem for ProbedFilesystem {
    fn fs_name(&self) -> &str {
        self.fs_name
    }

    fn device(&self) -> &Arc<dyn BlockDevice> {
        &self.device
    }

    fn volume(&self) -> &VolumeInfo {
        &self.volume
    }

    fn open(&self, path: &str) -> Result<FileHandle> {
        Err(self.unsupported(&format!("open({})", path)))
    }

    fn read(&self, _handle: &FileHandle, _buf: &mut [u8]) -> Result<usize> {
        Err(self.unsupported("read"))
    }

    fn close(&self, handle: FileHandle) -> Result<()> {
        Err(Error::invalid_operation(format!(
            "handle {} was not issued by {}",
            handle.id(),
            self.device.device_name()
        )))
    }

    fn list_directory(&self, path: &str) -> Result<Vec<OccupantInfo>> {
        Err(self.unsupported(&format!("list_directory({})", path)))
    }
}

/// Read exactly `len` bytes starting at byte `offset` of `device`
pub fn read_bytes(device: &dyn BlockDevice, offset: u64, len: usize) -> Result<Vec<u8>> {
    let block_size = device.block_size() as u64;
    if block_size == 0 {
        return Err(Error::invalid_geometry(format!(
            "{} reports a block size of 0",
            device.device_name()
        )));
    }

    let skip = (offset % block_size) as usize;
    let mut buf = vec![0u8; skip + len];
    let n = device.read(&mut buf, offset / block_size)?;
    if n < buf.len() {
        return Err(Error::read_failure(
            device.device_name(),
            format!("only {} of {} bytes at offset {}", n.saturating_sub(skip), len, offset),
        ));
    }

    buf.drain(..skip);
    Ok(buf)
}

/// Decode a space/NUL padded on-disk label
pub fn decode_label(raw: &[u8]) -> Option<String> {
    let label: String = raw
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect::<String>()
        .trim_end()
        .to_string();

    if label.is_empty() || label == "NO NAME" {
        None
    } else {
        Some(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbrscan_pipeline::ImageDevice;

    #[test]
    fn test_read_bytes_unaligned() {
        let data: Vec<u8> = (0..4096).map(|i| (i % 256) as u8).collect();
        let device = ImageDevice::from_bytes("sda", data, 512).unwrap();

        let bytes = read_bytes(&device, 1030, 4).unwrap();
        assert_eq!(bytes, vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_read_bytes_short() {
        let device = ImageDevice::from_bytes("sda", vec![0u8; 1500], 512).unwrap();

        assert!(matches!(
            read_bytes(&device, 1024, 1024),
            Err(Error::ReadFailure { .. })
        ));
    }

    #[test]
    fn test_decode_label() {
        assert_eq!(decode_label(b"BOOT       "), Some("BOOT".to_string()));
        assert_eq!(decode_label(b"NO NAME    "), None);
        assert_eq!(decode_label(b"rootfs\0\0\0\0"), Some("rootfs".to_string()));
        assert_eq!(decode_label(&[0u8; 16]), None);
    }

    #[test]
    fn test_probed_filesystem_has_no_file_access() {
        let device: Arc<dyn BlockDevice> =
            Arc::new(ImageDevice::from_bytes("sda_0", vec![0u8; 512], 512).unwrap());
        let fs = ProbedFilesystem::new(
            "fat",
            device,
            VolumeInfo {
                variant: "FAT12".to_string(),
                label: None,
                allocation_unit: 512,
                total_bytes: 512,
            },
        );

        assert_eq!(fs.fs_name(), "fat");
        assert_eq!(fs.device().device_name(), "sda_0");
        assert!(matches!(fs.open("/a.txt"), Err(Error::Unsupported(_))));
        assert!(matches!(fs.list_directory("/"), Err(Error::Unsupported(_))));
        assert!(fs.close(FileHandle::new(1)).is_err());
    }
}
