//! Shared test doubles for the scanner tests

use mbrscan_core::{BlockDevice, Error, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Build a 512-byte boot sector with a valid signature
///
/// Each entry is `(slot, type_code, start_block, block_count)`.
pub fn mbr_sector(entries: &[(usize, u8, u32, u32)]) -> Vec<u8> {
    let mut mbr = vec![0u8; 512];
    for &(slot, type_code, start, count) in entries {
        let offset = 0x1BE + slot * 16;
        mbr[offset + 4] = type_code;
        mbr[offset + 8..offset + 12].copy_from_slice(&start.to_le_bytes());
        mbr[offset + 12..offset + 16].copy_from_slice(&count.to_le_bytes());
    }
    mbr[0x1FE] = 0x55;
    mbr[0x1FF] = 0xAA;
    mbr
}

/// In-memory device that records every block address it is asked for
pub struct CountingDevice {
    name: String,
    data: Vec<u8>,
    block_size: AtomicU32,
    fail: bool,
    calls: Mutex<Vec<(u64, usize)>>,
}

impl CountingDevice {
    pub fn new(name: &str, data: Vec<u8>, block_size: u32) -> Self {
        Self {
            name: name.to_string(),
            data,
            block_size: AtomicU32::new(block_size),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A device whose every read errors
    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name, Vec::new(), 512)
        }
    }

    pub fn set_block_size(&self, block_size: u32) {
        self.block_size.store(block_size, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// `(start_block, requested_bytes)` of every read, in order
    pub fn calls(&self) -> Vec<(u64, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

impl BlockDevice for CountingDevice {
    fn device_name(&self) -> &str {
        &self.name
    }

    fn device_id(&self) -> &[u8] {
        self.name.as_bytes()
    }

    fn block_size(&self) -> u32 {
        self.block_size.load(Ordering::SeqCst)
    }

    fn driver_name(&self) -> &str {
        "counting"
    }

    fn read(&self, buf: &mut [u8], start_block: u64) -> Result<usize> {
        self.calls.lock().unwrap().push((start_block, buf.len()));
        if self.fail {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "medium error",
            )));
        }

        let offset = (start_block * self.block_size() as u64) as usize;
        if offset >= self.data.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.data.len() - offset);
        buf[..n].copy_from_slice(&self.data[offset..offset + n]);
        Ok(n)
    }
}
