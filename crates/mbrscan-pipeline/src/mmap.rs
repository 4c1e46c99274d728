//! Memory-mapped image backing for positional reads

use mbrscan_core::MAX_MMAP_SIZE;
use memmap2::Mmap;
use std::fs::File;
use std::io;

/// A read-only memory map of an image file.
///
/// Reads are positional (`read_at`) and take `&self`, so any number of
/// partition devices can share one mapping without a lock.
pub struct MmapPipeline {
    mmap: Mmap,
}

impl MmapPipeline {
    /// Map an already opened image file
    ///
    /// # Errors
    ///
    /// Fails for anything that is not a regular file, for files above
    /// [`MAX_MMAP_SIZE`], and when the OS refuses the mapping.
    ///
    /// # Safety
    ///
    /// Uses `unsafe` for memory mapping. The mapping is read-only and the file
    /// is checked to be a regular file first; the image must not be truncated
    /// while mapped (caller responsibility).
    pub fn from_file(file: &File) -> io::Result<Self> {
        let metadata = file.metadata()?;

        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Only regular files can be memory-mapped",
            ));
        }

        if metadata.len() > MAX_MMAP_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "File size {} exceeds memory mapping limit {} (16 GB)",
                    metadata.len(),
                    MAX_MMAP_SIZE
                ),
            ));
        }

        // SAFETY: regular file, bounded size, valid descriptor, read-only map
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self { mmap })
    }

    /// Get the length of the mapped region
    pub fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    /// Copy bytes starting at `offset` into `buf`
    ///
    /// Returns how many bytes were copied; 0 at or past the end of the map.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        if offset >= self.len() {
            return 0;
        }

        let start = offset as usize;
        let to_read = buf.len().min(self.mmap.len() - start);
        buf[..to_read].copy_from_slice(&self.mmap[start..start + to_read]);
        to_read
    }
}
