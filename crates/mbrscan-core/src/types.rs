//! Core value types shared by devices and filesystems

use serde::{Deserialize, Serialize};
use std::fmt;

/// An entry returned by a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupantInfo {
    /// Name of the file or directory
    pub name: String,

    /// True if this is a directory, false if it's a file
    pub is_directory: bool,

    /// Size in bytes (0 for directories)
    pub size: u64,
}

/// Opaque handle to an open file, issued by a [`crate::Filesystem`]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct FileHandle(u64);

impl FileHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Volume parameters a driver reads while binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInfo {
    /// Variant within the filesystem family (e.g. "FAT16", "ext2 rev 1")
    pub variant: String,

    /// Volume label, if the filesystem records one
    pub label: Option<String>,

    /// Allocation unit (cluster/block) size in bytes
    pub allocation_unit: u64,

    /// Total size of the volume in bytes
    pub total_bytes: u64,
}

impl fmt::Display for VolumeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.variant)?;
        if let Some(ref label) = self.label {
            write!(f, " \"{}\"", label)?;
        }
        write!(
            f,
            ", {} in {} units",
            format_size(self.total_bytes),
            format_size(self.allocation_unit)
        )
    }
}

/// Format size in human-readable format
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536 * 1024), "1.50 MB");
    }

    #[test]
    fn test_volume_info_display() {
        let volume = VolumeInfo {
            variant: "FAT16".to_string(),
            label: Some("BOOT".to_string()),
            allocation_unit: 2048,
            total_bytes: 1024 * 1024,
        };
        assert_eq!(volume.to_string(), "FAT16 \"BOOT\", 1.00 MB in 2.00 KB units");
    }
}
