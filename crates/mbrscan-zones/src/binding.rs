//! Filesystem driver binding
//!
//! Maps partition type codes to the driver family that may claim the
//! partition, then runs that driver's initialiser.

use mbrscan_core::{BlockDevice, Error, Filesystem, FilesystemDriver};
use std::sync::Arc;

/// The driver family a type code is dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// FAT12/16/32, including the hidden variants
    Fat,
    /// ext2 and its successors (Linux native)
    Ext2,
    /// No driver; the partition stays available for raw block access
    NoDriver,
}

/// Type code dispatch table, in lookup order
pub const DRIVER_TABLE: &[(u8, DriverKind)] = &[
    (0x01, DriverKind::Fat),
    (0x04, DriverKind::Fat),
    (0x06, DriverKind::Fat),
    (0x0B, DriverKind::Fat),
    (0x0C, DriverKind::Fat),
    (0x0E, DriverKind::Fat),
    (0x11, DriverKind::Fat),
    (0x14, DriverKind::Fat),
    (0x1B, DriverKind::Fat),
    (0x1C, DriverKind::Fat),
    (0x1E, DriverKind::Fat),
    (0x83, DriverKind::Ext2),
];

/// Look up the driver family for a partition type code
pub fn driver_for(type_code: u8) -> DriverKind {
    DRIVER_TABLE
        .iter()
        .find(|(code, _)| *code == type_code)
        .map(|(_, kind)| *kind)
        .unwrap_or(DriverKind::NoDriver)
}

/// The filesystem initialisers available to a scan
///
/// A missing initialiser behaves like one that always declines.
#[derive(Clone, Default)]
pub struct DriverSet {
    fat: Option<Arc<dyn FilesystemDriver>>,
    ext2: Option<Arc<dyn FilesystemDriver>>,
}

impl DriverSet {
    /// A driver set with no initialisers; every partition stays unbound
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `driver` for FAT-family partitions
    pub fn with_fat(mut self, driver: Arc<dyn FilesystemDriver>) -> Self {
        self.fat = Some(driver);
        self
    }

    /// Use `driver` for ext2-family partitions
    pub fn with_ext2(mut self, driver: Arc<dyn FilesystemDriver>) -> Self {
        self.ext2 = Some(driver);
        self
    }

    /// The initialiser registered for a driver family
    pub fn driver(&self, kind: DriverKind) -> Option<&Arc<dyn FilesystemDriver>> {
        match kind {
            DriverKind::Fat => self.fat.as_ref(),
            DriverKind::Ext2 => self.ext2.as_ref(),
            DriverKind::NoDriver => None,
        }
    }
}

/// Try to bind a filesystem to `device` according to its type code
///
/// Returns `None` when no driver handles the code, no initialiser is
/// registered, or the initialiser fails. Failures are logged and absorbed;
/// the device stays usable either way.
pub fn bind(
    device: &Arc<dyn BlockDevice>,
    type_code: u8,
    drivers: &DriverSet,
) -> Option<Arc<dyn Filesystem>> {
    let kind = driver_for(type_code);
    let Some(driver) = drivers.driver(kind) else {
        tracing::debug!(
            "MBR: no filesystem driver for {} (type 0x{:02x}, {:?})",
            device.device_name(),
            type_code,
            kind
        );
        return None;
    };

    let result = driver.init(Arc::clone(device)).and_then(|fs| {
        if Arc::ptr_eq(fs.device(), device) {
            Ok(fs)
        } else {
            Err(Error::driver_init(
                driver.name(),
                format!(
                    "returned a filesystem bound to {} instead of {}",
                    fs.device().device_name(),
                    device.device_name()
                ),
            ))
        }
    });

    match result {
        Ok(fs) => {
            tracing::debug!(
                "MBR: {} driver bound {} to {}",
                driver.name(),
                fs.fs_name(),
                device.device_name()
            );
            Some(fs)
        }
        Err(e) => {
            tracing::warn!(
                "MBR: {} driver did not bind {}: {}",
                driver.name(),
                device.device_name(),
                e
            );
            None
        }
    }
}
