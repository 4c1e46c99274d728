//! Partition scanning error types

use thiserror::Error;

/// The main error type for partition scanning and block access
#[derive(Error, Debug)]
pub enum Error {
    /// The parent device is unusable (zero block size, no name)
    #[error("Invalid parent device: {0}")]
    InvalidParent(String),

    /// The underlying device failed or returned a short read
    #[error("Read failure on {device}: {reason}")]
    ReadFailure {
        device: String,
        reason: String,
        /// The device's own error; absent for short reads
        #[source]
        source: Option<Box<Error>>,
    },

    /// Block 0 does not end in the 0x55 0xAA boot signature
    #[error("No valid MBR signature on {device} (bytes are {:02x} {:02x})", .found[0], .found[1])]
    NoSignature { device: String, found: [u8; 2] },

    /// Partition and parent disagree on block size
    #[error("Block size differs on {device} ({partition} vs {parent})")]
    BlockSizeMismatch {
        device: String,
        partition: u32,
        parent: u32,
    },

    /// A filesystem driver declined or failed to bind a device
    #[error("{driver} driver failed to initialise: {reason}")]
    DriverInitFailure { driver: String, reason: String },

    /// I/O error from a backing stream
    #[error("Device I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unusable block geometry
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Unsupported format or feature
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type alias for partition scanning operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid parent error
    pub fn invalid_parent(msg: impl Into<String>) -> Self {
        Error::InvalidParent(msg.into())
    }

    /// Create a read failure for the named device
    pub fn read_failure(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ReadFailure {
            device: device.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a read failure caused by an error from the device itself
    pub fn read_failure_from(
        device: impl Into<String>,
        reason: impl Into<String>,
        source: Error,
    ) -> Self {
        Error::ReadFailure {
            device: device.into(),
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a driver initialisation failure
    pub fn driver_init(driver: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::DriverInitFailure {
            driver: driver.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid geometry error
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Error::InvalidGeometry(msg.into())
    }

    /// Create an unsupported error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Error::InvalidOperation(msg.into())
    }

    /// True for the errors that abort a whole partition scan
    pub fn is_scan_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidParent(_) | Error::ReadFailure { .. } | Error::NoSignature { .. }
        )
    }
}
