//! Error types for blobframe.

use thiserror::Error;

/// Main error type for all blobframe operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobFrameError {
    /// Payload too large to frame: the 4-byte header cannot represent it.
    #[error("blob of {size} bytes cannot be framed (maximum {max})")]
    BlobTooLarge { size: usize, max: usize },

    /// Advertised frame size exceeds the configured cap.
    #[error("advertised frame of {advertised} bytes exceeds cap of {cap}")]
    FrameOverCap { advertised: usize, cap: usize },

    /// Advertised frame size is smaller than the header it must contain.
    #[error("advertised frame of {advertised} bytes is shorter than the 4-byte header")]
    HeaderUnderflow { advertised: usize },
}

/// Result type alias using BlobFrameError.
pub type Result<T> = std::result::Result<T, BlobFrameError>;
