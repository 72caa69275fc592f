//! Wire format encoding and decoding.
//!
//! Implements the 4-byte frame header:
//! ```text
//! ┌────────────────┬──────────────────────┐
//! │ Frame length   │ Payload              │
//! │ 4 bytes        │ (length - 4) bytes   │
//! │ uint32 BE      │                      │
//! └────────────────┴──────────────────────┘
//! ```
//!
//! The encoded length is the **total** framed size, header included. On the
//! wire a framed blob is delivered as one or more transport packets of at
//! most [`MAX_PACKET_SIZE`] bytes; packet boundaries are purely positional
//! and carry no per-packet header.

use crate::error::{BlobFrameError, Result};

/// Header size in bytes (fixed, exactly 4).
pub const HEADER_SIZE: usize = 4;

/// Maximum transport packet size in bytes.
pub const MAX_PACKET_SIZE: usize = 4096;

/// Default maximum decoded blob size (1 GiB).
pub const DEFAULT_MAX_BLOB_SIZE: usize = 1_073_741_824;

/// Largest payload a 4-byte header can represent.
pub const MAX_PAYLOAD_SIZE: usize = u32::MAX as usize - HEADER_SIZE;

/// Decoded frame header.
///
/// Carries the total framed length, header bytes included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Total framed length (header + payload) in bytes.
    pub frame_len: u32,
}

impl Header {
    /// Create a header for a payload of the given length.
    ///
    /// # Errors
    ///
    /// Returns [`BlobFrameError::BlobTooLarge`] when `4 + payload_len` does
    /// not fit in a `u32`.
    ///
    /// # Example
    ///
    /// ```
    /// use blobframe::protocol::Header;
    ///
    /// let header = Header::for_payload(10).unwrap();
    /// assert_eq!(header.frame_len, 14);
    /// ```
    pub fn for_payload(payload_len: usize) -> Result<Self> {
        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(BlobFrameError::BlobTooLarge {
                size: payload_len,
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(Self {
            frame_len: (HEADER_SIZE + payload_len) as u32,
        })
    }

    /// Encode the header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use blobframe::protocol::Header;
    ///
    /// let header = Header::for_payload(10).unwrap();
    /// assert_eq!(header.encode(), [0x00, 0x00, 0x00, 0x0E]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode the header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is smaller than `HEADER_SIZE` (4 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= HEADER_SIZE);
        buf[0..HEADER_SIZE].copy_from_slice(&self.frame_len.to_be_bytes());
    }

    /// Decode a header from bytes (Big Endian).
    ///
    /// Returns `None` if the buffer is too short.
    ///
    /// # Example
    ///
    /// ```
    /// use blobframe::protocol::Header;
    ///
    /// let header = Header::decode(&[0x00, 0x00, 0x00, 0x0E]).unwrap();
    /// assert_eq!(header.frame_len, 14);
    /// assert_eq!(header.payload_len(), 10);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            frame_len: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
        })
    }

    /// Payload length in bytes, i.e. the framed length minus the header.
    ///
    /// Saturates to zero for malformed headers that advertise fewer than 4
    /// bytes; [`Header::validate`] rejects those.
    #[inline]
    pub fn payload_len(&self) -> usize {
        (self.frame_len as usize).saturating_sub(HEADER_SIZE)
    }

    /// Validate the header against the framing rules.
    ///
    /// Checks:
    /// - the advertised length is at least `HEADER_SIZE` (a frame cannot be
    ///   shorter than the header it contains)
    /// - the advertised length does not exceed `max_blob_size`
    pub fn validate(&self, max_blob_size: usize) -> Result<()> {
        let advertised = self.frame_len as usize;

        if advertised < HEADER_SIZE {
            return Err(BlobFrameError::HeaderUnderflow { advertised });
        }

        if advertised > max_blob_size {
            return Err(BlobFrameError::FrameOverCap {
                advertised,
                cap: max_blob_size,
            });
        }

        Ok(())
    }
}
