//! Framer - wraps a blob for packetized transport.
//!
//! A [`FramedBlob`] is the payload prefixed with its 4-byte big-endian total
//! length, built in a single allocation. [`FramedBlob::packets`] walks the
//! framed buffer in strides of [`MAX_PACKET_SIZE`] so a transport can send
//! it as fixed-size packets; the concatenation of the packets equals the
//! framed buffer byte-for-byte.
//!
//! # Example
//!
//! ```
//! use blobframe::protocol::{FramedBlob, HEADER_SIZE};
//!
//! let framed = FramedBlob::new(b"hello").unwrap();
//! assert_eq!(framed.len(), HEADER_SIZE + 5);
//! assert_eq!(framed.packets().count(), 1);
//! ```

use bytes::Bytes;

use super::wire_format::{Header, HEADER_SIZE, MAX_PACKET_SIZE};
use crate::error::Result;

/// A blob wrapped in the wire framing: 4-byte length header plus payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedBlob {
    buf: Bytes,
}

impl FramedBlob {
    /// Frame a payload, copying it into a single contiguous buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BlobTooLarge`](crate::BlobFrameError::BlobTooLarge) when
    /// the framed length would not fit in the 4-byte header.
    pub fn new(payload: &[u8]) -> Result<Self> {
        let header = Header::for_payload(payload.len())?;
        let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
        buf.extend_from_slice(&header.encode());
        buf.extend_from_slice(payload);
        Ok(Self {
            buf: Bytes::from(buf),
        })
    }

    /// Total framed length (header + payload) in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// A framed blob is never empty; it always carries its header.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Payload length in bytes.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.buf.len() - HEADER_SIZE
    }

    /// Number of transport packets [`packets`](Self::packets) will yield.
    #[inline]
    pub fn packet_count(&self) -> usize {
        self.buf.len().div_ceil(MAX_PACKET_SIZE)
    }

    /// The framed bytes: header followed by payload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the frame, handing the buffer off without copying.
    #[inline]
    pub fn into_bytes(self) -> Bytes {
        self.buf
    }

    /// Iterate over the transport packets of this frame.
    ///
    /// Packets are slices of the framed buffer of at most
    /// [`MAX_PACKET_SIZE`] bytes; only the final packet may be shorter.
    pub fn packets(&self) -> Packets<'_> {
        Packets {
            remaining: &self.buf,
            emitted: 0,
        }
    }
}

/// Iterator over the transport packets of a [`FramedBlob`].
#[derive(Debug, Clone)]
pub struct Packets<'a> {
    remaining: &'a [u8],
    emitted: usize,
}

impl<'a> Packets<'a> {
    /// Bytes handed out so far.
    #[inline]
    pub fn bytes_emitted(&self) -> usize {
        self.emitted
    }
}

impl<'a> Iterator for Packets<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.remaining.is_empty() {
            return None;
        }
        let take = self.remaining.len().min(MAX_PACKET_SIZE);
        let (packet, rest) = self.remaining.split_at(take);
        self.remaining = rest;
        self.emitted += take;
        Some(packet)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.remaining.len().div_ceil(MAX_PACKET_SIZE);
        (left, Some(left))
    }
}

impl<'a> ExactSizeIterator for Packets<'a> {}
