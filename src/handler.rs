//! Blob handler - the user-facing codec handle.
//!
//! [`BlobHandler`] owns a single [`Reassembler`] and adapts its completion
//! path: zero-length blobs (header-only frames in stripping mode) are
//! swallowed instead of reaching the user callback. Everything else is a
//! straight passthrough.
//!
//! # Example
//!
//! ```
//! use blobframe::{BlobHandler, FramedBlob};
//!
//! let mut handler = BlobHandler::new(|id, blob| {
//!     println!("blob {id}: {} bytes", blob.len());
//! });
//!
//! handler.set_id(42);
//! let framed = FramedBlob::new(b"payload").unwrap();
//! for packet in framed.packets() {
//!     handler.feed(packet);
//! }
//! ```

use crate::error::BlobFrameError;
use crate::protocol::{Reassembler, ReassemblerConfig};

/// Owning handle around one [`Reassembler`].
///
/// Movable between threads (the callback must be `Send`); not clonable - an
/// in-flight decode has exactly one owner.
#[derive(Debug)]
pub struct BlobHandler {
    reassembler: Reassembler,
}

impl BlobHandler {
    /// Create a handler with the default configuration (header stripped,
    /// 1 GiB frame cap).
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(u32, &[u8]) + Send + 'static,
    {
        Self::with_config(ReassemblerConfig::default(), callback)
    }

    /// Create a handler with an explicit configuration.
    pub fn with_config<F>(config: ReassemblerConfig, mut callback: F) -> Self
    where
        F: FnMut(u32, &[u8]) + Send + 'static,
    {
        // Empty deliveries stop here; the callback only sees real payloads.
        let reassembler = Reassembler::new(config, move |id, blob: &[u8]| {
            if !blob.is_empty() {
                callback(id, blob);
            }
        });
        Self { reassembler }
    }

    /// Set the correlation id echoed to the callback.
    #[inline]
    pub fn set_id(&mut self, id: u32) {
        self.reassembler.set_id(id);
    }

    /// The current correlation id.
    #[inline]
    pub fn id(&self) -> u32 {
        self.reassembler.id()
    }

    /// Return the decoder to idle, discarding any partial blob.
    #[inline]
    pub fn reset(&mut self) {
        self.reassembler.reset();
    }

    /// Ingest a chunk of the byte stream; see [`Reassembler::feed`].
    #[inline]
    pub fn feed(&mut self, data: &[u8]) {
        self.reassembler.feed(data);
    }

    /// True when no blob is in progress.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.reassembler.is_idle()
    }

    /// True when a rejected header has quiesced the decoder.
    #[inline]
    pub fn is_quiesced(&self) -> bool {
        self.reassembler.is_quiesced()
    }

    /// The error that quiesced the decoder, if any.
    #[inline]
    pub fn last_error(&self) -> Option<&BlobFrameError> {
        self.reassembler.last_error()
    }
}
