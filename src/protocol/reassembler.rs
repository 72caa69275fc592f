//! Reassembler - push-driven decoder for framed blobs.
//!
//! A [`Reassembler`] is fed arbitrary byte chunks and rebuilds the blobs a
//! [`FramedBlob`](super::FramedBlob) producer framed, whatever the chunk
//! boundaries: one blob split across many feeds, several blobs concatenated
//! into one feed, or any mixture. Bytes are staged through a fixed
//! [`MAX_PACKET_SIZE`] packet buffer and committed into the blob buffer in
//! arrival order; a completion callback fires once per reassembled blob,
//! inline on the feeding thread, before `feed` returns.
//!
//! Implements a state machine for the decode:
//! - `AwaitHeader`: staging the 4-byte length prefix (partial headers are
//!   buffered, never read past the chunk)
//! - `Accumulating`: committing packet-sized strides into the blob buffer
//! - `Quiesced`: a malformed or oversize header was seen; input is dropped
//!   until [`reset`](Reassembler::reset)
//!
//! [`feed`](Reassembler::feed) never blocks and never fails; rejection
//! surfaces through the quiesced state and
//! [`last_error`](Reassembler::last_error).

use std::fmt;

use bytes::BytesMut;
use tracing::{debug, trace, warn};

use super::wire_format::{Header, DEFAULT_MAX_BLOB_SIZE, HEADER_SIZE, MAX_PACKET_SIZE};
use crate::error::BlobFrameError;

/// Completion callback: correlation id plus the reassembled blob.
///
/// The blob slice is owned by the reassembler and valid only for the
/// duration of the call; consumers that need to retain it must copy.
pub type BlobCallback = Box<dyn FnMut(u32, &[u8]) + Send>;

/// Configuration for a [`Reassembler`].
#[derive(Debug, Clone)]
pub struct ReassemblerConfig {
    /// If true, delivered blobs retain the 4-byte length prefix; if false,
    /// it is stripped before delivery.
    pub keep_header: bool,
    /// Largest advertised frame accepted at header parse. Anything bigger
    /// is refused before allocation and quiesces the reassembler.
    pub max_blob_size: usize,
}

impl Default for ReassemblerConfig {
    fn default() -> Self {
        Self {
            keep_header: false,
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
        }
    }
}

/// Decode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Staging the 4 header bytes of the next blob.
    AwaitHeader,
    /// Header parsed, committing packets into the blob buffer.
    Accumulating,
    /// Rejected a header; dropping input until reset.
    Quiesced,
}

/// Stateful decoder that rebuilds blobs from a packetized byte stream.
///
/// Single-threaded and synchronous: all work happens on the caller's thread
/// inside [`feed`](Reassembler::feed). The type is `Send` but not `Sync`;
/// one instance decodes one stream. Reentrant feeds from inside the
/// completion callback are impossible by construction - the reassembler is
/// mutably borrowed for the duration of `feed`.
pub struct Reassembler {
    state: State,
    /// Staged header bytes; only meaningful in `AwaitHeader`.
    header_buf: [u8; HEADER_SIZE],
    header_len: usize,
    /// Destination for the blob being rebuilt. Capacity is reused across
    /// blobs; new bytes are zero-filled on each header parse.
    blob_buffer: BytesMut,
    blob_size: usize,
    blob_offset: usize,
    /// Fixed staging buffer for the packet in flight. Allocated once.
    packet_buffer: Box<[u8; MAX_PACKET_SIZE]>,
    packet_offset: usize,
    /// Packets fully committed to the blob buffer.
    packet_index: usize,
    /// Expected packet count, derived from `blob_size` by truncating
    /// division. An undercount is harmless: completion is keyed on byte
    /// count and packet sizing is clamped to the remaining blob.
    total_packets: usize,
    id: u32,
    config: ReassemblerConfig,
    last_error: Option<BlobFrameError>,
    callback: BlobCallback,
}

impl Reassembler {
    /// Create a reassembler that delivers blobs to `callback`.
    pub fn new<F>(config: ReassemblerConfig, callback: F) -> Self
    where
        F: FnMut(u32, &[u8]) + Send + 'static,
    {
        Self {
            state: State::AwaitHeader,
            header_buf: [0u8; HEADER_SIZE],
            header_len: 0,
            blob_buffer: BytesMut::new(),
            blob_size: 0,
            blob_offset: 0,
            packet_buffer: Box::new([0u8; MAX_PACKET_SIZE]),
            packet_offset: 0,
            packet_index: 0,
            total_packets: 0,
            id: 0,
            config,
            last_error: None,
            callback: Box::new(callback),
        }
    }

    /// Set the correlation id echoed to the completion callback.
    ///
    /// May be called at any time; in-progress state is untouched.
    #[inline]
    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    /// The current correlation id.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The configuration this reassembler was built with.
    #[inline]
    pub fn config(&self) -> &ReassemblerConfig {
        &self.config
    }

    /// True when no blob is in progress and no header bytes are staged.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == State::AwaitHeader && self.header_len == 0
    }

    /// True when a rejected header has quiesced the reassembler.
    #[inline]
    pub fn is_quiesced(&self) -> bool {
        self.state == State::Quiesced
    }

    /// The error that quiesced the reassembler, if any.
    ///
    /// Cleared by [`reset`](Reassembler::reset).
    #[inline]
    pub fn last_error(&self) -> Option<&BlobFrameError> {
        self.last_error.as_ref()
    }

    /// Return to idle, discarding any partial blob.
    ///
    /// Clears the quiesced state and [`last_error`](Reassembler::last_error).
    /// Buffer allocations are kept. Idempotent.
    pub fn reset(&mut self) {
        if self.state == State::Accumulating && self.blob_offset < self.blob_size {
            debug!(
                received = self.blob_offset,
                expected = self.blob_size,
                "discarding partial blob on reset"
            );
        }
        self.last_error = None;
        self.clear_blob();
    }

    /// Ingest an arbitrary-length chunk of the byte stream.
    ///
    /// Never blocks, never fails. The completion callback may fire zero or
    /// more times before this returns; any bytes following a completed blob
    /// are consumed as the start of the next one.
    pub fn feed(&mut self, data: &[u8]) {
        let mut input = data;

        while !input.is_empty() {
            match self.state {
                State::Quiesced => {
                    trace!(dropped = input.len(), "quiesced, dropping input");
                    return;
                }

                State::AwaitHeader => {
                    let take = (HEADER_SIZE - self.header_len).min(input.len());
                    self.header_buf[self.header_len..self.header_len + take]
                        .copy_from_slice(&input[..take]);
                    self.header_len += take;
                    input = &input[take..];

                    if self.header_len == HEADER_SIZE {
                        if let Err(err) = self.begin_blob() {
                            warn!(%err, "rejecting frame at header parse");
                            self.last_error = Some(err);
                            self.state = State::Quiesced;
                            return;
                        }
                    }
                }

                State::Accumulating => {
                    let stride = input.len().min(MAX_PACKET_SIZE);
                    let consumed = self.stage(&input[..stride]);
                    input = &input[consumed..];
                }
            }
        }
    }

    /// Parse the staged header and open a new blob.
    fn begin_blob(&mut self) -> Result<(), BlobFrameError> {
        let header = Header::decode(&self.header_buf).expect("header buffer is full");
        header.validate(self.config.max_blob_size)?;

        let blob_size = if self.config.keep_header {
            header.frame_len as usize
        } else {
            header.payload_len()
        };

        self.header_len = 0;
        self.blob_size = blob_size;
        self.blob_offset = 0;
        self.packet_index = 0;
        self.packet_offset = 0;
        self.total_packets = blob_size / MAX_PACKET_SIZE;

        // Reuses the previous allocation when it is large enough; the
        // resized region is zero-filled.
        self.blob_buffer.clear();
        self.blob_buffer.resize(blob_size, 0);

        self.state = State::Accumulating;
        trace!(
            blob_size,
            total_packets = self.total_packets,
            keep_header = self.config.keep_header,
            "header parsed"
        );

        if self.config.keep_header {
            // The header bytes are part of the delivered blob; seed the
            // packet buffer with them.
            self.packet_buffer[..HEADER_SIZE].copy_from_slice(&self.header_buf);
            self.packet_offset = HEADER_SIZE;
        }

        // Frames with nothing left to receive complete without more input.
        self.stage(&[]);
        Ok(())
    }

    /// Stage one stride of input toward the current packet.
    ///
    /// Returns the number of bytes consumed from `chunk`. When the stride
    /// finishes the packet, it is committed to the blob buffer; unconsumed
    /// bytes are left for the caller's dispatch loop.
    fn stage(&mut self, chunk: &[u8]) -> usize {
        debug_assert!(chunk.len() <= MAX_PACKET_SIZE);
        debug_assert_eq!(self.state, State::Accumulating);

        let remaining_blob = self.blob_size - self.blob_offset;

        let packet_size = if self.packet_index == 0
            && self.blob_size > MAX_PACKET_SIZE - HEADER_SIZE
        {
            // First packet of a multi-packet blob: the header occupied four
            // of its wire bytes.
            if self.config.keep_header {
                MAX_PACKET_SIZE
            } else {
                MAX_PACKET_SIZE - HEADER_SIZE
            }
        } else if self.packet_index >= self.total_packets {
            remaining_blob
        } else {
            MAX_PACKET_SIZE
        };
        // Clamp so neither buffer can be overrun, whatever the header claimed.
        let packet_size = packet_size.min(remaining_blob).min(MAX_PACKET_SIZE);

        let bytes_to_finish = packet_size.saturating_sub(self.packet_offset);
        let bytes_to_copy = chunk.len().min(bytes_to_finish);
        let packet_received = chunk.len() >= bytes_to_finish;

        self.packet_buffer[self.packet_offset..self.packet_offset + bytes_to_copy]
            .copy_from_slice(&chunk[..bytes_to_copy]);
        self.packet_offset += bytes_to_copy;

        debug_assert!(self.packet_offset <= MAX_PACKET_SIZE);

        if packet_received {
            self.commit_packet(packet_size);
        }

        bytes_to_copy
    }

    /// Commit the staged packet into the blob buffer and complete the blob
    /// once every expected byte has arrived.
    fn commit_packet(&mut self, packet_size: usize) {
        debug_assert!(self.blob_offset + packet_size <= self.blob_size);

        self.blob_buffer[self.blob_offset..self.blob_offset + packet_size]
            .copy_from_slice(&self.packet_buffer[..packet_size]);
        self.blob_offset += packet_size;
        self.clear_packet_buffer();
        self.packet_index += 1;

        if self.blob_offset == self.blob_size {
            self.complete_blob();
        }
    }

    /// Deliver the finished blob and return to idle.
    fn complete_blob(&mut self) {
        trace!(id = self.id, size = self.blob_size, "blob complete");
        // The callback borrows the blob only for the duration of the call;
        // counters are cleared afterwards.
        (self.callback)(self.id, &self.blob_buffer[..self.blob_size]);
        self.clear_blob();
    }

    fn clear_packet_buffer(&mut self) {
        self.packet_buffer.fill(0);
        self.packet_offset = 0;
    }

    fn clear_blob(&mut self) {
        self.blob_size = 0;
        self.blob_offset = 0;
        self.packet_index = 0;
        self.total_packets = 0;
        self.header_len = 0;
        self.clear_packet_buffer();
        self.state = State::AwaitHeader;
    }

    /// Get the current state for debugging.
    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::AwaitHeader => "AwaitHeader",
            State::Accumulating => "Accumulating",
            State::Quiesced => "Quiesced",
        }
    }
}

impl fmt::Debug for Reassembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reassembler")
            .field("state", &self.state)
            .field("id", &self.id)
            .field("blob_size", &self.blob_size)
            .field("blob_offset", &self.blob_offset)
            .field("packet_index", &self.packet_index)
            .field("total_packets", &self.total_packets)
            .field("packet_offset", &self.packet_offset)
            .field("keep_header", &self.config.keep_header)
            .finish_non_exhaustive()
    }
}
