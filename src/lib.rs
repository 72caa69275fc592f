//! # blobframe
//!
//! Length-prefixed blob framing over fixed-size transport packets.
//!
//! The encoder ([`FramedBlob`]) wraps an in-memory blob with a 4-byte
//! big-endian length header and exposes the result as a sequence of
//! transport packets of at most [`protocol::MAX_PACKET_SIZE`] bytes. The
//! decoder ([`BlobHandler`], wrapping [`protocol::Reassembler`]) is fed
//! arbitrary byte chunks from the transport and fires a completion callback
//! once per reassembled blob.
//!
//! ## Architecture
//!
//! ```text
//! producer ──► FramedBlob ──► transport ──► BlobHandler ──► callback
//!              (packets)      (chunks)      (reassembly)
//! ```
//!
//! The decoder is push-driven and synchronous: it never blocks, never reads,
//! and never fails out of `feed`. Chunk boundaries carry no meaning - a blob
//! may arrive split across many feeds or packed together with its neighbors
//! in one.
//!
//! ## Example
//!
//! ```
//! use blobframe::{BlobHandler, FramedBlob};
//!
//! let framed = FramedBlob::new(b"hello, wire").unwrap();
//!
//! let mut handler = BlobHandler::new(move |id, blob| {
//!     assert_eq!(blob, b"hello, wire");
//!     println!("blob {id}: {} bytes", blob.len());
//! });
//!
//! for packet in framed.packets() {
//!     handler.feed(packet);
//! }
//! ```

pub mod error;
pub mod protocol;

mod handler;

pub use error::{BlobFrameError, Result};
pub use handler::BlobHandler;
pub use protocol::{FramedBlob, Reassembler, ReassemblerConfig};
