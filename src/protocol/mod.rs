//! Protocol module - wire format, framing, and reassembly.
//!
//! This module implements the packetized framing protocol:
//! - 4-byte big-endian length header encoding/decoding
//! - Framer producing fixed-size transport packets from a blob
//! - Reassembler rebuilding blobs from an arbitrarily chunked stream

mod framer;
mod reassembler;
mod wire_format;

pub use framer::{FramedBlob, Packets};
pub use reassembler::{BlobCallback, Reassembler, ReassemblerConfig};
pub use wire_format::{
    Header, DEFAULT_MAX_BLOB_SIZE, HEADER_SIZE, MAX_PACKET_SIZE, MAX_PAYLOAD_SIZE,
};
