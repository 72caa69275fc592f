//! Integration tests for blobframe.
//!
//! These tests drive the framer and the handler together through the
//! public API, the way a transport would.

use std::sync::{Arc, Mutex};

use blobframe::protocol::{HEADER_SIZE, MAX_PACKET_SIZE};
use blobframe::{BlobFrameError, BlobHandler, FramedBlob, ReassemblerConfig};

type Sink = Arc<Mutex<Vec<(u32, Vec<u8>)>>>;

fn handler_with_sink(config: ReassemblerConfig) -> (Sink, BlobHandler) {
    let sink: Sink = Arc::new(Mutex::new(Vec::new()));
    let cb_sink = Arc::clone(&sink);
    let handler = BlobHandler::with_config(config, move |id, blob: &[u8]| {
        cb_sink.lock().unwrap().push((id, blob.to_vec()));
    });
    (sink, handler)
}

fn stripping_handler() -> (Sink, BlobHandler) {
    handler_with_sink(ReassemblerConfig::default())
}

/// Frame a blob and feed it packet by packet; the callback gets it back.
#[test]
fn test_round_trip_over_packets() {
    for size in [1usize, 10, 100, 4091, 4092, 4093, 5000, 8192, 20_000] {
        let payload: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        let framed = FramedBlob::new(&payload).unwrap();

        let (sink, mut handler) = stripping_handler();
        for packet in framed.packets() {
            assert!(packet.len() <= MAX_PACKET_SIZE);
            handler.feed(packet);
        }

        let delivered = sink.lock().unwrap();
        assert_eq!(delivered.len(), 1, "payload of {size} bytes");
        assert_eq!(delivered[0].1, payload, "payload of {size} bytes");
    }
}

/// A 10-byte blob fed in one call.
#[test]
fn test_small_blob_single_feed() {
    let payload: Vec<u8> = (0x01..=0x0A).collect();
    let framed = FramedBlob::new(&payload).unwrap();
    assert_eq!(&framed.as_bytes()[..HEADER_SIZE], &[0x00, 0x00, 0x00, 0x0E]);

    let (sink, mut handler) = stripping_handler();
    handler.feed(framed.as_bytes());

    let delivered = sink.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].1, payload);
}

/// The same blob fed one byte at a time produces the identical delivery.
#[test]
fn test_small_blob_byte_by_byte() {
    let payload: Vec<u8> = (0x01..=0x0A).collect();
    let framed = FramedBlob::new(&payload).unwrap();

    let (sink, mut handler) = stripping_handler();
    for byte in framed.as_bytes() {
        handler.feed(std::slice::from_ref(byte));
    }

    let delivered = sink.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].1, payload);
}

/// A 5000-byte blob crosses the packet boundary: 4096 + 908 wire bytes.
#[test]
fn test_two_packet_blob() {
    let payload = vec![0xAB; 5000];
    let framed = FramedBlob::new(&payload).unwrap();
    assert_eq!(framed.len(), 5004);

    let packets: Vec<_> = framed.packets().collect();
    assert_eq!(packets.len(), 2);
    assert_eq!(packets[0].len(), 4096);
    assert_eq!(packets[1].len(), 908);

    let (sink, mut handler) = stripping_handler();
    handler.feed(packets[0]);
    assert!(sink.lock().unwrap().is_empty());
    handler.feed(packets[1]);

    let delivered = sink.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].1, payload);
}

/// Two framed blobs concatenated into one 58-byte feed arrive in order.
#[test]
fn test_concatenated_blobs() {
    let first = vec![0x11; 20];
    let second = vec![0x22; 30];

    let mut wire = Vec::new();
    wire.extend_from_slice(FramedBlob::new(&first).unwrap().as_bytes());
    wire.extend_from_slice(FramedBlob::new(&second).unwrap().as_bytes());
    assert_eq!(wire.len(), 58);

    let (sink, mut handler) = stripping_handler();
    handler.feed(&wire);

    let delivered = sink.lock().unwrap();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].1, first);
    assert_eq!(delivered[1].1, second);
}

/// An empty payload frames to a bare header and is suppressed when the
/// header is stripped.
#[test]
fn test_empty_payload_suppressed() {
    let framed = FramedBlob::new(&[]).unwrap();
    assert_eq!(framed.as_bytes(), &[0x00, 0x00, 0x00, 0x04]);

    let (sink, mut handler) = stripping_handler();
    handler.feed(framed.as_bytes());

    assert!(sink.lock().unwrap().is_empty());
    assert!(handler.is_idle());
}

/// With the header kept, the delivery is the framed bytes themselves.
#[test]
fn test_keep_header_round_trip() {
    let payload = vec![0x3C; 6000];
    let framed = FramedBlob::new(&payload).unwrap();

    let config = ReassemblerConfig {
        keep_header: true,
        ..ReassemblerConfig::default()
    };
    let (sink, mut handler) = handler_with_sink(config);
    for packet in framed.packets() {
        handler.feed(packet);
    }

    let delivered = sink.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].1, framed.as_bytes());
}

/// The handler keeps working across blobs with no residue from earlier
/// deliveries.
#[test]
fn test_reuse_after_large_blob() {
    let big = vec![0xAB; 5000];
    let small: Vec<u8> = (0..16).collect();

    let (sink, mut handler) = stripping_handler();
    for packet in FramedBlob::new(&big).unwrap().packets() {
        handler.feed(packet);
    }
    for packet in FramedBlob::new(&small).unwrap().packets() {
        handler.feed(packet);
    }

    let delivered = sink.lock().unwrap();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].1, big);
    assert_eq!(delivered[1].1, small);
}

/// Correlation ids tag deliveries per stream.
#[test]
fn test_id_correlation() {
    let (sink, mut handler) = stripping_handler();

    handler.set_id(10);
    handler.feed(FramedBlob::new(b"first").unwrap().as_bytes());
    handler.set_id(20);
    handler.feed(FramedBlob::new(b"second").unwrap().as_bytes());

    let delivered = sink.lock().unwrap();
    assert_eq!(delivered[0].0, 10);
    assert_eq!(delivered[1].0, 20);
}

/// An oversize frame quiesces the handler; reset restores service and the
/// rejection is readable out-of-band.
#[test]
fn test_oversize_frame_rejected_and_recovered() {
    let config = ReassemblerConfig {
        keep_header: false,
        max_blob_size: 1024,
    };
    let (sink, mut handler) = handler_with_sink(config);

    handler.feed(FramedBlob::new(&vec![0u8; 4096]).unwrap().as_bytes());
    assert!(handler.is_quiesced());
    assert!(matches!(
        handler.last_error(),
        Some(BlobFrameError::FrameOverCap { .. })
    ));
    assert!(sink.lock().unwrap().is_empty());

    // Anything fed while quiesced is dropped.
    handler.feed(FramedBlob::new(b"lost").unwrap().as_bytes());
    assert!(sink.lock().unwrap().is_empty());

    handler.reset();
    handler.feed(FramedBlob::new(b"recovered").unwrap().as_bytes());

    let delivered = sink.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].1, b"recovered");
}

/// A stream cut mid-blob is abandoned with reset; the next stream decodes
/// cleanly.
#[test]
fn test_reset_abandons_truncated_stream() {
    let (sink, mut handler) = stripping_handler();
    let truncated = FramedBlob::new(&vec![0x77; 900]).unwrap();

    handler.feed(&truncated.as_bytes()[..300]);
    handler.reset();

    let payload = b"fresh stream".to_vec();
    handler.feed(FramedBlob::new(&payload).unwrap().as_bytes());

    let delivered = sink.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].1, payload);
}
