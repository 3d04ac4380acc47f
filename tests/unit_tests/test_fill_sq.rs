// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bytes::Bytes;
use gbt_sim::engine::Engine;

use super::test_role;

#[test]
fn slices_payload_into_max_payload_chunks_with_lb_on_last() {
    let mut engine = Engine::new(test_role("Client", true, 63, 6));
    let payload = Bytes::from_static(b"abcdefghijklmnopqrstuvwxy"); // 25 bytes
    engine.fill_sq(&payload);

    let blocks = engine.sq_blocks_ascending();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0].bn, 1);
    assert!(!blocks[0].lb);
    assert_eq!(blocks[0].bd.as_deref(), Some(&b"abcdefghij"[..]));
    assert_eq!(blocks[1].bn, 2);
    assert!(!blocks[1].lb);
    assert_eq!(blocks[2].bn, 3);
    assert!(blocks[2].lb);
    assert_eq!(blocks[2].bd.as_deref(), Some(&b"uvwxy"[..]));
}

#[test]
fn single_block_when_payload_fits_in_one_chunk() {
    let mut engine = Engine::new(test_role("Client", true, 63, 6));
    let payload = Bytes::from_static(b"0123456789"); // exactly 10 bytes
    engine.fill_sq(&payload);

    let blocks = engine.sq_blocks_ascending();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].bn, 1);
    assert!(blocks[0].lb);
}

#[test]
fn empty_payload_creates_no_block() {
    let mut engine = Engine::new(test_role("Client", true, 63, 6));
    engine.fill_sq(&Bytes::new());

    assert!(engine.sq_blocks_ascending().is_empty());
}
