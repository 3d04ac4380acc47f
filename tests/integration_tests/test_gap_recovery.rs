// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use gbt_sim::cfg::config::Invoker;

use super::{role, run_scenario};

/// 100-byte payload (10 blocks), server BTW=6, and the server's very first
/// inbound message dropped — the canonical gap-recovery exercise: the
/// server's RQ has a hole at BN=1, `CheckRQandFillGaps` reports the gap via
/// `Wself`, and the client retransmits starting from BN=1 once it learns
/// the server's window shrank.
#[tokio::test]
async fn first_block_dropped_at_server_is_recovered_via_gap_fill() {
    let payload: String = ('a'..='z').cycle().take(100).collect();
    let outcome = run_scenario(
        Invoker::Client,
        &payload,
        role(63, 10.0, true, vec![]),
        role(6, 5.0, false, vec![0]),
        Duration::from_secs(2),
    )
    .await
    .expect("scenario should still converge after recovering the dropped block");

    assert_eq!(outcome.client, Some("finished_sending"));
    assert_eq!(outcome.server, Some("finished_receiving"));
    assert_eq!(
        outcome.server_received.as_deref(),
        Some(payload.as_bytes()),
        "gap recovery must still deliver the exact payload the client sent"
    );
}
