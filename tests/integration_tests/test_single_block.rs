// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use gbt_sim::cfg::config::Invoker;

use super::{role, run_scenario};

/// A 10-byte payload fits in exactly one block (`max_payload` is 10 in
/// `run_scenario`): the simplest possible non-empty transfer.
#[tokio::test]
async fn single_full_sized_block_completes() {
    let outcome = run_scenario(
        Invoker::Client,
        "0123456789",
        role(63, 10.0, true, vec![]),
        role(6, 5.0, false, vec![]),
        Duration::from_secs(2),
    )
    .await
    .expect("scenario should converge");

    assert_eq!(outcome.client, Some("finished_sending"));
    assert_eq!(outcome.server, Some("finished_receiving"));
    assert_eq!(
        outcome.server_received.as_deref(),
        Some(b"0123456789".as_slice()),
        "reassembled payload must equal what the client sent"
    );
}
