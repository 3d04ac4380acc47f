// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use gbt_sim::cfg::config::Invoker;

use super::{role, run_scenario};

/// 25-byte payload over a 10-byte block size: three blocks, comfortably
/// inside both peers' windows, client-invoked.
#[tokio::test]
async fn client_invoked_three_block_transfer_completes() {
    let outcome = run_scenario(
        Invoker::Client,
        "abcdefghijklmnopqrstuvwxy",
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
        Some(b"abcdefghijklmnopqrstuvwxy".as_slice()),
        "reassembled payload must equal what the client sent"
    );
}
