// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use gbt_sim::cfg::config::Invoker;

use super::{role, run_scenario};

/// 200-byte payload (20 blocks) against a server BTW of 6: three full
/// 6-block windows plus a final 2-block partial window, each needing its
/// own ack round-trip before the next window opens.
#[tokio::test]
async fn twenty_blocks_over_three_full_windows_and_a_partial() {
    let payload: String = ('a'..='z').cycle().take(200).collect();
    let outcome = run_scenario(
        Invoker::Client,
        &payload,
        role(63, 10.0, true, vec![]),
        role(6, 5.0, false, vec![]),
        Duration::from_secs(2),
    )
    .await
    .expect("scenario should converge across multiple windows");

    assert_eq!(outcome.client, Some("finished_sending"));
    assert_eq!(outcome.server, Some("finished_receiving"));
    assert_eq!(
        outcome.server_received.as_deref(),
        Some(payload.as_bytes()),
        "all three full windows plus the partial window must reassemble intact"
    );
}
