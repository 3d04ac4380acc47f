// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Instant;

use crate::engine::{Apdu, RUNAWAY_THRESHOLD};

/// Direction arrow for the sequence-diagram transcript, logged by the
/// *receiving* peer (a delivered message arrives `"SVR -> CLT"` when logged
/// by the client, `"CLT -> SVR"` when logged by the server), matching
/// `GetApduStr`'s `sDir` selection in the reference implementation.
fn direction(is_client: bool, dropped: bool) -> &'static str {
    let arrow = if dropped { "-x" } else { "->" };
    match (is_client, arrow) {
        (true, "->") => "SVR -> CLT",
        (true, _) => "SVR -x CLT",
        (false, "->") => "CLT -> SVR",
        (false, _) => "CLT -x SVR",
    }
}

/// Returns `true` if this APDU's BN looks like a runaway gap-recovery loop.
/// Diagnostic only — the engine never self-aborts on this condition.
pub fn is_runaway(apdu: &Apdu) -> bool {
    apdu.bn > RUNAWAY_THRESHOLD
}

/// Formats a received-or-dropped APDU the way `GetApduStr` does:
/// `"<DIR>: <ts_ns> LB=.. STR=.. W=.. BN=.. BNA=.. BD=.."`.
pub fn apdu_transcript_line(is_client: bool, started_at: Instant, apdu: &Apdu, dropped: bool) -> String {
    let ts_ns = started_at.elapsed().as_nanos();
    format!(
        "{}: {} LB={}, STR={}, W={}, BN={}, BNA={}, BD={}",
        direction(is_client, dropped),
        ts_ns,
        apdu.lb as u8,
        apdu.str_flag as u8,
        apdu.w,
        apdu.bn,
        apdu.bna,
        match &apdu.bd {
            Some(b) => format!("{b:?}"),
            None => "None".to_string(),
        }
    )
}
