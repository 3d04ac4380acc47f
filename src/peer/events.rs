// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bytes::Bytes;

use crate::engine::Apdu;

/// One event delivered to a peer's event loop. Tagged-variant dispatch is
/// used in place of the reference implementation's late-bound
/// `HandleEvent` override, per the re-architecture guidance in SPEC_FULL.md.
#[derive(Debug, Clone)]
pub enum Event {
    /// A GBT APDU received from the peer.
    PeerMsg(Apdu),
    /// A local invocation that starts a send: client ACCESS.request or
    /// server ACCESS.response.
    Invoke(Bytes),
    /// The peer's own one-shot timer has expired.
    TimerExpiry,
}

/// Reported by a peer when it has fully delivered or fully received a
/// payload, so the simulator driver can detect overall completion without
/// polling engine internals. `FinishedReceiving` carries the reassembled
/// payload (RQ's block data, concatenated in ascending BN order) so callers
/// can check the round-trip law without reaching into engine internals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    FinishedSending,
    FinishedReceiving(Bytes),
}
