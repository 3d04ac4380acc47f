// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::{engine::Apdu, peer::events::Event};

/// A cloneable handle onto a peer's inbound event queue. Outbound APDU
/// delivery and invocation are both just an enqueue onto this channel —
/// the peer that owns the other end is never referenced directly, avoiding
/// the self-referential peer pointers the reference implementation's
/// `SetPeerThread` created.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    tx: mpsc::UnboundedSender<Event>,
}

impl PeerHandle {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    /// Hand an APDU to this peer's inbound queue as a `PeerMsg` event.
    pub fn deliver(&self, apdu: Apdu) {
        // The receiving task may already have shut down (transaction
        // complete); a failed send is not an error worth propagating.
        let _ = self.tx.send(Event::PeerMsg(apdu));
    }

    /// Post a single `Invoke` event: `invoke_request` (client) or
    /// `invoke_response` (server). Zero-length payloads are permitted.
    pub fn invoke(&self, payload: Bytes) {
        let _ = self.tx.send(Event::Invoke(payload));
    }

    /// Used internally by [`crate::peer::timer::OneShotTimer`] to post a
    /// `TimerExpiry` event back to the owning peer — never to run business
    /// logic on the timer task.
    pub(crate) fn notify_timer_expiry(&self) {
        let _ = self.tx.send(Event::TimerExpiry);
    }
}
