// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::peer::handle::PeerHandle;

/// A one-shot, cancellable timer. At most one is armed at a time — `start`
/// no-ops if a timer is already armed (intentional: never accidentally
/// re-arm), matching `cGBTThread.StartTimer`/`StopTimer`. Expiry only ever
/// posts a `TimerExpiry` event to the owning peer's own queue; it never
/// invokes engine logic from the timer task, preserving the single-consumer
/// invariant.
#[derive(Debug, Default)]
pub struct OneShotTimer {
    armed: Option<(JoinHandle<()>, CancellationToken)>,
}

impl OneShotTimer {
    pub fn new() -> Self {
        Self { armed: None }
    }

    /// No-op if already armed or if `enabled` is false (the server's timer
    /// is disabled in the simulator: the client alone drives recovery).
    pub fn start(&mut self, enabled: bool, duration: Duration, owner: PeerHandle) {
        if !enabled || self.armed.is_some() {
            return;
        }

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = task_cancel.cancelled() => {},
                _ = tokio::time::sleep(duration) => {
                    owner.notify_timer_expiry();
                },
            }
        });
        self.armed = Some((handle, cancel));
    }

    pub fn stop(&mut self) {
        if let Some((handle, cancel)) = self.armed.take() {
            cancel.cancel();
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

impl Drop for OneShotTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
