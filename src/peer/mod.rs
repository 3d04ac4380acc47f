// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The peer event-loop harness: one Tokio task owning an [`Engine`], driving
//! it from a `tokio::sync::mpsc` event queue. Port of `GBTClientThread.py` /
//! `GBTServerThread.py`'s `HandleEvent` plus the shared `cGBTThread` loop,
//! generalised into a single role-agnostic actor (see SPEC_FULL.md §9 on
//! derived Client/Server classes).

pub mod events;
pub mod format;
pub mod handle;
pub mod loss;
pub mod timer;

use std::time::Instant;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    engine::{Effect, Engine, RoleConfig},
    logger::{LogMask, LoggerHandle},
    peer::{
        events::{Completion, Event},
        format::{apdu_transcript_line, is_runaway},
        handle::PeerHandle,
        loss::DropFilter,
        timer::OneShotTimer,
    },
};

/// Everything a [`PeerActor`] needs beyond the engine itself.
pub struct PeerConfig {
    pub role: RoleConfig,
    pub drop_indices: Vec<usize>,
}

/// One running peer: an [`Engine`], its own inbound queue, a handle to the
/// other peer, the one-shot timer, the loss filter and the logger sink.
/// Owns all of its state — nothing here is shared behind a lock.
pub struct PeerActor {
    engine: Engine,
    is_client: bool,
    inbox: mpsc::UnboundedReceiver<Event>,
    self_handle: PeerHandle,
    peer: PeerHandle,
    timer: OneShotTimer,
    drop_filter: DropFilter,
    logger: LoggerHandle,
    completion: mpsc::UnboundedSender<(&'static str, Completion)>,
    started_at: Instant,
}

impl PeerActor {
    /// Builds a peer actor. `self_handle` must be the sender half of `inbox`
    /// — the caller wires this symmetrically for both peers before spawning
    /// either (see [`crate::sim::run_simulation`]).
    pub fn new(
        config: PeerConfig,
        inbox: mpsc::UnboundedReceiver<Event>,
        self_handle: PeerHandle,
        peer: PeerHandle,
        logger: LoggerHandle,
        completion: mpsc::UnboundedSender<(&'static str, Completion)>,
        started_at: Instant,
    ) -> Self {
        let is_client = config.role.is_client;
        Self {
            engine: Engine::new(config.role),
            is_client,
            inbox,
            self_handle,
            peer,
            timer: OneShotTimer::new(),
            drop_filter: DropFilter::new(config.drop_indices),
            logger,
            completion,
            started_at,
        }
    }

    /// Runs the event loop until the inbox closes or `shutdown` fires.
    /// Mirrors `BaseThread.Run`'s `while self.bLooping` loop, but termination
    /// here is structural (channel closed) rather than a flag the caller
    /// must remember to clear.
    pub async fn run(mut self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                maybe_ev = self.inbox.recv() => {
                    match maybe_ev {
                        Some(ev) => self.handle_event(ev),
                        None => break,
                    }
                }
            }
        }
    }

    fn handle_event(&mut self, ev: Event) {
        let mut effects = Vec::new();

        match ev {
            Event::Invoke(payload) => {
                self.log_console(format!(
                    "{}: Invoking {}",
                    self.engine.role().name,
                    self.invoke_label()
                ));
                self.engine.start_gbt();
                self.engine.fill_sq(&payload);
                self.engine.send_apdu_stream(&mut effects);
            },
            Event::PeerMsg(apdu) => {
                let idx = self.engine.bump_msg_count();
                let dropped = self.drop_filter.should_drop(idx);
                let line = apdu_transcript_line(self.is_client, self.started_at, &apdu, dropped);
                self.logger.log(LogMask::FILE, line);

                if is_runaway(&apdu) {
                    self.log_console(format!(
                        "{}: runaway BN {} detected",
                        self.engine.role().name,
                        apdu.bn
                    ));
                }

                if dropped {
                    self.log_console(format!(
                        "{}: dropped inbound message #{idx}",
                        self.engine.role().name
                    ));
                    return;
                }

                if !self.engine.is_processing() && apdu.bd.is_some() {
                    self.log_console(format!(
                        "{}: New stream from {}",
                        self.engine.role().name,
                        self.peer_label()
                    ));
                    self.engine.start_gbt();
                }

                self.engine.process_apdu(apdu, &mut effects);
            },
            Event::TimerExpiry => {
                self.timer.stop();
                self.log_console(format!("{}: timer expired", self.engine.role().name));
                self.engine.check_rq_and_fill_gaps(&mut effects);
            },
        }

        self.apply_effects(effects);
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendApdu(apdu) => self.peer.deliver(apdu),
                Effect::StartTimer => {
                    let role = self.engine.role();
                    self.timer
                        .start(role.timer_enabled, role.timeout, self.self_handle.clone());
                },
                Effect::StopTimer => self.timer.stop(),
                Effect::Log(text) => self.log_console(text),
                Effect::FinishedSending => {
                    let _ = self
                        .completion
                        .send((self.engine.role().name, Completion::FinishedSending));
                },
                Effect::FinishedReceiving => {
                    let payload = self.received_payload();
                    self.log_console(format!(
                        "{}: reassembled {} byte(s)",
                        self.engine.role().name,
                        payload.len()
                    ));
                    let _ = self.completion.send((
                        self.engine.role().name,
                        Completion::FinishedReceiving(payload),
                    ));
                },
            }
        }
    }

    /// Concatenates RQ's block data in ascending BN order. Valid once
    /// `FinishedReceiving` has fired; called only from that effect handler.
    fn received_payload(&self) -> Bytes {
        let mut out = Vec::new();
        for block in self.engine.rq_blocks_ascending() {
            if let Some(bd) = block.bd {
                out.extend_from_slice(&bd);
            }
        }
        Bytes::from(out)
    }

    fn invoke_label(&self) -> &'static str {
        if self.is_client {
            "ACCESS.request"
        } else {
            "ACCESS.response"
        }
    }

    fn peer_label(&self) -> &'static str {
        if self.is_client {
            "server"
        } else {
            "client"
        }
    }

    fn log_console(&self, text: String) {
        self.logger.log(LogMask::CONSOLE, text);
    }
}
