// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Wires a client and a server [`PeerActor`] together from a [`SimConfig`],
//! invokes whichever role starts the transaction, and awaits both peers'
//! completion signals. Stands in for the reference implementation's
//! `MainFrame` wiring (`SetPeerThread`, the "Invoke Client"/"Invoke Server"
//! buttons) without a GUI — see SPEC_FULL.md's ambient CLI surface section.

use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    cfg::config::{Invoker, SimConfig},
    engine::RoleConfig,
    logger::LoggerHandle,
    peer::{PeerActor, PeerConfig, events::Completion, handle::PeerHandle},
};

/// Overall simulation result: which completion each peer reported, if any,
/// plus the reassembled payload a peer that finished *receiving* observed
/// (`None` for a peer that finished sending, or that never completed).
/// Serialisable so the CLI can emit a structured final report.
#[derive(Debug, Serialize)]
pub struct SimOutcome {
    pub client: Option<&'static str>,
    pub server: Option<&'static str>,
    #[serde(skip)]
    pub client_received: Option<Bytes>,
    #[serde(skip)]
    pub server_received: Option<Bytes>,
}

fn completion_label(c: &Completion) -> &'static str {
    match c {
        Completion::FinishedSending => "finished_sending",
        Completion::FinishedReceiving(_) => "finished_receiving",
    }
}

fn role_configs(cfg: &SimConfig) -> (RoleConfig, RoleConfig) {
    let client = RoleConfig {
        name: "Client",
        is_client: true,
        bts: true,
        btw: cfg.client.btw,
        max_payload: cfg.logging.max_payload,
        timeout: cfg.client_timeout(),
        timer_enabled: cfg.client.timer_enabled,
        peer_btw: cfg.server.btw,
    };
    let server = RoleConfig {
        name: "Server",
        is_client: false,
        bts: true,
        btw: cfg.server.btw,
        max_payload: cfg.logging.max_payload,
        timeout: cfg.server_timeout(),
        timer_enabled: cfg.server.timer_enabled,
        peer_btw: cfg.client.btw,
    };
    (client, server)
}

/// Wires two peers per `cfg`, invokes the configured role with the
/// configured payload, and waits until both have reported completion or
/// `overall_timeout` elapses, whichever comes first.
pub async fn run_simulation(
    cfg: &SimConfig,
    logger: LoggerHandle,
    overall_timeout: Duration,
) -> Result<SimOutcome> {
    let (client_role, server_role) = role_configs(cfg);

    let (client_tx, client_rx) = mpsc::unbounded_channel();
    let (server_tx, server_rx) = mpsc::unbounded_channel();
    let client_handle = PeerHandle::new(client_tx);
    let server_handle = PeerHandle::new(server_tx);

    let (completion_tx, mut completion_rx) =
        mpsc::unbounded_channel::<(&'static str, Completion)>();
    let shutdown = CancellationToken::new();
    let started_at = Instant::now();

    let client_actor = PeerActor::new(
        PeerConfig {
            role: client_role,
            drop_indices: cfg.client.drop_msgs.clone(),
        },
        client_rx,
        client_handle.clone(),
        server_handle.clone(),
        logger.clone(),
        completion_tx.clone(),
        started_at,
    );
    let server_actor = PeerActor::new(
        PeerConfig {
            role: server_role,
            drop_indices: cfg.server.drop_msgs.clone(),
        },
        server_rx,
        server_handle.clone(),
        client_handle.clone(),
        logger.clone(),
        completion_tx.clone(),
        started_at,
    );
    // The loop below drives the race on its own clones; dropping the
    // original lets the channel close once both actor tasks exit, instead
    // of hanging on a sender nobody will ever use again.
    drop(completion_tx);

    let client_task = tokio::spawn(client_actor.run(shutdown.clone()));
    let server_task = tokio::spawn(server_actor.run(shutdown.clone()));

    let payload = Bytes::from(cfg.payload.clone().into_bytes());
    match cfg.invoker {
        Invoker::Client => client_handle.invoke(payload),
        Invoker::Server => server_handle.invoke(payload),
    }

    let mut outcome = SimOutcome {
        client: None,
        server: None,
        client_received: None,
        server_received: None,
    };
    let deadline = tokio::time::sleep(overall_timeout);
    tokio::pin!(deadline);

    loop {
        if outcome.client.is_some() && outcome.server.is_some() {
            break;
        }
        tokio::select! {
            _ = &mut deadline => {
                shutdown.cancel();
                bail!("simulation timed out after {overall_timeout:?} awaiting completion");
            }
            msg = completion_rx.recv() => match msg {
                Some(("Client", c)) => {
                    outcome.client = Some(completion_label(&c));
                    if let Completion::FinishedReceiving(payload) = c {
                        outcome.client_received = Some(payload);
                    }
                },
                Some(("Server", c)) => {
                    outcome.server = Some(completion_label(&c));
                    if let Completion::FinishedReceiving(payload) = c {
                        outcome.server_received = Some(payload);
                    }
                },
                Some(_) => {},
                None => break,
            }
        }
    }

    shutdown.cancel();
    let _ = client_task.await;
    let _ = server_task.await;

    Ok(outcome)
}
