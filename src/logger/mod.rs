// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The logger sink: a serialised console + sequence-diagram transcript
//! writer, consuming log records posted by the engine/peer layers. Kept as
//! its own single-consumer actor so concurrent peers never interleave
//! partial lines, mirroring `cLoggerThread` in the reference implementation.

pub mod transcript;

use anyhow::Result;
use bitflags::bitflags;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::info;

use crate::logger::transcript::Transcript;

bitflags! {
    /// Which sink(s) a log record should be written to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LogMask: u8 {
        const CONSOLE = 0b01;
        const FILE = 0b10;
        const BOTH = Self::CONSOLE.bits() | Self::FILE.bits();
    }
}

enum LogEvt {
    Record { mask: LogMask, text: String },
    Stop,
}

/// A cloneable handle onto the logger actor's inbound queue.
#[derive(Debug, Clone)]
pub struct LoggerHandle {
    tx: mpsc::UnboundedSender<LogEvt>,
}

impl LoggerHandle {
    pub fn log(&self, mask: LogMask, text: impl Into<String>) {
        let _ = self.tx.send(LogEvt::Record {
            mask,
            text: text.into(),
        });
    }

    /// Requests the transcript be closed (`@enduml` written) and the actor
    /// task stopped. Idempotent: posting after the actor has already exited
    /// is a harmless no-op.
    pub fn stop(&self) {
        let _ = self.tx.send(LogEvt::Stop);
    }
}

/// Spawns the logger actor task and returns a handle plus its join handle.
pub fn spawn(transcript_path: &str) -> Result<(LoggerHandle, JoinHandle<Result<()>>)> {
    let (tx, mut rx) = mpsc::unbounded_channel::<LogEvt>();
    let mut transcript = Transcript::open(transcript_path)?;

    let join = tokio::spawn(async move {
        while let Some(evt) = rx.recv().await {
            match evt {
                LogEvt::Record { mask, text } => {
                    if mask.contains(LogMask::CONSOLE) {
                        info!("{text}");
                    }
                    if mask.contains(LogMask::FILE) {
                        transcript.line(&text)?;
                    }
                },
                LogEvt::Stop => break,
            }
        }
        transcript.close()
    });

    Ok((LoggerHandle { tx }, join))
}
