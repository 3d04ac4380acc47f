// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Top-level simulation configuration: which role invokes first, the
/// payload to send, the per-role window/timeout parameters, and which
/// inbound messages to drop to exercise loss recovery.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimConfig {
    /// Who starts the transaction: the client's ACCESS.request or the
    /// server's ACCESS.response.
    pub invoker: Invoker,
    /// Payload bytes to send, expressed as UTF-8 text for readability in
    /// the YAML file.
    #[serde(default)]
    pub payload: String,
    pub client: RoleParams,
    pub server: RoleParams,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Invoker {
    Client,
    Server,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RoleParams {
    /// Block-Transfer-Window: max blocks streamed before pausing for ACK.
    #[serde(rename = "BTW")]
    pub btw: u8,
    /// Timeout, in seconds, for this role's one-shot recovery timer.
    pub timeout_secs: f64,
    /// Whether the timer is armed at all for this role.
    #[serde(default = "default_true")]
    pub timer_enabled: bool,
    /// Zero-indexed positions of inbound messages to drop (loss
    /// simulation): 0 = first inbound message, 1 = second, etc.
    #[serde(default)]
    pub drop_msgs: Vec<usize>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoggingConfig {
    /// Sequence-diagram transcript path (PlantUML `.puml`).
    #[serde(default = "default_transcript_path")]
    pub transcript_path: String,
    /// Maximum bytes per GBT block (kept small for the simulator).
    #[serde(default = "default_max_payload")]
    pub max_payload: usize,
}

fn default_transcript_path() -> String {
    "msc.puml".to_string()
}

fn default_max_payload() -> usize {
    10
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            transcript_path: default_transcript_path(),
            max_payload: default_max_payload(),
        }
    }
}

impl SimConfig {
    /// Loads and validates the simulation configuration from YAML.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let cfg: Self = serde_yaml::from_str(&s).context("failed to parse config YAML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.client.btw >= 1, "client BTW must be >= 1");
        ensure!(self.server.btw >= 1, "server BTW must be >= 1");
        ensure!(
            self.logging.max_payload >= 1,
            "logging.max_payload must be >= 1"
        );
        ensure!(
            self.client.timeout_secs > 0.0,
            "client timeout_secs must be > 0"
        );
        ensure!(
            self.server.timeout_secs > 0.0,
            "server timeout_secs must be > 0"
        );
        Ok(())
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.client.timeout_secs)
    }

    pub fn server_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.server.timeout_secs)
    }
}

/// Defaults matching the reference implementation's `GBT.py` module
/// constants: client BTW=63, server BTW=6, timeouts (server 5s, client
/// 10s), server timer disabled, first inbound message dropped at the
/// server.
impl Default for SimConfig {
    fn default() -> Self {
        Self {
            invoker: Invoker::Client,
            payload: String::new(),
            client: RoleParams {
                btw: 63,
                timeout_secs: 10.0,
                timer_enabled: true,
                drop_msgs: Vec::new(),
            },
            server: RoleParams {
                btw: 6,
                timeout_secs: 5.0,
                timer_enabled: false,
                drop_msgs: vec![0],
            },
            logging: LoggingConfig::default(),
        }
    }
}
