// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{env, time::Duration};

use anyhow::{Context, Result};
use gbt_sim::{
    cfg::{cli::resolve_config_path, config::SimConfig, logger::init_logger},
    logger,
    sim::run_simulation,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let log_config_path = env::args().nth(2).unwrap_or_else(|| "tests/config_logger.yaml".to_string());
    let _logger_guard = init_logger(&log_config_path).ok();

    let sim_config_path = env::args().nth(1).unwrap_or_else(|| "gbtsim.yaml".to_string());
    let cfg = resolve_config_path(&sim_config_path)
        .and_then(SimConfig::load_from_file)
        .with_context(|| format!("failed to resolve or load simulation config {sim_config_path}"))?;

    let (transcript, transcript_join) =
        logger::spawn(&cfg.logging.transcript_path).context("failed to open transcript sink")?;

    info!(
        "Starting GBT simulation: invoker={:?} payload_len={}",
        cfg.invoker,
        cfg.payload.len()
    );

    let outcome = run_simulation(&cfg, transcript.clone(), Duration::from_secs(30)).await;

    transcript.stop();
    let _ = transcript_join.await;

    let outcome = outcome?;
    let report = serde_json::to_string_pretty(&outcome).context("failed to render final report")?;
    info!("Simulation complete:\n{report}");

    Ok(())
}
