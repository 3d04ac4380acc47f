// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The GBT peer state machine: block slicing, windowed send, acknowledgement
//! tracking, gap detection/recovery, and completion detection. Transport-,
//! logging- and timer-agnostic — see [`crate::peer`] for the event-loop
//! harness that drives it.

pub mod block;
pub mod gbt;
pub mod queues;
pub mod state;

pub use block::{Apdu, Block};
pub use gbt::{Effect, Engine, RoleConfig, RUNAWAY_THRESHOLD};
