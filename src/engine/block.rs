// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bytes::Bytes;

/// A single GBT block. `bn` starts at 1 and increases monotonically within a
/// transaction. `lb` is set on the final block of a payload. `bd` is absent
/// (or empty) for an acknowledgement-only block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub lb: bool,
    pub bn: u16,
    pub bd: Option<Bytes>,
}

impl Block {
    pub fn new(lb: bool, bn: u16, bd: Option<Bytes>) -> Self {
        Self { lb, bn, bd }
    }

    /// An acknowledgement-only block carries no payload.
    pub fn ack_only(lb: bool, bn: u16) -> Self {
        Self { lb, bn, bd: None }
    }
}

/// A GBT APDU: a [`Block`] wrapped with the transport-level window fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apdu {
    pub lb: bool,
    pub bn: u16,
    pub bd: Option<Bytes>,
    /// Streaming flag: more blocks follow in the current window.
    pub str_flag: bool,
    /// Window size the sender will accept from its peer next.
    pub w: u8,
    /// Block-Number-Acknowledged: highest contiguous BN received.
    pub bna: u16,
}

impl Apdu {
    pub fn from_block(block: &Block, str_flag: bool, w: u8, bna: u16) -> Self {
        Self {
            lb: block.lb,
            bn: block.bn,
            bd: block.bd.clone(),
            str_flag,
            w,
            bna,
        }
    }

    pub fn as_block(&self) -> Block {
        Block::new(self.lb, self.bn, self.bd.clone())
    }

    /// Formats the APDU the way the reference implementation's
    /// `GetSimpleApduStr` does, for diagnostic log lines.
    pub fn simple_str(&self) -> String {
        format!(
            "LB={}, STR={}, W={}, BN={}, BNA={}, BD={}",
            self.lb as u8,
            self.str_flag as u8,
            self.w,
            self.bn,
            self.bna,
            fmt_bd(&self.bd)
        )
    }
}

fn fmt_bd(bd: &Option<Bytes>) -> String {
    match bd {
        Some(b) => format!("{b:?}"),
        None => "None".to_string(),
    }
}
