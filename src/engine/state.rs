// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// The `{BNA, STR, W}` triple for self and peer, plus `NextBN`.
///
/// Mirrors `cGBTStateVars` in the reference implementation field for field;
/// `Wpeer` is bootstrapped a-priori to the peer's `Wself` before any traffic
/// has been exchanged (see [`crate::engine::gbt::Engine::bootstrap_wpeer`]).
#[derive(Debug, Clone, Copy)]
pub struct GbtStateVars {
    /// Highest contiguous BN we have received. Initial 0.
    pub bna_self: u16,
    /// Our intention to stream. Initial = BTS.
    pub str_self: bool,
    /// Window size we advertise. Initial = BTW.
    pub w_self: u8,

    /// Mirror of the peer's BNA, learned from incoming APDUs.
    pub bna_peer: u16,
    /// Mirror of the peer's STR, learned from incoming APDUs.
    pub str_peer: bool,
    /// Mirror of the peer's W, bootstrapped a-priori.
    pub w_peer: u8,

    /// Next unused send block number.
    pub next_bn: u16,
}

impl GbtStateVars {
    pub fn new(bts: bool, btw: u8) -> Self {
        Self {
            bna_self: 0,
            str_self: bts,
            w_self: btw,
            bna_peer: 0,
            str_peer: false,
            w_peer: 1,
            next_bn: 1,
        }
    }
}
