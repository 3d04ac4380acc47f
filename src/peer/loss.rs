// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::HashSet;

/// Deterministic drop of inbound messages by sequence index, mirroring
/// `aCltDropMsgs` / `aSvrDropMsgs` in the reference implementation. The
/// sequence index is the peer's `msgCount` (0 = first inbound message, 1 =
/// second, etc.), counted whether or not the message is ultimately dropped.
#[derive(Debug, Clone, Default)]
pub struct DropFilter {
    drop_at: HashSet<usize>,
}

impl DropFilter {
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            drop_at: indices.into_iter().collect(),
        }
    }

    pub fn none() -> Self {
        Self::new(std::iter::empty())
    }

    pub fn should_drop(&self, msg_index: usize) -> bool {
        self.drop_at.contains(&msg_index)
    }
}
