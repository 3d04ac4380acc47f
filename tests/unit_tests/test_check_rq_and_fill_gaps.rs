// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bytes::Bytes;
use gbt_sim::engine::{Apdu, Effect, Engine};

use super::test_role;

fn feed(engine: &mut Engine, bn: u16, lb: bool, bd: Option<Bytes>) {
    let gr = Apdu {
        lb,
        bn,
        bd,
        str_flag: true, // keep the window open so process_apdu doesn't auto-run CRF
        w: 63,
        bna: 0,
    };
    let mut effects = Vec::new();
    engine.process_apdu(gr, &mut effects);
}

#[test]
fn detects_gap_and_sets_window_to_gap_size() {
    let mut engine = Engine::new(test_role("Server", false, 6, 63));
    engine.start_gbt();
    feed(&mut engine, 1, false, Some(Bytes::from_static(b"a")));
    feed(&mut engine, 2, false, Some(Bytes::from_static(b"b")));
    feed(&mut engine, 4, false, Some(Bytes::from_static(b"d")));

    let mut effects = Vec::new();
    engine.check_rq_and_fill_gaps(&mut effects);

    assert_eq!(engine.bna_self(), 2);
    assert_eq!(engine.vars().w_self, 1);
    assert!(!effects.contains(&Effect::FinishedReceiving));
    assert!(effects.contains(&Effect::StartTimer));
}

#[test]
fn no_gap_advances_bna_to_highest_contiguous_block() {
    let mut engine = Engine::new(test_role("Server", false, 6, 63));
    engine.start_gbt();
    feed(&mut engine, 1, false, Some(Bytes::from_static(b"a")));
    feed(&mut engine, 2, false, Some(Bytes::from_static(b"b")));
    feed(&mut engine, 3, false, Some(Bytes::from_static(b"c")));

    let mut effects = Vec::new();
    engine.check_rq_and_fill_gaps(&mut effects);

    assert_eq!(engine.bna_self(), 3);
    assert_eq!(engine.vars().w_self, 6);
}

#[test]
fn last_block_flagged_lb_with_data_finishes_receiving() {
    let mut engine = Engine::new(test_role("Server", false, 6, 63));
    engine.start_gbt();
    feed(&mut engine, 1, false, Some(Bytes::from_static(b"a")));
    feed(&mut engine, 2, true, Some(Bytes::from_static(b"b")));

    let mut effects = Vec::new();
    engine.check_rq_and_fill_gaps(&mut effects);

    assert!(effects.contains(&Effect::FinishedReceiving));
    assert!(!engine.is_processing());
}

#[test]
fn empty_rq_resets_window_and_resends() {
    let mut engine = Engine::new(test_role("Client", true, 63, 6));
    engine.start_gbt();

    let mut effects = Vec::new();
    engine.check_rq_and_fill_gaps(&mut effects);

    assert_eq!(engine.vars().w_self, 63);
    assert!(effects.contains(&Effect::StartTimer));
}
