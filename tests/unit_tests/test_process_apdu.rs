// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bytes::Bytes;
use gbt_sim::engine::{Apdu, Effect, Engine};

use super::test_role;

#[test]
fn first_block_in_window_is_queued_without_finishing_window() {
    let mut engine = Engine::new(test_role("Server", false, 6, 63));
    engine.start_gbt();

    let gr = Apdu {
        lb: false,
        bn: 1,
        bd: Some(Bytes::from_static(b"0123456789")),
        str_flag: true,
        w: 63,
        bna: 0,
    };
    let mut effects = Vec::new();
    engine.process_apdu(gr, &mut effects);

    assert_eq!(engine.rq_bns(), vec![1]);
    assert_eq!(engine.vars().bna_self, 0);
    assert!(engine.vars().str_peer);
    assert!(!effects.contains(&Effect::FinishedReceiving));
}

#[test]
fn bn_one_bna_zero_reinitialises_self_vars() {
    let mut engine = Engine::new(test_role("Server", false, 6, 63));
    engine.start_gbt();

    let gr = Apdu {
        lb: true,
        bn: 1,
        bd: Some(Bytes::from_static(b"hi")),
        str_flag: false,
        w: 63,
        bna: 0,
    };
    let mut effects = Vec::new();
    engine.process_apdu(gr, &mut effects);

    assert_eq!(engine.vars().bna_self, 0);
    assert_eq!(engine.vars().w_self, 6);
}

#[test]
fn finished_sending_detected_once_sq_drained_by_peer_ack() {
    let mut engine = Engine::new(test_role("Client", true, 63, 6));
    engine.start_gbt();
    engine.fill_sq(&Bytes::from_static(b"0123456789")); // single block, bn=1

    let ack = Apdu {
        lb: true,
        bn: 1,
        bd: None,
        str_flag: false,
        w: 6,
        bna: 1,
    };
    let mut effects = Vec::new();
    engine.process_apdu(ack, &mut effects);

    assert!(effects.contains(&Effect::FinishedSending));
    assert!(!engine.is_processing());
}
