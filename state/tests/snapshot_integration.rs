// Copyright (c) 2024 Botho Foundation
//
//! Snapshot construction against in-memory execution and beacon readers.

use std::sync::Arc;

use assert_matches::assert_matches;
use netstate::{ReaderError, SnapshotBuilder, StateError, TracingLogger};
use netstate_test_utils::{
    active_validator, address, eth, node, pubkey, staking_minipool, test_beacon_config,
    test_network_details, InMemoryBeacon, InMemoryLedger, LedgerCall, LedgerView,
};
use netstate_types::{MinipoolStatus, ValidatorPubkey};

// ============================================================================
// Constants
// ============================================================================

const SLOT: u64 = 320_000;
const PINNED_BLOCK: u64 = 18_000_000;
const NEWER_BLOCK: u64 = 18_000_001;

// ============================================================================
// Helper Functions
// ============================================================================

fn pinned_view() -> LedgerView {
    let mut unassigned = staking_minipool(3, 2);
    unassigned.pubkey = ValidatorPubkey::EMPTY;
    unassigned.status = MinipoolStatus::Initialized;

    LedgerView {
        details: test_network_details(),
        nodes: vec![node(1, eth(500), 0), node(2, eth(100), 0)],
        minipools: vec![
            staking_minipool(1, 1),
            staking_minipool(2, 1),
            unassigned,
            staking_minipool(4, 2),
        ],
    }
}

fn newer_view() -> LedgerView {
    let mut view = pinned_view();
    view.nodes.push(node(3, eth(1), 0));
    view.details.reward_index += 1;
    view
}

fn ledger() -> InMemoryLedger {
    InMemoryLedger::new()
        .with_view(PINNED_BLOCK, pinned_view())
        .with_view(NEWER_BLOCK, newer_view())
}

fn beacon() -> InMemoryBeacon {
    InMemoryBeacon::new()
        .with_block(SLOT, PINNED_BLOCK)
        .with_block(SLOT + 1, NEWER_BLOCK)
        .with_validator(active_validator(pubkey(1), 10, 0))
        .with_validator(active_validator(pubkey(2), 11, 0))
}

fn builder(ledger: &Arc<InMemoryLedger>, beacon: &Arc<InMemoryBeacon>) -> SnapshotBuilder {
    SnapshotBuilder::new(ledger.clone(), ledger.clone(), beacon.clone())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn every_ledger_read_is_pinned_to_the_slot_block() {
    let ledger = Arc::new(ledger());
    let beacon = Arc::new(beacon());

    let state = builder(&ledger, &beacon)
        .build(SLOT, test_beacon_config())
        .await
        .unwrap();

    assert_eq!(state.el_block_number(), PINNED_BLOCK);
    assert_eq!(state.beacon_slot_number(), SLOT);
    assert_eq!(state.nodes().len(), 2);
    assert_eq!(state.network_details(), &test_network_details());

    let reads = ledger.reads();
    assert_eq!(reads.len(), 9);
    assert!(reads.iter().all(|(_, block)| *block == PINNED_BLOCK));
}

#[tokio::test]
async fn later_slot_sees_later_block() {
    let ledger = Arc::new(ledger());
    let beacon = Arc::new(beacon());

    let state = builder(&ledger, &beacon)
        .build(SLOT + 1, test_beacon_config())
        .await
        .unwrap();

    assert_eq!(state.el_block_number(), NEWER_BLOCK);
    assert_eq!(state.nodes().len(), 3);
    assert_eq!(
        state.network_details().reward_index,
        test_network_details().reward_index + 1
    );
}

#[tokio::test]
async fn indexes_mirror_the_record_lists() {
    let ledger = Arc::new(ledger());
    let beacon = Arc::new(beacon());
    let state = builder(&ledger, &beacon)
        .build(SLOT, test_beacon_config())
        .await
        .unwrap();

    assert_eq!(state.node(&address(2)).unwrap().stake, eth(100));
    assert!(state.node(&address(9)).is_none());

    let owned: Vec<_> = state
        .minipools_for_node(&address(1))
        .map(|mp| mp.pubkey)
        .collect();
    assert_eq!(owned, vec![pubkey(1), pubkey(2)]);
    assert_eq!(state.minipools_for_node(&address(2)).count(), 2);

    for mp in state.minipools() {
        assert_eq!(state.minipool(&mp.address), Some(mp));
    }
}

#[tokio::test]
async fn statuses_requested_for_assigned_pubkeys_only() {
    let ledger = Arc::new(ledger());
    let beacon = Arc::new(beacon());
    let state = builder(&ledger, &beacon)
        .build(SLOT, test_beacon_config())
        .await
        .unwrap();

    let requests = beacon.status_requests();
    assert_eq!(requests.len(), 1);
    let (keys, slot) = &requests[0];
    assert_eq!(*slot, SLOT);
    assert_eq!(keys.len(), 3);
    assert!(!keys.contains(&ValidatorPubkey::EMPTY));

    // pubkey(4) is not known to the beacon chain yet
    assert_eq!(state.validator_count(), 2);
    assert!(state.validator_status(&pubkey(4)).is_none());
}

#[tokio::test]
async fn empty_slot_fails_without_touching_the_ledger() {
    let ledger = Arc::new(ledger());
    let beacon = Arc::new(beacon());

    let err = builder(&ledger, &beacon)
        .build(SLOT + 7, test_beacon_config())
        .await
        .unwrap_err();

    assert_matches!(err, StateError::SlotNotFound { slot } if slot == SLOT + 7);
    assert!(ledger.reads().is_empty());
    assert!(beacon.status_requests().is_empty());
}

#[tokio::test]
async fn failed_parameter_read_yields_no_snapshot() {
    let ledger = Arc::new(ledger().failing(LedgerCall::IntervalDuration));
    let beacon = Arc::new(beacon());

    let err = builder(&ledger, &beacon)
        .build(SLOT, test_beacon_config())
        .await
        .unwrap_err();

    assert_matches!(
        err,
        StateError::Parameter {
            name: "interval duration",
            block: PINNED_BLOCK,
            source: ReaderError::Unavailable(_),
        }
    );
    assert!(!ledger
        .reads()
        .iter()
        .any(|(call, _)| *call == LedgerCall::NodeRecords));
}

#[tokio::test]
async fn failed_entity_read_after_parameters_yields_no_snapshot() {
    let ledger = Arc::new(ledger().failing(LedgerCall::NodeRecords));
    let beacon = Arc::new(beacon());

    let err = builder(&ledger, &beacon)
        .build(SLOT, test_beacon_config())
        .await
        .unwrap_err();

    assert_matches!(err, StateError::NodeRecords { block: PINNED_BLOCK, .. });
    assert!(beacon.status_requests().is_empty());
}

#[tokio::test]
async fn failed_status_resolution_yields_no_snapshot() {
    let ledger = Arc::new(ledger());
    let beacon = Arc::new(beacon().failing_statuses());

    let err = builder(&ledger, &beacon)
        .build(SLOT, test_beacon_config())
        .await
        .unwrap_err();

    assert_matches!(
        err,
        StateError::ValidatorStatuses {
            slot: SLOT,
            count: 3,
            source: ReaderError::Timeout(_),
        }
    );
    let message = err.to_string();
    assert!(message.contains("slot 320000"), "{message}");
}

#[tokio::test]
async fn logging_does_not_change_the_snapshot() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let ledger = Arc::new(ledger());
    let beacon = Arc::new(beacon());

    let quiet = builder(&ledger, &beacon)
        .build(SLOT, test_beacon_config())
        .await
        .unwrap();
    let logged = builder(&ledger, &beacon)
        .with_logger(Arc::new(TracingLogger))
        .build(SLOT, test_beacon_config())
        .await
        .unwrap();

    assert_eq!(quiet.nodes(), logged.nodes());
    assert_eq!(quiet.minipools(), logged.minipools());
    assert_eq!(quiet.network_details(), logged.network_details());
    assert_eq!(quiet.validator_count(), logged.validator_count());
}
