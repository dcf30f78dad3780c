//! Property-based tests for access-control invariants.
//!
//! These tests use proptest to generate arbitrary card identifiers and event
//! sequences and verify that classification and mode invariants hold.

mod common;

use cardplug_access::{AccessStateMachine, Decision, Mode, ScanEvent};
use cardplug_core::{CardId, MasterSet};
use cardplug_storage::Whitelist;
use common::{KNOWN, MASTER, card, rig};
use proptest::prelude::*;
use std::time::Duration;
use tokio::time::Instant;

/// Strategy for raw UIDs as readers report them (4, 7 or 10 bytes).
fn raw_uid() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 4),
        prop::collection::vec(any::<u8>(), 7),
        prop::collection::vec(any::<u8>(), 10),
    ]
}

/// Strategy for cards that are neither master nor whitelisted.
fn unknown_card() -> impl Strategy<Value = CardId> {
    raw_uid()
        .prop_map(|raw| CardId::from_bytes(&raw).unwrap())
        .prop_filter("must be unknown", |c| {
            c.as_str() != MASTER && c.as_str() != KNOWN
        })
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Unknown cards in Normal mode never reach the outlet and never change mode.
    #[test]
    fn prop_unknown_card_issues_no_outlet_command(
        cards in prop::collection::vec(unknown_card(), 1..8)
    ) {
        paused_runtime().block_on(async {
            let mut rig = rig();

            for c in cards {
                let decision = rig.controller.on_card(c, Instant::now()).await;
                assert_eq!(decision, Decision::Deny);
                assert_eq!(rig.controller.mode(), Mode::Normal);
            }

            assert!(rig.outlet.commands().is_empty());
        });
    }

    /// The card id is the lowercase hex rendering of the raw bytes.
    #[test]
    fn prop_card_id_renders_lowercase_hex(raw in raw_uid()) {
        let id = CardId::from_bytes(&raw).unwrap();

        prop_assert_eq!(id.as_str().len(), raw.len() * 2);
        prop_assert!(id.as_str().chars().all(|ch| matches!(ch, '0'..='9' | 'a'..='f')));
        prop_assert_eq!(CardId::parse(&id.as_str().to_uppercase()).unwrap(), id);
    }

    /// A master card always opens enrollment stamped with the observation time.
    #[test]
    fn prop_master_opens_enrollment_at_observation(offset_ms in 0u64..1_000_000) {
        let mut machine = AccessStateMachine::new();
        let masters = MasterSet::new([card(MASTER)]);
        let at = Instant::now() + Duration::from_millis(offset_ms);

        let decision = machine.on_card(&card(MASTER), at, &masters, &Whitelist::new());

        prop_assert_eq!(decision, Decision::OpenEnrollment);
        prop_assert_eq!(machine.mode(), Mode::Enrollment { since: at });
    }

    /// Ticks never leave enrollment within the window and always do after it.
    #[test]
    fn prop_tick_respects_window(elapsed_ms in 0u64..30_000) {
        let mut machine = AccessStateMachine::new();
        let masters = MasterSet::new([card(MASTER)]);
        let opened = Instant::now();
        machine.on_card(&card(MASTER), opened, &masters, &Whitelist::new());

        let decision = machine.on_tick(opened + Duration::from_millis(elapsed_ms));

        if elapsed_ms > 10_000 {
            prop_assert_eq!(decision, Decision::EnrollmentTimedOut);
            prop_assert_eq!(machine.mode(), Mode::Normal);
        } else {
            prop_assert_eq!(decision, Decision::Idle);
            prop_assert_eq!(machine.mode(), Mode::Enrollment { since: opened });
        }
    }

    /// Enrolling any card any number of times leaves exactly one entry for it.
    #[test]
    fn prop_enrollment_is_idempotent(raw in raw_uid(), times in 1usize..5) {
        let target = CardId::from_bytes(&raw).unwrap();
        let mut whitelist = Whitelist::new();
        for _ in 0..times {
            whitelist = whitelist.added(target.clone());
        }

        prop_assert_eq!(whitelist.iter().filter(|c| **c == target).count(), 1);
    }

    /// NoCard events never mutate the whitelist, whatever the mode.
    #[test]
    fn prop_ticks_never_mutate_whitelist(steps in prop::collection::vec(0u64..3_000, 1..12)) {
        paused_runtime().block_on(async {
            let mut rig = rig();
            let before = rig.controller.whitelist().clone();
            rig.controller.on_card(card(MASTER), Instant::now()).await;

            for step in steps {
                tokio::time::advance(Duration::from_millis(step)).await;
                rig.controller.handle(ScanEvent::NoCard).await;
            }

            assert_eq!(rig.controller.whitelist(), &before);
        });
    }
}
