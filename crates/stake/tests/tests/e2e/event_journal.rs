//! End-to-end test: the event journal records a full pool lifecycle in order.

use stake_ledger::{Ledger, LedgerState, ManualClock};
use stake_pool::PoolOutcome;
use stake_tests::{addr, safe_config, Harness};
use stake_types::{Amount, LedgerEvent};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn lifecycle_events_in_commit_order() {
    let mut h = Harness::new();
    let alice = h.fund("alice", Amount::units(1));
    let pool = h.deploy_pool(Amount::units(1), 30);

    pool.contribute(&mut h.ledger, &alice, Amount::units(1)).unwrap();
    // A rejected call leaves no trace in the journal
    assert!(pool
        .finalize(&mut h.ledger, &alice, safe_config(&["a", "b", "c"], 2))
        .is_err());
    h.advance(30);
    let PoolOutcome::SafeCreated(safe) = pool
        .finalize(&mut h.ledger, &alice, safe_config(&["a", "b", "c"], 2))
        .unwrap()
    else {
        panic!("threshold was met");
    };
    let id = safe
        .propose(&mut h.ledger, &addr("a"), addr("x"), Amount::milli(100))
        .unwrap();
    safe.sign(&mut h.ledger, &addr("b"), id).unwrap();
    safe.sign(&mut h.ledger, &addr("c"), id).unwrap();

    let names: Vec<&str> = h.ledger.events().iter().map(|r| r.event.name()).collect();
    assert_eq!(
        names,
        vec![
            "contributed",
            "safe_deployed",
            "safe_created",
            "transaction_created",
            "transaction_signed",
            "transaction_signed",
            "transaction_executed",
        ]
    );
    let sequences: Vec<u64> = h.ledger.events().iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, (0..7).collect::<Vec<u64>>());
    assert_eq!(h.ledger.events_from(pool.address()).count(), 2);
    assert_eq!(h.ledger.events_from(safe.address()).count(), 5);
    assert_eq!(
        h.ledger.events()[2].event,
        LedgerEvent::SafeCreated {
            address: safe.address().clone()
        }
    );
}

#[test]
fn exported_ledger_resumes_mid_lifecycle() {
    let mut h = Harness::new();
    let alice = h.fund("alice", Amount::units(1));
    let pool = h.deploy_pool(Amount::units(1), 30);
    pool.contribute(&mut h.ledger, &alice, Amount::milli(300)).unwrap();

    let json = h.ledger.export_json().unwrap();
    let state: LedgerState = serde_json::from_str(&json).unwrap();
    let clock = ManualClock::new(h.ledger.now());
    let mut resumed = Ledger::from_state(state, clock.clone());

    clock.advance(chrono::Duration::seconds(30));
    let outcome = pool
        .finalize(&mut resumed, &alice, safe_config(&["a"], 1))
        .unwrap();

    assert_eq!(
        outcome,
        PoolOutcome::OpenForWithdraw {
            total: Amount::milli(300)
        }
    );
    assert_eq!(pool.withdraw(&mut resumed, &alice, &alice), Ok(Amount::milli(300)));
    assert_eq!(resumed.balance_of(&alice), Amount::units(1));
}
