//! End-to-end test: a pool that reaches its threshold hands everything to a Safe.
//!
//! Threshold 1.0, 30 second window, two stakers of 0.5 each.

use stake_pool::PoolOutcome;
use stake_tests::{addr, safe_config, Harness};
use stake_types::{Amount, StakeError};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn two_half_stakes_fund_a_safe() {
    let mut h = Harness::new();
    let alice = h.fund("alice", Amount::units(1));
    let bob = h.fund("bob", Amount::units(1));
    let pool = h.deploy_pool(Amount::units(1), 30);

    pool.contribute(&mut h.ledger, &alice, Amount::milli(500)).unwrap();
    pool.contribute(&mut h.ledger, &bob, Amount::milli(500)).unwrap();
    assert_eq!(pool.total_balance(&h.ledger), Amount::units(1));

    h.advance(30);
    let outcome = pool
        .finalize(&mut h.ledger, &alice, safe_config(&["alice", "bob", "carol"], 2))
        .unwrap();

    let PoolOutcome::SafeCreated(safe) = outcome.clone() else {
        panic!("expected safe, got {:?}", outcome);
    };
    assert!(pool.staking_completed(&h.ledger).unwrap());
    assert!(pool.safe_created(&h.ledger).unwrap());
    assert!(!pool.open_for_withdraw(&h.ledger).unwrap());
    assert_eq!(pool.safe_address(&h.ledger).unwrap(), Some(safe.clone()));
    assert_eq!(safe.balance(&h.ledger), Amount::units(1));
    assert_eq!(pool.total_balance(&h.ledger), Amount::zero());
    assert_eq!(safe.required_signatures(&h.ledger).unwrap(), 2);
    assert_eq!(safe.owner(&h.ledger).unwrap(), pool.address().clone());
}

#[test]
fn resolved_pool_rejects_everything_else() {
    let mut h = Harness::new();
    let alice = h.fund("alice", Amount::units(2));
    let pool = h.deploy_pool(Amount::units(1), 30);
    pool.contribute(&mut h.ledger, &alice, Amount::units(1)).unwrap();
    h.advance(45);
    pool.finalize(&mut h.ledger, &alice, safe_config(&["alice", "bob"], 1))
        .unwrap();

    assert_eq!(
        pool.contribute(&mut h.ledger, &alice, Amount::milli(1)),
        Err(StakeError::Closed)
    );
    assert_eq!(
        pool.finalize(&mut h.ledger, &alice, safe_config(&["alice", "bob"], 1)),
        Err(StakeError::AlreadyFinalized)
    );
    assert_eq!(
        pool.withdraw(&mut h.ledger, &alice, &alice),
        Err(StakeError::WithdrawalsNotOpen)
    );
    assert_eq!(h.ledger.balance_of(&alice), Amount::units(1));
}

#[test]
fn finalize_before_deadline_changes_nothing() {
    let mut h = Harness::new();
    let alice = h.fund("alice", Amount::units(1));
    let pool = h.deploy_pool(Amount::units(1), 30);
    pool.contribute(&mut h.ledger, &alice, Amount::units(1)).unwrap();
    h.advance(29);

    assert_eq!(
        pool.finalize(&mut h.ledger, &alice, safe_config(&["alice", "bob"], 1)),
        Err(StakeError::DeadlineNotReached { remaining_secs: 1 })
    );
    assert!(!pool.staking_completed(&h.ledger).unwrap());
    assert!(h.ledger.state().safes.is_empty());

    // Contributions still flow until someone finalizes, even past the deadline
    h.advance(5);
    let bob = h.fund("bob", Amount::units(1));
    pool.contribute(&mut h.ledger, &bob, Amount::milli(250)).unwrap();
    assert_eq!(pool.total_balance(&h.ledger), Amount::milli(1_250));
}

#[test]
fn safe_funds_move_only_by_quorum() {
    let mut h = Harness::new();
    let alice = h.fund("alice", Amount::units(1));
    let pool = h.deploy_pool(Amount::milli(500), 10);
    pool.contribute(&mut h.ledger, &alice, Amount::units(1)).unwrap();
    h.advance(10);
    let PoolOutcome::SafeCreated(safe) = pool
        .finalize(&mut h.ledger, &addr("anyone"), safe_config(&["alice", "bob", "carol"], 2))
        .unwrap()
    else {
        panic!("threshold was met");
    };

    let id = safe
        .propose(&mut h.ledger, &alice, addr("vendor"), Amount::milli(600))
        .unwrap();
    safe.sign(&mut h.ledger, &addr("bob"), id).unwrap();
    assert_eq!(h.ledger.balance_of(&addr("vendor")), Amount::zero());

    safe.sign(&mut h.ledger, &addr("carol"), id).unwrap();
    assert_eq!(h.ledger.balance_of(&addr("vendor")), Amount::milli(600));
    assert_eq!(safe.balance(&h.ledger), Amount::milli(400));
}
