//! Property tests: finalize resolves a Pool into exactly one outcome,
//! chosen solely by whether the total reached the threshold.

use proptest::prelude::*;
use stake_pool::PoolOutcome;
use stake_tests::{addr, safe_config, Harness};
use stake_types::{Amount, StakeError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const STAKERS: [&str; 3] = ["alice", "bob", "carol"];

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn outcome_follows_threshold_and_refunds_are_exact(
        stakes in prop::collection::vec(0u128..1_000, STAKERS.len()),
        threshold in 1u128..2_500,
        late_by in 0i64..100,
    ) {
        let mut h = Harness::new();
        let pool = h.deploy_pool(Amount::milli(threshold), 30);
        for (name, milli) in STAKERS.iter().zip(&stakes) {
            let who = h.fund(name, Amount::units(1));
            if *milli > 0 {
                pool.contribute(&mut h.ledger, &who, Amount::milli(*milli)).unwrap();
            }
        }
        let total: u128 = stakes.iter().sum();
        h.advance(30 + late_by);

        let outcome = pool
            .finalize(&mut h.ledger, &addr("anyone"), safe_config(&STAKERS, 2))
            .unwrap();

        prop_assert!(pool.staking_completed(&h.ledger).unwrap());
        prop_assert_ne!(
            pool.safe_created(&h.ledger).unwrap(),
            pool.open_for_withdraw(&h.ledger).unwrap()
        );

        match outcome {
            PoolOutcome::SafeCreated(safe) => {
                prop_assert!(total >= threshold);
                prop_assert_eq!(safe.balance(&h.ledger), Amount::milli(total));
                prop_assert_eq!(pool.total_balance(&h.ledger), Amount::zero());
                for name in STAKERS {
                    prop_assert_eq!(
                        pool.withdraw(&mut h.ledger, &addr(name), &addr(name)),
                        Err(StakeError::WithdrawalsNotOpen)
                    );
                }
            }
            PoolOutcome::OpenForWithdraw { total: held } => {
                prop_assert!(total < threshold);
                prop_assert_eq!(held, Amount::milli(total));
                for (name, milli) in STAKERS.iter().zip(&stakes) {
                    let who = addr(name);
                    let first = pool.withdraw(&mut h.ledger, &who, &who);
                    if *milli == 0 {
                        prop_assert_eq!(first, Err(StakeError::NothingToWithdraw(who.clone())));
                    } else {
                        prop_assert_eq!(first, Ok(Amount::milli(*milli)));
                    }
                    prop_assert_eq!(h.ledger.balance_of(&who), Amount::units(1));
                    prop_assert_eq!(
                        pool.withdraw(&mut h.ledger, &who, &who),
                        Err(StakeError::NothingToWithdraw(who.clone()))
                    );
                }
                prop_assert_eq!(pool.total_balance(&h.ledger), Amount::zero());
            }
        }

        prop_assert_eq!(
            pool.finalize(&mut h.ledger, &addr("anyone"), safe_config(&STAKERS, 2)),
            Err(StakeError::AlreadyFinalized)
        );
    }

    #[test]
    fn finalize_before_deadline_always_fails(early_by in 1i64..30) {
        let mut h = Harness::new();
        let alice = h.fund("alice", Amount::units(2));
        let pool = h.deploy_pool(Amount::units(1), 30);
        pool.contribute(&mut h.ledger, &alice, Amount::units(2)).unwrap();
        h.advance(30 - early_by);

        prop_assert_eq!(
            pool.finalize(&mut h.ledger, &alice, safe_config(&["alice"], 1)),
            Err(StakeError::DeadlineNotReached { remaining_secs: early_by })
        );
        prop_assert!(!pool.staking_completed(&h.ledger).unwrap());
    }
}
