//! Adversarial test: a Safe payout recipient that calls back into the Safe.
//!
//! The transaction is marked executed before value leaves the Safe and the
//! Safe cannot be re-entered mid-call, so a payout happens exactly once.

use stake_ledger::{Ledger, Receiver};
use stake_safe::Safe;
use stake_tests::{addr, safe_config, Harness};
use stake_types::{Address, Amount, StakeError, StakeResult, TransactionId};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// An owner that is also the recipient and tries to act again on receipt
struct GreedyOwner {
    safe: Safe,
    me: Address,
    seen: Mutex<Vec<String>>,
}

impl Receiver for GreedyOwner {
    fn on_receive(&self, ledger: &mut Ledger, _from: &Address, _amount: Amount) -> StakeResult<()> {
        let resign = self.safe.sign(ledger, &self.me, TransactionId(0));
        let repropose = self
            .safe
            .propose(ledger, &self.me, self.me.clone(), Amount::milli(1));
        let mut seen = self.seen.lock().unwrap();
        seen.push(format!("{:?}", resign.err()));
        seen.push(format!("{:?}", repropose.err()));
        Ok(())
    }
}

/// Pays on receipt into a different contract
struct Forwarder {
    safe: Safe,
    me: Address,
}

impl Receiver for Forwarder {
    fn on_receive(&self, ledger: &mut Ledger, _from: &Address, _amount: Amount) -> StakeResult<()> {
        self.safe
            .propose(ledger, &self.me, addr("elsewhere"), Amount::milli(1))
            .map(|_| ())
    }
}

fn deploy(h: &mut Harness, owners: &[&str], required: u32) -> Safe {
    let creator = h.fund(&format!("creator-{}", owners.join("-")), Amount::units(1));
    Safe::deploy(
        &mut h.ledger,
        &creator,
        safe_config(owners, required),
        Amount::units(1),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn payout_hook_cannot_reenter_the_safe() {
    let mut h = Harness::new();
    let safe = deploy(&mut h, &["a", "b", "greedy"], 1);
    let greedy = addr("greedy");
    let hook = Arc::new(GreedyOwner {
        safe: safe.clone(),
        me: greedy.clone(),
        seen: Mutex::new(Vec::new()),
    });
    h.ledger.register_receiver(greedy.clone(), hook.clone());

    let id = safe
        .propose(&mut h.ledger, &addr("a"), greedy.clone(), Amount::milli(100))
        .unwrap();
    safe.sign(&mut h.ledger, &addr("b"), id).unwrap();

    let reentry = format!("{:?}", Some(StakeError::Reentrancy(safe.address().clone())));
    assert_eq!(hook.seen.lock().unwrap().as_slice(), &[reentry.clone(), reentry]);
    assert_eq!(h.ledger.balance_of(&greedy), Amount::milli(100));
    assert_eq!(safe.transaction_count(&h.ledger).unwrap(), 1);

    // Outside the payout the normal rules apply
    assert_eq!(
        safe.sign(&mut h.ledger, &greedy, id),
        Err(StakeError::AlreadyExecuted(id))
    );
}

#[test]
fn payout_hook_may_call_another_contract() {
    let mut h = Harness::new();
    let treasury = deploy(&mut h, &["a", "b"], 1);
    let other = deploy(&mut h, &["fwd", "c"], 1);
    let forwarder = addr("fwd");
    h.ledger.register_receiver(
        forwarder.clone(),
        Arc::new(Forwarder {
            safe: other.clone(),
            me: forwarder.clone(),
        }),
    );

    let id = treasury
        .propose(&mut h.ledger, &addr("a"), forwarder.clone(), Amount::milli(100))
        .unwrap();
    treasury.sign(&mut h.ledger, &addr("b"), id).unwrap();

    assert_eq!(h.ledger.balance_of(&forwarder), Amount::milli(100));
    assert_eq!(other.pending_transactions(&h.ledger).unwrap().len(), 1);
}
