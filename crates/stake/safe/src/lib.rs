//! Safe: a quorum-gated vault
//!
//! A Safe holds native value for a fixed set of owners. Any owner may
//! propose a transfer; the transfer executes inside the signing call that
//! brings its co-signer count to the required quorum. The proposer's own
//! signature never counts toward that quorum.
//!
//! The Safe has no knowledge of Pools and can be deployed standalone.

#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};
use stake_ledger::Ledger;
use stake_types::{
    Address, Amount, LedgerEvent, SafeConfig, SafeState, SafeTransaction, StakeError, StakeResult,
    TransactionId,
};
use tracing::{debug, info, warn};

/// Result of a successful signing call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignOutcome {
    /// Signature recorded, quorum not yet reached
    Signed { signatures: usize, required: u32 },
    /// Signature reached quorum and the transfer left the Safe
    Executed,
}

/// Handle to a Safe living on a [`Ledger`]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Safe {
    address: Address,
}

impl Safe {
    /// Refer to an already deployed Safe
    pub fn at(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Deploy a new Safe owned by `config.owners`, endowed with
    /// `initial_value` taken from `creator`.
    pub fn deploy(
        ledger: &mut Ledger,
        creator: &Address,
        config: SafeConfig,
        initial_value: Amount,
    ) -> StakeResult<Safe> {
        config.validate()?;
        if !config.quorum_reachable() {
            warn!(
                owners = config.owners.len(),
                required = config.required_signatures,
                "Safe quorum equals owner count; proposals can never execute"
            );
        }

        ledger.frame(|ledger| {
            let address = ledger.next_contract_address(creator);
            let owners = config.owners.clone();
            let required_signatures = config.required_signatures;
            let state = SafeState::new(creator.clone(), config, ledger.now())?;
            ledger.insert_safe(address.clone(), state)?;

            if !initial_value.is_zero() {
                ledger.move_value(creator, &address, initial_value)?;
            }

            ledger.emit(
                &address,
                LedgerEvent::SafeDeployed {
                    creator: creator.clone(),
                    owners,
                    required_signatures,
                    initial_balance: initial_value,
                },
            );

            info!(
                safe = %address,
                creator = %creator,
                required = required_signatures,
                balance = %initial_value,
                "Safe deployed"
            );

            Ok(Safe { address })
        })
    }

    /// Propose sending `amount` to `recipient`
    pub fn propose(
        &self,
        ledger: &mut Ledger,
        caller: &Address,
        recipient: Address,
        amount: Amount,
    ) -> StakeResult<TransactionId> {
        ledger.invoke(&self.address, |ledger| {
            let available = ledger.balance_of(&self.address);
            let now = ledger.now();
            let safe = ledger.safe_mut(&self.address)?;

            if !safe.is_owner(caller) {
                warn!(safe = %self.address, caller = %caller, "Proposal from non-owner rejected");
                return Err(StakeError::NotAnOwner(caller.clone()));
            }
            if amount > available {
                return Err(StakeError::InsufficientFunds {
                    account: self.address.clone(),
                    required: amount,
                    available,
                });
            }

            let id = safe.push_transaction(caller.clone(), recipient.clone(), amount, now);

            info!(
                safe = %self.address,
                id = %id,
                proposer = %caller,
                recipient = %recipient,
                amount = %amount,
                "Transaction proposed"
            );

            ledger.emit(
                &self.address,
                LedgerEvent::TransactionCreated {
                    proposer: caller.clone(),
                    recipient,
                    amount,
                    id,
                },
            );

            Ok(id)
        })
    }

    /// Approve transaction `id`; executes it if this signature reaches quorum
    pub fn sign(
        &self,
        ledger: &mut Ledger,
        caller: &Address,
        id: TransactionId,
    ) -> StakeResult<SignOutcome> {
        ledger.invoke(&self.address, |ledger| {
            let available = ledger.balance_of(&self.address);
            let now = ledger.now();
            let safe = ledger.safe_mut(&self.address)?;

            if !safe.is_owner(caller) {
                warn!(safe = %self.address, caller = %caller, "Signature from non-owner rejected");
                return Err(StakeError::NotAnOwner(caller.clone()));
            }
            let required = safe.required_signatures;
            let tx = safe
                .transaction_mut(id)
                .ok_or(StakeError::NoSuchTransaction(id))?;

            if &tx.proposer == caller {
                return Err(StakeError::SelfSignForbidden(id));
            }
            if tx.has_signed(caller) {
                return Err(StakeError::AlreadySigned {
                    id,
                    signer: caller.clone(),
                });
            }
            if tx.executed {
                return Err(StakeError::AlreadyExecuted(id));
            }

            let reaches_quorum = tx.signature_count() + 1 == required as usize;
            if reaches_quorum && tx.amount > available {
                return Err(StakeError::InsufficientFunds {
                    account: self.address.clone(),
                    required: tx.amount,
                    available,
                });
            }

            tx.signers.push(caller.clone());
            let signatures = tx.signature_count();
            let payout = if reaches_quorum {
                tx.executed = true;
                tx.executed_at = Some(now);
                Some((tx.recipient.clone(), tx.amount))
            } else {
                None
            };

            debug!(
                safe = %self.address,
                id = %id,
                signer = %caller,
                signatures,
                required,
                "Transaction signed"
            );

            ledger.emit(
                &self.address,
                LedgerEvent::TransactionSigned {
                    signer: caller.clone(),
                    id,
                },
            );

            let Some((recipient, amount)) = payout else {
                return Ok(SignOutcome::Signed {
                    signatures,
                    required,
                });
            };

            ledger.transfer(&self.address, &recipient, amount)?;

            info!(
                safe = %self.address,
                id = %id,
                recipient = %recipient,
                amount = %amount,
                "Quorum reached, transaction executed"
            );

            ledger.emit(
                &self.address,
                LedgerEvent::TransactionExecuted {
                    id,
                    recipient,
                    amount,
                },
            );

            Ok(SignOutcome::Executed)
        })
    }

    // --- Query methods ---

    /// Unexecuted transactions in creation order
    pub fn pending_transactions(&self, ledger: &Ledger) -> StakeResult<Vec<SafeTransaction>> {
        Ok(ledger.safe(&self.address)?.pending().cloned().collect())
    }

    pub fn transaction(&self, ledger: &Ledger, id: TransactionId) -> StakeResult<SafeTransaction> {
        ledger
            .safe(&self.address)?
            .transaction(id)
            .cloned()
            .ok_or(StakeError::NoSuchTransaction(id))
    }

    pub fn transaction_count(&self, ledger: &Ledger) -> StakeResult<usize> {
        Ok(ledger.safe(&self.address)?.transactions().len())
    }

    pub fn required_signatures(&self, ledger: &Ledger) -> StakeResult<u32> {
        Ok(ledger.safe(&self.address)?.required_signatures)
    }

    /// The identity that deployed this Safe
    pub fn owner(&self, ledger: &Ledger) -> StakeResult<Address> {
        Ok(ledger.safe(&self.address)?.creator.clone())
    }

    pub fn owners(&self, ledger: &Ledger) -> StakeResult<Vec<Address>> {
        Ok(ledger.safe(&self.address)?.owners.clone())
    }

    pub fn is_owner(&self, ledger: &Ledger, who: &Address) -> StakeResult<bool> {
        Ok(ledger.safe(&self.address)?.is_owner(who))
    }

    pub fn balance(&self, ledger: &Ledger) -> Amount {
        ledger.balance_of(&self.address)
    }
}
