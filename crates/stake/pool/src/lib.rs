//! Pool: contributions toward a threshold by a deadline
//!
//! A Pool accepts contributions until someone finalizes it after the
//! deadline. Finalizing resolves the Pool exactly once:
//!
//! - **Threshold met**: the Pool's entire balance moves into a freshly
//!   deployed [`Safe`] owned by the caller-supplied owner set.
//! - **Threshold missed**: contributors may each reclaim their own stake.

#![deny(unsafe_code)]

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use stake_ledger::Ledger;
use stake_safe::Safe;
use stake_types::{
    Address, Amount, LedgerEvent, PoolConfig, PoolState, SafeConfig, StakeError, StakeResult,
};
use tracing::{info, warn};

/// How a successful `finalize` resolved the Pool
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolOutcome {
    /// Threshold met; the Safe now holds the pooled funds
    SafeCreated(Safe),
    /// Threshold missed; refunds are open
    OpenForWithdraw { total: Amount },
}

/// Handle to a Pool living on a [`Ledger`]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pool {
    address: Address,
}

impl Pool {
    /// Refer to an already deployed Pool
    pub fn at(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Deploy a new Pool; its deadline counts from the current ledger time
    pub fn deploy(ledger: &mut Ledger, creator: &Address, config: PoolConfig) -> StakeResult<Pool> {
        ledger.frame(|ledger| {
            let address = ledger.next_contract_address(creator);
            let state = PoolState::new(creator.clone(), &config, ledger.now());
            let deadline = state.deadline;
            ledger.insert_pool(address.clone(), state)?;

            info!(
                pool = %address,
                creator = %creator,
                threshold = %config.threshold,
                deadline = %deadline,
                "Pool deployed"
            );

            Ok(Pool { address })
        })
    }

    /// Stake `amount` of the caller's funds
    pub fn contribute(&self, ledger: &mut Ledger, caller: &Address, amount: Amount) -> StakeResult<Amount> {
        if amount.is_zero() {
            return Err(StakeError::ZeroAmount);
        }

        ledger.invoke(&self.address, |ledger| {
            if ledger.pool(&self.address)?.staking_completed() {
                warn!(pool = %self.address, caller = %caller, "Contribution after close rejected");
                return Err(StakeError::Closed);
            }

            ledger.move_value(caller, &self.address, amount)?;
            let balance = ledger.pool_mut(&self.address)?.credit(caller, amount)?;

            info!(
                pool = %self.address,
                contributor = %caller,
                amount = %amount,
                balance = %balance,
                "Contribution received"
            );

            ledger.emit(
                &self.address,
                LedgerEvent::Contributed {
                    contributor: caller.clone(),
                    amount,
                },
            );

            Ok(balance)
        })
    }

    /// Resolve the Pool once its deadline has passed.
    ///
    /// `safe_config` is only used when the threshold was met. Any caller
    /// may supply it, and the first successful call decides the Safe for
    /// good. A config whose `required_signatures` equals its owner count is
    /// accepted, but no proposal on that Safe can ever gather enough
    /// co-signers, so every pooled unit stays locked in it.
    pub fn finalize(
        &self,
        ledger: &mut Ledger,
        caller: &Address,
        safe_config: SafeConfig,
    ) -> StakeResult<PoolOutcome> {
        ledger.invoke(&self.address, |ledger| {
            let now = ledger.now();
            let pool = ledger.pool(&self.address)?;
            if !pool.has_deadline_passed(now) {
                return Err(StakeError::DeadlineNotReached {
                    remaining_secs: pool.time_remaining(now).num_seconds(),
                });
            }
            if pool.staking_completed() {
                return Err(StakeError::AlreadyFinalized);
            }
            let threshold = pool.threshold;
            let total = ledger.balance_of(&self.address);

            if total >= threshold {
                let safe = Safe::deploy(ledger, &self.address, safe_config, total)?;
                ledger
                    .pool_mut(&self.address)?
                    .complete_with_safe(safe.address().clone())?;

                info!(
                    pool = %self.address,
                    caller = %caller,
                    safe = %safe.address(),
                    total = %total,
                    threshold = %threshold,
                    "Threshold met, funds handed to safe"
                );

                ledger.emit(
                    &self.address,
                    LedgerEvent::SafeCreated {
                        address: safe.address().clone(),
                    },
                );
                Ok(PoolOutcome::SafeCreated(safe))
            } else {
                ledger.pool_mut(&self.address)?.open_withdrawals()?;

                info!(
                    pool = %self.address,
                    caller = %caller,
                    total = %total,
                    threshold = %threshold,
                    "Threshold missed, withdrawals open"
                );

                ledger.emit(&self.address, LedgerEvent::WithdrawalsOpened { total });
                Ok(PoolOutcome::OpenForWithdraw { total })
            }
        })
    }

    /// Pay `claimant` back their whole stake
    pub fn withdraw(&self, ledger: &mut Ledger, caller: &Address, claimant: &Address) -> StakeResult<Amount> {
        ledger.invoke(&self.address, |ledger| {
            let now = ledger.now();
            let pool = ledger.pool_mut(&self.address)?;

            if !pool.has_deadline_passed(now) {
                return Err(StakeError::DeadlineNotReached {
                    remaining_secs: pool.time_remaining(now).num_seconds(),
                });
            }
            if caller != claimant {
                warn!(pool = %self.address, caller = %caller, claimant = %claimant, "Withdrawal for another identity rejected");
                return Err(StakeError::NotOwnClaim {
                    caller: caller.clone(),
                    claimant: claimant.clone(),
                });
            }
            if !pool.open_for_withdraw() {
                return Err(StakeError::WithdrawalsNotOpen);
            }

            // Zeroed before the payout so a reentrant claim sees nothing
            let amount = pool.take_balance(claimant);
            if amount.is_zero() {
                return Err(StakeError::NothingToWithdraw(claimant.clone()));
            }

            ledger.transfer(&self.address, claimant, amount)?;

            info!(pool = %self.address, contributor = %claimant, amount = %amount, "Stake withdrawn");

            ledger.emit(
                &self.address,
                LedgerEvent::Withdrawn {
                    contributor: claimant.clone(),
                    amount,
                },
            );

            Ok(amount)
        })
    }

    // --- Query methods ---

    pub fn threshold(&self, ledger: &Ledger) -> StakeResult<Amount> {
        Ok(ledger.pool(&self.address)?.threshold)
    }

    pub fn deadline(&self, ledger: &Ledger) -> StakeResult<DateTime<Utc>> {
        Ok(ledger.pool(&self.address)?.deadline)
    }

    pub fn staking_completed(&self, ledger: &Ledger) -> StakeResult<bool> {
        Ok(ledger.pool(&self.address)?.staking_completed())
    }

    pub fn open_for_withdraw(&self, ledger: &Ledger) -> StakeResult<bool> {
        Ok(ledger.pool(&self.address)?.open_for_withdraw())
    }

    pub fn safe_created(&self, ledger: &Ledger) -> StakeResult<bool> {
        Ok(ledger.pool(&self.address)?.safe_created())
    }

    /// The Safe holding the pooled funds, once one exists
    pub fn safe_address(&self, ledger: &Ledger) -> StakeResult<Option<Safe>> {
        Ok(ledger.pool(&self.address)?.safe_address().cloned().map(Safe::at))
    }

    /// Time left until the deadline; zero once it has passed
    pub fn time_remaining(&self, ledger: &Ledger) -> StakeResult<Duration> {
        Ok(ledger.pool(&self.address)?.time_remaining(ledger.now()))
    }

    /// Outstanding contribution of `participant`
    pub fn balance_of(&self, ledger: &Ledger, participant: &Address) -> StakeResult<Amount> {
        Ok(ledger.pool(&self.address)?.balance_of(participant))
    }

    /// Native value the Pool currently holds
    pub fn total_balance(&self, ledger: &Ledger) -> Amount {
        ledger.balance_of(&self.address)
    }

    pub fn contributors(&self, ledger: &Ledger) -> StakeResult<Vec<Address>> {
        Ok(ledger.pool(&self.address)?.contributors())
    }
}
