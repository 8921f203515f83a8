//! Pool records: contributions toward a threshold by a deadline
//!
//! The Pool's resolution is carried by [`PoolPhase`]. Because the phase is
//! a single enum, "completed", "open for withdraw" and "safe created" can
//! never disagree: the booleans observers read are projections of it.

use crate::{Address, Amount, StakeError, StakeResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolution state of a Pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PoolPhase {
    /// Accepting contributions
    #[default]
    Open,
    /// Finalized at or above threshold; funds live in the Safe
    SafeCreated { safe: Address },
    /// Finalized below threshold; contributors may reclaim stakes
    OpenForWithdraw,
}

impl PoolPhase {
    pub fn is_open(&self) -> bool {
        matches!(self, PoolPhase::Open)
    }
}

/// Parameters for a new Pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Minimum aggregate contribution for the Safe handoff
    pub threshold: Amount,
    /// Seconds from creation until the deadline
    pub duration_secs: u64,
}

impl PoolConfig {
    pub fn new(threshold: Amount, duration_secs: u64) -> Self {
        Self {
            threshold,
            duration_secs,
        }
    }

    pub fn duration(&self) -> Duration {
        i64::try_from(self.duration_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }
}

/// The persisted record of one Pool
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolState {
    /// Who deployed the pool
    pub creator: Address,
    pub threshold: Amount,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    /// Contributed amount per participant; entries are zeroed, never removed
    balances: BTreeMap<Address, Amount>,
    phase: PoolPhase,
}

impl PoolState {
    pub fn new(creator: Address, config: &PoolConfig, created_at: DateTime<Utc>) -> Self {
        let deadline = created_at
            .checked_add_signed(config.duration())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            creator,
            threshold: config.threshold,
            created_at,
            deadline,
            balances: BTreeMap::new(),
            phase: PoolPhase::Open,
        }
    }

    pub fn phase(&self) -> &PoolPhase {
        &self.phase
    }

    pub fn staking_completed(&self) -> bool {
        !self.phase.is_open()
    }

    pub fn open_for_withdraw(&self) -> bool {
        matches!(self.phase, PoolPhase::OpenForWithdraw)
    }

    pub fn safe_created(&self) -> bool {
        matches!(self.phase, PoolPhase::SafeCreated { .. })
    }

    pub fn safe_address(&self) -> Option<&Address> {
        match &self.phase {
            PoolPhase::SafeCreated { safe } => Some(safe),
            _ => None,
        }
    }

    pub fn has_deadline_passed(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    /// Time left until the deadline, zero once it has passed
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.has_deadline_passed(now) {
            Duration::zero()
        } else {
            self.deadline - now
        }
    }

    pub fn balance_of(&self, participant: &Address) -> Amount {
        self.balances.get(participant).copied().unwrap_or_default()
    }

    /// Everyone who ever contributed, including those already refunded
    pub fn contributors(&self) -> Vec<Address> {
        self.balances.keys().cloned().collect()
    }

    /// Sum of all outstanding contributions
    pub fn total_contributed(&self) -> Amount {
        self.balances.values().copied().sum()
    }

    /// Credit a contribution, returning the participant's new balance
    pub fn credit(&mut self, participant: &Address, amount: Amount) -> StakeResult<Amount> {
        if !self.phase.is_open() {
            return Err(StakeError::Closed);
        }
        let entry = self.balances.entry(participant.clone()).or_default();
        *entry = entry.checked_add(amount).ok_or(StakeError::Overflow)?;
        Ok(*entry)
    }

    /// Zero a participant's balance and return what it held
    pub fn take_balance(&mut self, participant: &Address) -> Amount {
        match self.balances.get_mut(participant) {
            Some(balance) => std::mem::take(balance),
            None => Amount::zero(),
        }
    }

    /// Resolve into the Safe handoff
    pub fn complete_with_safe(&mut self, safe: Address) -> StakeResult<()> {
        if !self.phase.is_open() {
            return Err(StakeError::AlreadyFinalized);
        }
        self.phase = PoolPhase::SafeCreated { safe };
        Ok(())
    }

    /// Resolve into refunds
    pub fn open_withdrawals(&mut self) -> StakeResult<()> {
        if !self.phase.is_open() {
            return Err(StakeError::AlreadyFinalized);
        }
        self.phase = PoolPhase::OpenForWithdraw;
        Ok(())
    }
}
