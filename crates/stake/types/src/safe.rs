//! Safe records: a fixed owner set and its proposed transfers
//!
//! A Safe is an M-of-N vault where the proposer's own approval never
//! counts. The record only stores state; the signing protocol lives in the
//! Safe engine.

use crate::{Address, Amount, StakeError, StakeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Index of a proposed transfer within its Safe
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub u64);

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner set and quorum for a new Safe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeConfig {
    pub owners: Vec<Address>,
    pub required_signatures: u32,
}

impl SafeConfig {
    pub fn new(owners: Vec<Address>, required_signatures: u32) -> Self {
        Self {
            owners,
            required_signatures,
        }
    }

    pub fn validate(&self) -> StakeResult<()> {
        if self.owners.is_empty() {
            return Err(StakeError::InvalidSafeConfig("owner list is empty".into()));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.owners.iter().find(|o| !seen.insert(*o)) {
            return Err(StakeError::InvalidSafeConfig(format!(
                "duplicate owner {}",
                dup
            )));
        }

        if self.required_signatures == 0 {
            return Err(StakeError::InvalidSafeConfig(
                "required signatures must be at least 1".into(),
            ));
        }

        if self.required_signatures as usize > self.owners.len() {
            return Err(StakeError::InvalidSafeConfig(format!(
                "required signatures {} exceeds owner count {}",
                self.required_signatures,
                self.owners.len()
            )));
        }

        Ok(())
    }

    /// Whether an owner's proposal can ever gather enough co-signers.
    ///
    /// The proposer cannot sign, so a quorum equal to the owner count is
    /// valid but unreachable.
    pub fn quorum_reachable(&self) -> bool {
        (self.required_signatures as usize) < self.owners.len()
    }
}

/// A proposed transfer out of a Safe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeTransaction {
    pub id: TransactionId,
    pub proposer: Address,
    pub recipient: Address,
    pub amount: Amount,
    /// Co-signers in signing order; never contains the proposer
    pub signers: Vec<Address>,
    pub executed: bool,
    pub proposed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
}

impl SafeTransaction {
    pub fn new(
        id: TransactionId,
        proposer: Address,
        recipient: Address,
        amount: Amount,
        proposed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            proposer,
            recipient,
            amount,
            signers: Vec::new(),
            executed: false,
            proposed_at,
            executed_at: None,
        }
    }

    pub fn has_signed(&self, signer: &Address) -> bool {
        self.signers.contains(signer)
    }

    pub fn signature_count(&self) -> usize {
        self.signers.len()
    }

    pub fn is_pending(&self) -> bool {
        !self.executed
    }
}

/// The persisted record of one Safe
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SafeState {
    /// Who deployed the Safe; reported as the primary owner
    pub creator: Address,
    pub owners: Vec<Address>,
    pub required_signatures: u32,
    pub created_at: DateTime<Utc>,
    transactions: Vec<SafeTransaction>,
}

impl SafeState {
    pub fn new(creator: Address, config: SafeConfig, created_at: DateTime<Utc>) -> StakeResult<Self> {
        config.validate()?;
        Ok(Self {
            creator,
            owners: config.owners,
            required_signatures: config.required_signatures,
            created_at,
            transactions: Vec::new(),
        })
    }

    pub fn is_owner(&self, who: &Address) -> bool {
        self.owners.contains(who)
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&SafeTransaction> {
        usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.transactions.get(idx))
    }

    pub fn transaction_mut(&mut self, id: TransactionId) -> Option<&mut SafeTransaction> {
        usize::try_from(id.0)
            .ok()
            .and_then(move |idx| self.transactions.get_mut(idx))
    }

    pub fn transactions(&self) -> &[SafeTransaction] {
        &self.transactions
    }

    /// Unexecuted transactions in creation order
    pub fn pending(&self) -> impl Iterator<Item = &SafeTransaction> {
        self.transactions.iter().filter(|tx| tx.is_pending())
    }

    /// Append a new proposal and return its id
    pub fn push_transaction(
        &mut self,
        proposer: Address,
        recipient: Address,
        amount: Amount,
        proposed_at: DateTime<Utc>,
    ) -> TransactionId {
        let id = TransactionId(self.transactions.len() as u64);
        self.transactions.push(SafeTransaction::new(
            id,
            proposer,
            recipient,
            amount,
            proposed_at,
        ));
        id
    }
}
