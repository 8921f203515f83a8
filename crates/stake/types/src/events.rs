//! Ledger events
//!
//! Events are the subscription surface for observers outside the core.
//! Each event is journaled once, in commit order, together with the
//! contract that emitted it.

use crate::{Address, Amount, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An observable state change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A participant added funds to a Pool
    Contributed { contributor: Address, amount: Amount },

    /// A Pool finalized at or above threshold and handed its balance to a Safe
    SafeCreated { address: Address },

    /// A Pool finalized below threshold; contributors may reclaim stakes
    WithdrawalsOpened { total: Amount },

    /// A contributor reclaimed their stake
    Withdrawn { contributor: Address, amount: Amount },

    /// A Safe came into existence
    SafeDeployed {
        creator: Address,
        owners: Vec<Address>,
        required_signatures: u32,
        initial_balance: Amount,
    },

    /// An owner proposed a transfer out of a Safe
    TransactionCreated {
        proposer: Address,
        recipient: Address,
        amount: Amount,
        id: TransactionId,
    },

    /// An owner approved a proposed transfer
    TransactionSigned { signer: Address, id: TransactionId },

    /// A proposed transfer reached quorum and left the Safe
    TransactionExecuted {
        id: TransactionId,
        recipient: Address,
        amount: Amount,
    },
}

impl LedgerEvent {
    /// Stable event name, matching the serialized tag
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::Contributed { .. } => "contributed",
            LedgerEvent::SafeCreated { .. } => "safe_created",
            LedgerEvent::WithdrawalsOpened { .. } => "withdrawals_opened",
            LedgerEvent::Withdrawn { .. } => "withdrawn",
            LedgerEvent::SafeDeployed { .. } => "safe_deployed",
            LedgerEvent::TransactionCreated { .. } => "transaction_created",
            LedgerEvent::TransactionSigned { .. } => "transaction_signed",
            LedgerEvent::TransactionExecuted { .. } => "transaction_executed",
        }
    }
}

/// A journaled event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the journal, starting at 0
    pub sequence: u64,
    /// Contract that emitted the event
    pub emitter: Address,
    pub event: LedgerEvent,
    /// Ledger time at emission
    pub timestamp: DateTime<Utc>,
}
