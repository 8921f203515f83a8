//! Error types for Pool, Safe and ledger operations

use crate::{Address, Amount, TransactionId};

/// Errors that can occur in stake operations.
///
/// Every variant aborts the whole call; the ledger rolls back any state the
/// call touched before the error surfaced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StakeError {
    #[error("Contract completed: staking is closed")]
    Closed,

    #[error("Contract completed: pool already finalized")]
    AlreadyFinalized,

    #[error("Deadline has not passed yet: {remaining_secs}s remaining")]
    DeadlineNotReached { remaining_secs: i64 },

    #[error("Not allowed to withdraw balance that does not belong to you: caller {caller}, claimant {claimant}")]
    NotOwnClaim { caller: Address, claimant: Address },

    #[error("The balance is zero, nothing to withdraw: {0}")]
    NothingToWithdraw(Address),

    #[error("Withdrawals are not open on this pool")]
    WithdrawalsNotOpen,

    #[error("Contribution amount must be greater than zero")]
    ZeroAmount,

    #[error("Transaction does not exist: {0}")]
    NoSuchTransaction(TransactionId),

    #[error("Transaction creator can not sign it: {0}")]
    SelfSignForbidden(TransactionId),

    #[error("Transaction already signed: {id} by {signer}")]
    AlreadySigned { id: TransactionId, signer: Address },

    #[error("Transaction already executed: {0}")]
    AlreadyExecuted(TransactionId),

    #[error("Not a safe owner: {0}")]
    NotAnOwner(Address),

    #[error("Invalid safe configuration: {0}")]
    InvalidSafeConfig(String),

    #[error("Insufficient funds in {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Unknown contract: {0}")]
    UnknownContract(Address),

    #[error("Address already in use: {0}")]
    AddressInUse(Address),

    #[error("Funds held by {0} can only be moved by its own logic")]
    ContractCustody(Address),

    #[error("Pool {0} has not created a safe")]
    SafeNotCreated(Address),

    #[error("Reentrant call into {0} rejected")]
    Reentrancy(Address),

    #[error("Payment rejected by {recipient}: {reason}")]
    PaymentRejected { recipient: Address, reason: String },

    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Result type alias for stake operations
pub type StakeResult<T> = Result<T, StakeError>;
