//! # stake-ledger
//!
//! The explicit store every Pool and Safe operation runs against.
//!
//! - **Balances**: native value held by each address, contracts included
//! - **Records**: one [`PoolState`](stake_types::PoolState) or
//!   [`SafeState`](stake_types::SafeState) per contract address
//! - **Journal**: append-only [`EventRecord`](stake_types::EventRecord)s
//! - **Clock**: ledger time, read fresh on every call
//!
//! ## Call frames
//!
//! State-changing calls run inside [`Ledger::invoke`]. A frame snapshots the
//! store on entry and restores it if the call fails, so no partial effect
//! survives an error. Frames also hold the contract's entry guard: a
//! contract that is already executing cannot be re-entered, even from a
//! [`Receiver`] hook triggered by one of its own payouts.

#![deny(unsafe_code)]

pub mod clock;
pub mod ledger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::{Ledger, LedgerState, Receiver};
