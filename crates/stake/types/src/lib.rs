//! Threshold Stake Domain Types
//!
//! This crate defines the records and value types shared by the stake
//! ledger, the Pool state machine and the Safe quorum engine.
//!
//! # Key Concepts
//!
//! - **Pool**: gathers contributions toward a threshold until a deadline,
//!   then resolves exactly once into either a Safe handoff or refunds.
//! - **Safe**: a vault with a fixed owner set; transfers execute once a
//!   quorum of owners other than the proposer has signed.
//! - **Events**: every observable state change is journaled as a
//!   [`LedgerEvent`] for external subscribers.
//!
//! # Architecture
//!
//! This is a pure types crate with no runtime dependencies. Records carry
//! their own invariants (a Pool's phase is a single enum, a Safe's signer
//! list never admits the proposer) so the engines cannot represent an
//! illegal state. IDs use the newtype pattern and implement `Display`.

#![deny(unsafe_code)]

mod address;
mod amount;
mod errors;
mod events;
mod pool;
mod safe;

pub use address::*;
pub use amount::*;
pub use errors::*;
pub use events::*;
pub use pool::*;
pub use safe::*;
