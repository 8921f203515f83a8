//! Ledger identities
//!
//! Every participant, Pool and Safe is addressed by an [`Address`].
//! Participant addresses are free-form; contract addresses are derived
//! from the creator and its deployment nonce.

use serde::{Deserialize, Serialize};

/// Stable identity of an account or contract on the ledger
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Generate a new random address
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create an address from a known string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the address of the `nonce`-th contract deployed by `creator`.
    ///
    /// Deterministic: the same creator and nonce always yield the same
    /// address, so replaying a ledger reproduces contract identities.
    pub fn contract(creator: &Address, nonce: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(creator.0.as_bytes());
        hasher.update(&nonce.to_le_bytes());
        let digest = hasher.finalize();
        Self(format!("0x{}", &digest.to_hex().as_str()[..40]))
    }

    /// Short display form (first 10 chars)
    pub fn short(&self) -> String {
        self.0.chars().take(10).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
