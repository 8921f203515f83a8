//! Shared fixtures for the cross-crate stake test suites.

use chrono::Duration;
use stake_ledger::{Ledger, ManualClock};
use stake_pool::Pool;
use stake_types::{Address, Amount, PoolConfig, SafeConfig};

/// Identity that deploys pools in every scenario
pub const DEPLOYER: &str = "deployer";

pub fn addr(name: &str) -> Address {
    Address::new(name)
}

pub fn safe_config(owners: &[&str], required: u32) -> SafeConfig {
    SafeConfig::new(owners.iter().map(|o| addr(o)).collect(), required)
}

/// A ledger on a manual clock
pub struct Harness {
    pub ledger: Ledger,
    pub clock: ManualClock,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        let clock = ManualClock::starting_now();
        Self {
            ledger: Ledger::with_clock(clock.clone()),
            clock,
        }
    }

    /// Mint `amount` to `name` and return its address
    pub fn fund(&mut self, name: &str, amount: Amount) -> Address {
        let address = addr(name);
        self.ledger
            .mint(&address, amount)
            .expect("minting test funds");
        address
    }

    pub fn advance(&self, secs: i64) {
        self.clock.advance(Duration::seconds(secs));
    }

    pub fn deploy_pool(&mut self, threshold: Amount, duration_secs: u64) -> Pool {
        Pool::deploy(
            &mut self.ledger,
            &addr(DEPLOYER),
            PoolConfig::new(threshold, duration_secs),
        )
        .expect("deploying pool")
    }

    /// Sum of every balance on the ledger
    pub fn total_supply(&self) -> Amount {
        self.ledger.state().balances.values().copied().sum()
    }
}
