//! The ledger store and its call frames

use crate::clock::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use stake_types::{
    Address, Amount, EventRecord, LedgerEvent, PoolState, SafeState, StakeError, StakeResult,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Code that runs when an address receives value.
///
/// A receiver gets the ledger mutably, so it can call back into any
/// contract, including the one that paid it. Returning an error rejects
/// the payment and reverts the paying call.
pub trait Receiver: Send + Sync {
    fn on_receive(&self, ledger: &mut Ledger, from: &Address, amount: Amount) -> StakeResult<()>;
}

/// Everything a call frame may change; snapshotted and restored as a unit
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerState {
    /// Native value held per address
    pub balances: BTreeMap<Address, Amount>,
    pub pools: BTreeMap<Address, PoolState>,
    pub safes: BTreeMap<Address, SafeState>,
    /// Append-only event journal
    pub journal: Vec<EventRecord>,
    /// Contract deployments per creator, for address derivation
    pub nonces: BTreeMap<Address, u64>,
}

/// The shared store for Pools, Safes and participant balances
pub struct Ledger {
    state: LedgerState,
    clock: Arc<dyn Clock>,
    /// Contracts with a call currently on the stack
    executing: BTreeSet<Address>,
    /// Who holds control right now: a contract, or `None` for external code
    /// (a receiver hook or a top-level participant call)
    controllers: Vec<Option<Address>>,
    receivers: HashMap<Address, Arc<dyn Receiver>>,
    depth: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create an empty ledger on wall-clock time
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self::from_state(LedgerState::default(), clock)
    }

    /// Resume from a previously exported state
    pub fn from_state(state: LedgerState, clock: impl Clock + 'static) -> Self {
        Self {
            state,
            clock: Arc::new(clock),
            executing: BTreeSet::new(),
            controllers: Vec::new(),
            receivers: HashMap::new(),
            depth: 0,
        }
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Serialize the whole store for inspection or later [`Ledger::from_state`]
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.state)
    }

    // --- Balances ---

    pub fn balance_of(&self, address: &Address) -> Amount {
        self.state
            .balances
            .get(address)
            .copied()
            .unwrap_or_default()
    }

    /// Create value out of thin air for a participant (genesis/faucet)
    pub fn mint(&mut self, to: &Address, amount: Amount) -> StakeResult<Amount> {
        let balance = self.state.balances.entry(to.clone()).or_default();
        *balance = balance.checked_add(amount).ok_or(StakeError::Overflow)?;
        info!(account = %to, amount = %amount, balance = %balance, "Minted");
        Ok(*balance)
    }

    /// Move value between balances without running receive hooks.
    ///
    /// Used for value attached to a call (contributions, deployment
    /// endowments), where the receiving contract is the one executing.
    /// A Pool or Safe balance can only be debited by that contract's own
    /// call while it holds control.
    pub fn move_value(&mut self, from: &Address, to: &Address, amount: Amount) -> StakeResult<()> {
        self.ensure_may_debit(from)?;
        let available = self.balance_of(from);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| StakeError::InsufficientFunds {
                account: from.clone(),
                required: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;

        self.state.balances.insert(from.clone(), remaining);
        self.state.balances.insert(to.clone(), credited);
        Ok(())
    }

    /// Pay `to`, then hand control to its receiver if one is registered.
    ///
    /// Callers must finish their own state changes first: the receiver
    /// observes the ledger exactly as the payer left it.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> StakeResult<()> {
        self.move_value(from, to, amount)?;

        debug!(from = %from, to = %to, amount = %amount, "Value transferred");

        if let Some(receiver) = self.receivers.get(to).cloned() {
            self.controllers.push(None);
            let result = receiver.on_receive(self, from, amount);
            self.controllers.pop();
            result?;
        }
        Ok(())
    }

    /// A plain payment between participants, as its own call frame.
    ///
    /// Contract custody never moves this way.
    pub fn send(&mut self, from: &Address, to: &Address, amount: Amount) -> StakeResult<()> {
        if self.is_contract(from) {
            warn!(from = %from, to = %to, amount = %amount, "Direct debit of contract custody rejected");
            return Err(StakeError::ContractCustody(from.clone()));
        }
        self.frame(|ledger| ledger.transfer(from, to, amount))
    }

    fn ensure_may_debit(&self, from: &Address) -> StakeResult<()> {
        if !self.is_contract(from) {
            return Ok(());
        }
        match self.controllers.last() {
            Some(Some(active)) if active == from => Ok(()),
            _ => {
                warn!(contract = %from, "Debit outside the contract's own call rejected");
                Err(StakeError::ContractCustody(from.clone()))
            }
        }
    }

    pub fn register_receiver(&mut self, address: Address, receiver: Arc<dyn Receiver>) {
        self.receivers.insert(address, receiver);
    }

    pub fn remove_receiver(&mut self, address: &Address) {
        self.receivers.remove(address);
    }

    // --- Contract records ---

    pub fn pool(&self, address: &Address) -> StakeResult<&PoolState> {
        self.state
            .pools
            .get(address)
            .ok_or_else(|| StakeError::UnknownContract(address.clone()))
    }

    pub fn pool_mut(&mut self, address: &Address) -> StakeResult<&mut PoolState> {
        self.state
            .pools
            .get_mut(address)
            .ok_or_else(|| StakeError::UnknownContract(address.clone()))
    }

    pub fn safe(&self, address: &Address) -> StakeResult<&SafeState> {
        self.state
            .safes
            .get(address)
            .ok_or_else(|| StakeError::UnknownContract(address.clone()))
    }

    pub fn safe_mut(&mut self, address: &Address) -> StakeResult<&mut SafeState> {
        self.state
            .safes
            .get_mut(address)
            .ok_or_else(|| StakeError::UnknownContract(address.clone()))
    }

    pub fn insert_pool(&mut self, address: Address, pool: PoolState) -> StakeResult<()> {
        self.ensure_unused(&address)?;
        self.state.pools.insert(address, pool);
        Ok(())
    }

    pub fn insert_safe(&mut self, address: Address, safe: SafeState) -> StakeResult<()> {
        self.ensure_unused(&address)?;
        self.state.safes.insert(address, safe);
        Ok(())
    }

    /// Whether `address` holds a Pool or Safe record
    pub fn is_contract(&self, address: &Address) -> bool {
        self.state.pools.contains_key(address) || self.state.safes.contains_key(address)
    }

    fn ensure_unused(&self, address: &Address) -> StakeResult<()> {
        if self.state.pools.contains_key(address) || self.state.safes.contains_key(address) {
            return Err(StakeError::AddressInUse(address.clone()));
        }
        Ok(())
    }

    /// Allocate the address for `creator`'s next contract
    pub fn next_contract_address(&mut self, creator: &Address) -> Address {
        loop {
            let nonce = self.state.nonces.entry(creator.clone()).or_insert(0);
            let candidate = Address::contract(creator, *nonce);
            *nonce += 1;
            if self.ensure_unused(&candidate).is_ok() {
                return candidate;
            }
        }
    }

    // --- Events ---

    /// Journal an event and return its sequence number
    pub fn emit(&mut self, emitter: &Address, event: LedgerEvent) -> u64 {
        let sequence = self.state.journal.len() as u64;
        debug!(emitter = %emitter, sequence, event = event.name(), "Event emitted");
        self.state.journal.push(EventRecord {
            sequence,
            emitter: emitter.clone(),
            event,
            timestamp: self.clock.now(),
        });
        sequence
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.state.journal
    }

    pub fn events_from<'a>(&'a self, emitter: &'a Address) -> impl Iterator<Item = &'a EventRecord> {
        self.state
            .journal
            .iter()
            .filter(move |record| &record.emitter == emitter)
    }

    /// Events at or after `sequence`, for incremental subscribers
    pub fn events_since(&self, sequence: u64) -> &[EventRecord] {
        let start = usize::try_from(sequence)
            .unwrap_or(usize::MAX)
            .min(self.state.journal.len());
        &self.state.journal[start..]
    }

    // --- Call frames ---

    /// Run `f` all-or-nothing: on error every change it made is undone.
    pub fn frame<T>(&mut self, f: impl FnOnce(&mut Ledger) -> StakeResult<T>) -> StakeResult<T> {
        let snapshot = self.state.clone();
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        if let Err(err) = &result {
            debug!(depth = self.depth, error = %err, "Call frame reverted");
            self.state = snapshot;
        }
        result
    }

    /// Run a call into `contract` as a guarded frame.
    ///
    /// Fails with [`StakeError::Reentrancy`] if `contract` already has a
    /// call on the stack.
    pub fn invoke<T>(
        &mut self,
        contract: &Address,
        f: impl FnOnce(&mut Ledger) -> StakeResult<T>,
    ) -> StakeResult<T> {
        if !self.executing.insert(contract.clone()) {
            warn!(contract = %contract, "Reentrant call rejected");
            return Err(StakeError::Reentrancy(contract.clone()));
        }
        self.controllers.push(Some(contract.clone()));
        let result = self.frame(f);
        self.controllers.pop();
        self.executing.remove(contract);
        result
    }

    pub fn is_executing(&self, contract: &Address) -> bool {
        self.executing.contains(contract)
    }

    /// Nesting level of the frame currently running, 0 outside any call
    pub fn depth(&self) -> usize {
        self.depth
    }
}
