//! Scripted scenarios
//!
//! A scenario deploys one Pool on a fresh ledger driven by a
//! [`ManualClock`], then replays its steps in order. A step that the
//! contracts reject is recorded and the run continues: the ledger has
//! already rolled the failed call back.

use crate::config::{parse_amount, StakeConfig};
use crate::error::{CliError, CliResult};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use stake_ledger::{Ledger, ManualClock};
use stake_pool::{Pool, PoolOutcome};
use stake_safe::{Safe, SignOutcome};
use stake_types::{Address, Amount, EventRecord, StakeError, TransactionId};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// One scripted action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Contribute { caller: String, amount: String },
    /// Move ledger time forward
    Advance { secs: u64 },
    Finalize { caller: String },
    /// Reclaim a stake; `claimant` defaults to the caller
    Withdraw {
        caller: String,
        #[serde(default)]
        claimant: Option<String>,
    },
    Propose {
        caller: String,
        recipient: String,
        amount: String,
    },
    Sign { caller: String, id: u64 },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Contribute { .. } => "contribute",
            Step::Advance { .. } => "advance",
            Step::Finalize { .. } => "finalize",
            Step::Withdraw { .. } => "withdraw",
            Step::Propose { .. } => "propose",
            Step::Sign { .. } => "sign",
        }
    }

    /// Check the step's amounts and durations without running it
    pub fn validate(&self) -> CliResult<()> {
        match self {
            Step::Contribute { amount, .. } | Step::Propose { amount, .. } => {
                parse_amount("amount", amount).map(|_| ())
            }
            Step::Advance { secs } => advance_duration(*secs).map(|_| ()),
            _ => Ok(()),
        }
    }
}

fn advance_duration(secs: u64) -> CliResult<Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| CliError::Config(format!("advance of {} seconds is out of range", secs)))
}

/// What happened to one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Ok { detail: String },
    Rejected { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub index: usize,
    pub action: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSummary {
    pub address: Address,
    pub threshold: String,
    pub total_balance: String,
    pub staking_completed: bool,
    pub open_for_withdraw: bool,
    pub safe_created: bool,
    pub time_remaining_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeSummary {
    pub address: Address,
    pub balance: String,
    pub required_signatures: u32,
    pub transactions: usize,
    pub pending: Vec<u64>,
}

/// Everything a scenario run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub steps: Vec<StepReport>,
    pub pool: PoolSummary,
    pub safe: Option<SafeSummary>,
    /// Final balance of every account, in whole units
    pub balances: BTreeMap<Address, String>,
    pub events: Vec<EventRecord>,
}

impl ScenarioReport {
    pub fn rejected(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Rejected { .. }))
            .count()
    }
}

/// A Pool deployment being driven step by step
pub struct Scenario {
    ledger: Ledger,
    clock: ManualClock,
    pool: Pool,
    safe_config: stake_types::SafeConfig,
}

impl Scenario {
    /// Fund the genesis accounts and deploy the Pool
    pub fn new(config: &StakeConfig) -> CliResult<Self> {
        let clock = ManualClock::starting_now();
        let mut ledger = Ledger::with_clock(clock.clone());

        for (address, balance) in config.genesis()? {
            ledger.mint(&address, balance)?;
        }

        let deployer = Address::new(config.pool.deployer.as_str());
        let pool = Pool::deploy(&mut ledger, &deployer, config.pool_config()?)?;

        Ok(Self {
            ledger,
            clock,
            pool,
            safe_config: config.safe_config(),
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Run one step. `Err` means the step itself is malformed; a rejection
    /// by the contracts comes back as [`StepStatus::Rejected`].
    pub fn apply(&mut self, step: &Step) -> CliResult<StepStatus> {
        let result = match step {
            Step::Contribute { caller, amount } => {
                let amount = parse_amount("amount", amount)?;
                self.pool
                    .contribute(&mut self.ledger, &Address::new(caller.as_str()), amount)
                    .map(|balance| format!("stake now {}", balance.to_units_string()))
            }
            Step::Advance { secs } => {
                self.clock.advance(advance_duration(*secs)?);
                Ok(format!("clock advanced {}s", secs))
            }
            Step::Finalize { caller } => self
                .pool
                .finalize(
                    &mut self.ledger,
                    &Address::new(caller.as_str()),
                    self.safe_config.clone(),
                )
                .map(|outcome| match outcome {
                    PoolOutcome::SafeCreated(safe) => format!("safe created at {}", safe.address()),
                    PoolOutcome::OpenForWithdraw { total } => {
                        format!("withdrawals open, {} held", total.to_units_string())
                    }
                }),
            Step::Withdraw { caller, claimant } => {
                let caller = Address::new(caller.as_str());
                let claimant = claimant
                    .as_deref()
                    .map(Address::new)
                    .unwrap_or_else(|| caller.clone());
                self.pool
                    .withdraw(&mut self.ledger, &caller, &claimant)
                    .map(|amount| format!("refunded {}", amount.to_units_string()))
            }
            Step::Propose {
                caller,
                recipient,
                amount,
            } => {
                let amount = parse_amount("amount", amount)?;
                self.safe().and_then(|safe| {
                    safe.propose(
                        &mut self.ledger,
                        &Address::new(caller.as_str()),
                        Address::new(recipient.as_str()),
                        amount,
                    )
                    .map(|id| format!("transaction {} proposed", id))
                })
            }
            Step::Sign { caller, id } => self.safe().and_then(|safe| {
                safe.sign(&mut self.ledger, &Address::new(caller.as_str()), TransactionId(*id))
                    .map(|outcome| match outcome {
                        SignOutcome::Signed {
                            signatures,
                            required,
                        } => format!("signed {}/{}", signatures, required),
                        SignOutcome::Executed => format!("transaction {} executed", id),
                    })
            }),
        };

        Ok(match result {
            Ok(detail) => StepStatus::Ok { detail },
            Err(err) => StepStatus::Rejected {
                error: err.to_string(),
            },
        })
    }

    fn safe(&self) -> Result<Safe, StakeError> {
        self.pool
            .safe_address(&self.ledger)?
            .ok_or_else(|| StakeError::SafeNotCreated(self.pool.address().clone()))
    }

    pub fn report(&self, steps: Vec<StepReport>) -> CliResult<ScenarioReport> {
        let pool = PoolSummary {
            address: self.pool.address().clone(),
            threshold: self.pool.threshold(&self.ledger)?.to_units_string(),
            total_balance: self.pool.total_balance(&self.ledger).to_units_string(),
            staking_completed: self.pool.staking_completed(&self.ledger)?,
            open_for_withdraw: self.pool.open_for_withdraw(&self.ledger)?,
            safe_created: self.pool.safe_created(&self.ledger)?,
            time_remaining_secs: self.pool.time_remaining(&self.ledger)?.num_seconds(),
        };

        let safe = match self.pool.safe_address(&self.ledger)? {
            Some(safe) => Some(SafeSummary {
                address: safe.address().clone(),
                balance: safe.balance(&self.ledger).to_units_string(),
                required_signatures: safe.required_signatures(&self.ledger)?,
                transactions: safe.transaction_count(&self.ledger)?,
                pending: safe
                    .pending_transactions(&self.ledger)?
                    .iter()
                    .map(|tx| tx.id.0)
                    .collect(),
            }),
            None => None,
        };

        let balances = self
            .ledger
            .state()
            .balances
            .iter()
            .map(|(address, amount)| (address.clone(), amount.to_units_string()))
            .collect();

        Ok(ScenarioReport {
            steps,
            pool,
            safe,
            balances,
            events: self.ledger.events().to_vec(),
        })
    }
}

/// Run every step of `config` and report the outcome
pub fn run(config: &StakeConfig) -> CliResult<(Scenario, ScenarioReport)> {
    let mut scenario = Scenario::new(config)?;
    let mut steps = Vec::with_capacity(config.steps.len());

    for (index, step) in config.steps.iter().enumerate() {
        let status = scenario.apply(step)?;
        match &status {
            StepStatus::Ok { detail } => {
                info!(index, action = step.name(), detail = %detail, "Step applied")
            }
            StepStatus::Rejected { error } => {
                warn!(index, action = step.name(), error = %error, "Step rejected")
            }
        }
        steps.push(StepReport {
            index,
            action: step.name().to_string(),
            status,
        });
    }

    let report = scenario.report(steps)?;
    Ok((scenario, report))
}
