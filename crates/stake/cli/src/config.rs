//! Scenario configuration

use crate::error::{CliError, CliResult};
use crate::scenario::Step;
use serde::{Deserialize, Serialize};
use stake_types::{Address, Amount, PoolConfig, SafeConfig};
use std::path::Path;

/// A scenario file: genesis accounts, the Pool and Safe parameters, and the
/// scripted steps to run against them
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StakeConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Pool parameters
    #[serde(default)]
    pub pool: PoolSection,

    /// Owners and quorum handed to `finalize`
    #[serde(default)]
    pub safe: SafeSection,

    /// Funded identities at genesis
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    /// Actions to run, in order
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSection {
    /// Identity that deploys the Pool
    #[serde(default = "default_deployer")]
    pub deployer: String,

    /// Threshold in whole units, e.g. "1.0"
    #[serde(default = "default_threshold")]
    pub threshold: String,

    /// Seconds until the deadline
    #[serde(default = "default_duration")]
    pub duration_secs: u64,
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            deployer: default_deployer(),
            threshold: default_threshold(),
            duration_secs: default_duration(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeSection {
    #[serde(default)]
    pub owners: Vec<String>,

    #[serde(default = "default_required_signatures")]
    pub required_signatures: u32,
}

impl Default for SafeSection {
    fn default() -> Self {
        Self {
            owners: Vec::new(),
            required_signatures: default_required_signatures(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub address: String,
    /// Balance in whole units
    pub balance: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_deployer() -> String {
    "deployer".to_string()
}

fn default_threshold() -> String {
    "1.0".to_string()
}

fn default_duration() -> u64 {
    30
}

fn default_required_signatures() -> u32 {
    1
}

impl StakeConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let path = path.ok_or_else(|| {
            CliError::Config("No scenario file given (use --config or STAKE_CONFIG)".into())
        })?;
        Self::from_file(Path::new(path))
    }

    pub fn from_file(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> CliResult<Self> {
        toml::from_str(contents).map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn pool_config(&self) -> CliResult<PoolConfig> {
        let threshold = parse_amount("pool.threshold", &self.pool.threshold)?;
        Ok(PoolConfig::new(threshold, self.pool.duration_secs))
    }

    pub fn safe_config(&self) -> SafeConfig {
        SafeConfig::new(
            self.safe.owners.iter().map(|o| Address::new(o.as_str())).collect(),
            self.safe.required_signatures,
        )
    }

    /// Genesis balances, parsed
    pub fn genesis(&self) -> CliResult<Vec<(Address, Amount)>> {
        self.accounts
            .iter()
            .map(|account| {
                let field = format!("accounts.{}.balance", account.address);
                Ok((
                    Address::new(account.address.as_str()),
                    parse_amount(&field, &account.balance)?,
                ))
            })
            .collect()
    }

    /// Check everything that can be checked before running
    pub fn validate(&self) -> CliResult<()> {
        self.pool_config()?;
        self.genesis()?;
        self.safe_config()
            .validate()
            .map_err(|e| CliError::Config(format!("safe: {}", e)))?;
        for (index, step) in self.steps.iter().enumerate() {
            step.validate()
                .map_err(|e| CliError::Config(format!("steps[{}]: {}", index, e)))?;
        }
        Ok(())
    }
}

pub(crate) fn parse_amount(field: &str, value: &str) -> CliResult<Amount> {
    Amount::parse_units(value).map_err(|e| CliError::Config(format!("{}: {}", field, e)))
}
