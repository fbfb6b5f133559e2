//! Economy configuration
//!
//! Policy knobs the economy reads at construction time. Values come from
//! defaults, an optional TOML/JSON file and `FITCOIN_*` environment
//! overrides, in that order, and are validated before use.

pub mod traits;
pub mod validation;

pub use traits::{parse_env_value, FitcoinConfig, ENV_PREFIX};
pub use validation::{ConfigValidator, ValidationError, ValidationResult};

use crate::errors::{FitcoinError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Activity units per fitcoin unless configured otherwise
pub const DEFAULT_ACCRUAL_THRESHOLD: u64 = 100;

/// How unconverted activity turns into fitcoin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualPolicy {
    /// Convert every whole threshold and carry the remainder forward
    #[default]
    BankRemainder,
    /// Convert only when the unconverted delta is an exact multiple of the threshold
    ExactMultiple,
}

impl fmt::Display for AccrualPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccrualPolicy::BankRemainder => write!(f, "bank_remainder"),
            AccrualPolicy::ExactMultiple => write!(f, "exact_multiple"),
        }
    }
}

impl FromStr for AccrualPolicy {
    type Err = FitcoinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "bank_remainder" => Ok(AccrualPolicy::BankRemainder),
            "exact_multiple" => Ok(AccrualPolicy::ExactMultiple),
            other => Err(FitcoinError::invalid_argument(format!(
                "unknown accrual policy '{other}'"
            ))),
        }
    }
}

/// Activity-to-fitcoin conversion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccrualConfig {
    /// Activity units that make one fitcoin
    pub threshold: u64,
    /// Conversion policy
    pub policy: AccrualPolicy,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ACCRUAL_THRESHOLD,
            policy: AccrualPolicy::default(),
        }
    }
}

/// Policy configuration of the economy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Accrual settings
    pub accrual: AccrualConfig,
    /// Reject contract creation up front when the user cannot pay
    pub funds_precheck: bool,
}

impl EconomyConfig {
    /// Validator pre-populated with this config's rules, for embedding in
    /// larger configurations
    pub fn validator(&self, parent: &ConfigValidator) -> ConfigValidator {
        let mut accrual = parent.for_field("accrual");
        accrual.range("threshold", self.accrual.threshold, Some(1), None);
        accrual
    }
}

impl FitcoinConfig for EconomyConfig {
    fn merge_with_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match key {
                "ACCRUAL_THRESHOLD" => self.accrual.threshold = parse_env_value(&name, &value)?,
                "ACCRUAL_POLICY" => self.accrual.policy = value.parse()?,
                "FUNDS_PRECHECK" => self.funds_precheck = parse_env_value(&name, &value)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.validator(&ConfigValidator::new()).result()?;
        Ok(())
    }
}
