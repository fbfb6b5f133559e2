//! CLI configuration
//!
//! Read from the `--config` file when it exists, then overridden by
//! `FITCOIN_*` environment variables.

use fitcoin_core::config::{parse_env_value, ConfigValidator, ENV_PREFIX};
use fitcoin_core::{EconomyConfig, FitcoinConfig, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings of the `fitcoin` binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Snapshot file of the ledger
    pub ledger_path: PathBuf,
    /// Attempts per invocation before a conflict is reported
    pub max_commit_attempts: u32,
    /// Log filter used unless `--verbose` is given
    pub log_level: String,
    /// Economy policy
    pub economy: EconomyConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(".fitcoin/ledger.json"),
            max_commit_attempts: 3,
            log_level: "warn".to_string(),
            economy: EconomyConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load `path` if present, apply the environment and validate
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::file_or_defaults(path)?;
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    fn file_or_defaults(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::defaults())
        }
    }
}

impl FitcoinConfig for CliConfig {
    fn merge_with_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<_> = vars.into_iter().collect();
        for (name, value) in &vars {
            match name.strip_prefix(ENV_PREFIX) {
                Some("LEDGER_PATH") => self.ledger_path = PathBuf::from(value),
                Some("LOG_LEVEL") => self.log_level = value.clone(),
                Some("MAX_COMMIT_ATTEMPTS") => {
                    self.max_commit_attempts = parse_env_value(name, value)?;
                }
                _ => {}
            }
        }
        self.economy.merge_with_vars(vars)
    }

    fn validate(&self) -> Result<()> {
        let root = ConfigValidator::new();
        let mut validator = ConfigValidator::new();
        validator.range(
            "max_commit_attempts",
            u64::from(self.max_commit_attempts),
            Some(1),
            Some(100),
        );
        validator.custom(
            "log_level",
            &self.log_level,
            |level| !level.trim().is_empty(),
            "must not be empty",
        );
        validator.merge(self.economy.validator(&root.for_field("economy")));
        validator.result()?;
        Ok(())
    }
}
