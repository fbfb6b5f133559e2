//! Core configuration traits

use crate::FitcoinError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "FITCOIN_";

/// Core trait for fitcoin configuration types
pub trait FitcoinConfig: Clone + Default + DeserializeOwned + Send + Sync + 'static {
    /// Get default configuration values
    fn defaults() -> Self {
        Self::default()
    }

    /// Load configuration from a `.toml` or `.json` file
    fn load_from_file(path: &Path) -> Result<Self, FitcoinError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FitcoinError::invalid_argument(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| FitcoinError::invalid_argument(format!("invalid TOML: {e}"))),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| FitcoinError::invalid_argument(format!("invalid JSON: {e}"))),
            _ => Err(FitcoinError::invalid_argument(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    /// Apply `FITCOIN_*` overrides from the process environment
    fn merge_with_env(&mut self) -> Result<(), FitcoinError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply overrides from an explicit variable list
    fn merge_with_vars<I>(&mut self, vars: I) -> Result<(), FitcoinError>
    where
        I: IntoIterator<Item = (String, String)>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), FitcoinError>;
}

/// Parse an environment override, naming the variable on failure
pub fn parse_env_value<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, FitcoinError> {
    value
        .trim()
        .parse()
        .map_err(|_| FitcoinError::invalid_argument(format!("invalid value '{value}' in {name}")))
}
