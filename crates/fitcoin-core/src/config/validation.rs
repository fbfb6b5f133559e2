//! Rule accumulation for configuration checks
//!
//! A [`ConfigValidator`] collects every violated rule under a dotted field
//! path, so a nested config (the CLI embedding [`super::EconomyConfig`]) can
//! fold the economy's rules into its own report.

use crate::FitcoinError;
use std::fmt;

/// Outcome of running a validator
pub type ValidationResult = Result<(), ValidationError>;

/// One violated configuration rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Numeric value outside its bounds
    OutOfRange {
        /// Dotted field path
        field: String,
        /// Inclusive lower bound, if any
        min: Option<u64>,
        /// Inclusive upper bound, if any
        max: Option<u64>,
        /// Configured value
        actual: u64,
    },
    /// Predicate rule failed
    Custom {
        /// Dotted field path
        field: String,
        /// Reason given by the rule
        message: String,
    },
}

impl ValidationError {
    /// Dotted path of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::OutOfRange { field, .. } | ValidationError::Custom { field, .. } => {
                field
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfRange {
                field,
                min,
                max,
                actual,
            } => {
                write!(f, "config field {field} is {actual}, expected ")?;
                match (min, max) {
                    (Some(lo), Some(hi)) => write!(f, "{lo}..={hi}"),
                    (Some(lo), None) => write!(f, ">= {lo}"),
                    (None, Some(hi)) => write!(f, "<= {hi}"),
                    (None, None) => write!(f, "any value"),
                }
            }
            ValidationError::Custom { field, message } => {
                write!(f, "config field {field} {message}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for FitcoinError {
    fn from(err: ValidationError) -> Self {
        FitcoinError::invalid_argument(err.to_string())
    }
}

/// Accumulates rule violations under a field path
#[derive(Debug, Default)]
pub struct ConfigValidator {
    path: Vec<String>,
    errors: Vec<ValidationError>,
}

impl ConfigValidator {
    /// Validator rooted at the top of a config
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh validator for the sub-table `name`
    pub fn for_field(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        path.push(name.to_string());
        Self {
            path,
            errors: Vec::new(),
        }
    }

    /// Require `min <= value <= max`, either bound optional
    pub fn range(&mut self, name: &str, value: u64, min: Option<u64>, max: Option<u64>) -> &mut Self {
        let in_bounds = min.map_or(true, |lo| value >= lo) && max.map_or(true, |hi| value <= hi);
        if !in_bounds {
            let field = self.path_of(name);
            self.errors.push(ValidationError::OutOfRange {
                field,
                min,
                max,
                actual: value,
            });
        }
        self
    }

    /// Require `predicate(value)`; `message` describes the rule
    pub fn custom<T, F>(&mut self, name: &str, value: &T, predicate: F, message: &str) -> &mut Self
    where
        F: FnOnce(&T) -> bool,
    {
        if !predicate(value) {
            let field = self.path_of(name);
            self.errors.push(ValidationError::Custom {
                field,
                message: message.to_string(),
            });
        }
        self
    }

    /// Take over the violations found by a nested validator
    pub fn merge(&mut self, nested: ConfigValidator) {
        self.errors.extend(nested.errors);
    }

    /// `Err` with the first violation, in the order rules were applied
    pub fn result(self) -> ValidationResult {
        self.errors.into_iter().next().map_or(Ok(()), Err)
    }

    /// Every violation found
    pub fn all_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    fn path_of(&self, name: &str) -> String {
        self.path
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join(".")
    }
}
