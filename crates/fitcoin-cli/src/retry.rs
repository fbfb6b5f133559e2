//! Conflict retry around a single invocation
//!
//! The economy never retries on its own. A conflicting commit means another
//! writer got there first, so the whole operation is re-run against fresh
//! state, up to the configured number of attempts. Read-only operations
//! never commit and run exactly once.

use fitcoin_core::{FitcoinError, LedgerEffects, RandomEffects, Result};
use fitcoin_economy::{Economy, Operation};
use tracing::{debug, warn};

/// Parse `function(args...)` once and run it until it stops conflicting
pub async fn invoke_with_retry<L, R>(
    economy: &Economy<L, R>,
    function: &str,
    args: &[String],
    max_attempts: u32,
) -> Result<Vec<u8>>
where
    L: LedgerEffects,
    R: RandomEffects,
{
    let op = Operation::parse(function, args)?;
    let max_attempts = if op.is_mutating() { max_attempts } else { 1 };
    let mut attempt = 1;
    loop {
        debug!(operation = op.name(), attempt, "Executing");
        match economy.execute(op.clone()).await {
            Err(err) if err.kind().is_retryable() && attempt < max_attempts => {
                warn!(operation = op.name(), attempt, error = %err, "Commit conflicted, retrying");
                attempt += 1;
            }
            Err(err @ FitcoinError::Conflict { .. }) => {
                warn!(operation = op.name(), attempt, "Giving up after conflicting commits");
                return Err(err);
            }
            other => return other,
        }
    }
}
