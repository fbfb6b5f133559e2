//! Currency accrual engine
//!
//! Clients report a user's raw cumulative activity counter. Only the part of
//! the counter not yet converted counts, so replaying the same report never
//! mints twice.

use crate::registry;
use fitcoin_core::{
    AccrualConfig, AccrualPolicy, FitcoinError, Invocation, LedgerEffects, MemberId, Result, User,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of one accrual report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccrualOutcome {
    /// User record after the report
    pub user: User,
    /// Fitcoin minted by this report
    pub earned: u64,
}

impl AccrualOutcome {
    /// Balance after the report
    pub fn balance(&self) -> u64 {
        self.user.fitcoin_balance
    }
}

/// A conversion to apply: coins to mint and the new converted watermark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    /// Fitcoin to mint
    pub earned: u64,
    /// New value of `activity_units_converted`
    pub converted: u64,
}

/// Work out what a report converts under `config`, or `None` for a no-op.
///
/// `converted` is the watermark already turned into fitcoin and `reported`
/// the new raw counter, which the caller has checked is not a regression.
pub fn plan_conversion(config: &AccrualConfig, converted: u64, reported: u64) -> Option<Conversion> {
    let threshold = config.threshold;
    if threshold == 0 {
        return None;
    }
    let delta = reported.checked_sub(converted)?;
    if delta < threshold {
        return None;
    }
    let remainder = delta % threshold;
    if config.policy == AccrualPolicy::ExactMultiple && remainder != 0 {
        return None;
    }
    Some(Conversion {
        earned: delta / threshold,
        converted: reported - remainder,
    })
}

/// Convert newly reported activity into fitcoin
pub async fn accrue<L>(
    tx: &mut Invocation<'_, L>,
    config: &AccrualConfig,
    user_id: &MemberId,
    reported: u64,
) -> Result<AccrualOutcome>
where
    L: LedgerEffects + ?Sized,
{
    let mut user = registry::get_user(tx, user_id).await?;

    if reported < user.total_activity_units {
        return Err(FitcoinError::RegressedCounter {
            user_id: user_id.to_string(),
            reported,
            recorded: user.total_activity_units,
        });
    }

    let Some(conversion) = plan_conversion(config, user.activity_units_converted, reported) else {
        debug!(user_id = %user_id, reported, "Nothing to convert");
        return Ok(AccrualOutcome { user, earned: 0 });
    };

    user.credit(conversion.earned)?;
    user.activity_units_converted = conversion.converted;
    user.total_activity_units = reported;
    registry::put_user(tx, &user)?;

    debug!(
        user_id = %user_id,
        earned = conversion.earned,
        balance = user.fitcoin_balance,
        "Activity converted"
    );
    Ok(AccrualOutcome {
        user,
        earned: conversion.earned,
    })
}
