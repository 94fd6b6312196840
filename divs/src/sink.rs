//! Where dividends go when they are claimed.

use crate::error::DivsError;
use dao_types::{AccountId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Receives dividend payments from the distributor.
///
/// `pay_fees` must be all-or-nothing: on error nothing was credited and the
/// claim is not recorded.
pub trait FeeSink {
    fn pay_fees(&mut self, to: &AccountId, amount: u128, at: Timestamp) -> Result<(), DivsError>;
}

/// In-memory balances of the fee token.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeeLedger {
    balances: HashMap<AccountId, u128>,
    total_paid: u128,
}

impl FeeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_paid(&self) -> u128 {
        self.total_paid
    }
}

impl FeeSink for FeeLedger {
    fn pay_fees(&mut self, to: &AccountId, amount: u128, _at: Timestamp) -> Result<(), DivsError> {
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(DivsError::Overflow)?;
        let total_paid = self
            .total_paid
            .checked_add(amount)
            .ok_or(DivsError::Overflow)?;
        self.balances.insert(to.clone(), balance);
        self.total_paid = total_paid;
        Ok(())
    }
}
