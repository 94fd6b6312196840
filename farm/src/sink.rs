//! Where rewards go when they are paid out.

use crate::error::FarmError;
use dao_token::{GovernanceToken, TokenError};
use dao_types::{AccountId, Timestamp};

/// A reward payment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payout {
    pub to: AccountId,
    pub amount: u128,
    /// Make `to` its own voting delegate. Set on an account's first payout.
    pub auto_delegate: bool,
    pub at: Timestamp,
}

/// Receives reward payouts from the farm.
///
/// `pay_reward` must be all-or-nothing: when it returns an error, nothing was
/// credited and the farm leaves the reward with the account.
pub trait RewardSink {
    fn pay_reward(&mut self, payout: &Payout) -> Result<(), FarmError>;
}

/// Pays rewards by minting the governance token.
///
/// The farm account must be the token's minter.
#[derive(Clone, Debug)]
pub struct TokenMinter {
    token: GovernanceToken,
    farm_account: AccountId,
}

impl TokenMinter {
    /// Create a fresh token with `farm_account` as its minter.
    pub fn new(symbol: impl Into<String>, max_supply: u128, farm_account: AccountId) -> Result<Self, FarmError> {
        let mut token = GovernanceToken::new(symbol, max_supply);
        token.set_minter(farm_account.clone())?;
        Ok(Self {
            token,
            farm_account,
        })
    }

    /// Wrap an existing token whose minter is already `farm_account`.
    pub fn from_token(token: GovernanceToken, farm_account: AccountId) -> Result<Self, FarmError> {
        if token.minter() != Some(&farm_account) {
            return Err(TokenError::Unauthorized(farm_account.to_string()).into());
        }
        Ok(Self {
            token,
            farm_account,
        })
    }

    pub fn token(&self) -> &GovernanceToken {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut GovernanceToken {
        &mut self.token
    }

    pub fn farm_account(&self) -> &AccountId {
        &self.farm_account
    }

    pub fn into_token(self) -> GovernanceToken {
        self.token
    }
}

impl RewardSink for TokenMinter {
    fn pay_reward(&mut self, payout: &Payout) -> Result<(), FarmError> {
        // mint validates everything before touching balances; once it succeeds
        // the delegation at the same instant cannot fail
        self.token
            .mint(&self.farm_account, &payout.to, payout.amount, payout.at)?;
        if payout.auto_delegate {
            self.token.auto_delegate(&payout.to, payout.at)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_types::ONE_TOKEN;

    fn account(n: u64) -> AccountId {
        AccountId::new(format!("0x{:040x}", n))
    }

    #[test]
    fn pays_by_minting_and_delegates_on_request() {
        let mut minter = TokenMinter::new("DAO", 10 * ONE_TOKEN, account(99)).unwrap();
        let alice = account(1);
        minter
            .pay_reward(&Payout {
                to: alice.clone(),
                amount: 3 * ONE_TOKEN,
                auto_delegate: true,
                at: Timestamp::new(10),
            })
            .unwrap();
        assert_eq!(minter.token().balance_of(&alice), 3 * ONE_TOKEN);
        assert_eq!(minter.token().delegates(&alice), Some(&alice));
        assert_eq!(minter.token().votes(&alice), 3 * ONE_TOKEN);
    }

    #[test]
    fn failed_payout_changes_nothing() {
        let mut minter = TokenMinter::new("DAO", ONE_TOKEN, account(99)).unwrap();
        let alice = account(1);
        let err = minter
            .pay_reward(&Payout {
                to: alice.clone(),
                amount: 2 * ONE_TOKEN,
                auto_delegate: true,
                at: Timestamp::new(10),
            })
            .unwrap_err();
        assert!(matches!(err, FarmError::Token(TokenError::SupplyCapExceeded { .. })));
        assert_eq!(minter.token().total_supply(), 0);
        assert_eq!(minter.token().delegates(&alice), None);
    }

    #[test]
    fn from_token_requires_matching_minter() {
        let token = GovernanceToken::new("DAO", ONE_TOKEN);
        assert!(TokenMinter::from_token(token, account(99)).is_err());
    }
}
