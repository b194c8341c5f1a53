//! Bonded-token ledger the registry debits and credits.
//!
//! The registry never creates tokens. It moves stake between reporter token
//! accounts and network custody, and pays rewards out of reward custody.

use std::collections::BTreeMap;

use hapi_core::{AccountKey, Amount, TokenId};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// A token account: balance of one token held by one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    /// Token held by this account.
    pub mint: TokenId,
    /// Key allowed to spend from this account.
    pub owner: AccountKey,
    /// Current balance.
    pub amount: Amount,
}

/// Token ledger seam.
///
/// Token accounts are identified by an [`AccountKey`] distinct from their
/// owner's key.
pub trait TokenLedger {
    /// Look up a token account.
    fn account(&self, id: &AccountKey) -> Result<TokenAccount>;

    /// Move `amount` between two accounts of the same mint.
    ///
    /// Fails with `InsufficientFunds` without effect when `from` holds less.
    fn transfer(&mut self, from: &AccountKey, to: &AccountKey, amount: Amount) -> Result<()>;
}

/// In-memory token ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    accounts: BTreeMap<AccountKey, TokenAccount>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an empty token account.
    pub fn open_account(&mut self, id: AccountKey, mint: TokenId, owner: AccountKey) -> Result<()> {
        if self.accounts.contains_key(&id) {
            return Err(RegistryError::InvalidData(format!(
                "token account {id} already exists"
            )));
        }
        self.accounts.insert(
            id,
            TokenAccount {
                mint,
                owner,
                amount: 0,
            },
        );
        Ok(())
    }

    /// Credit newly issued tokens to an account.
    pub fn mint_to(&mut self, id: &AccountKey, amount: Amount) -> Result<()> {
        let account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(format!("token account {id}")))?;
        account.amount = account
            .amount
            .checked_add(amount)
            .ok_or(RegistryError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Balance of an account, zero if it does not exist.
    pub fn balance(&self, id: &AccountKey) -> Amount {
        self.accounts.get(id).map(|a| a.amount).unwrap_or(0)
    }
}

impl TokenLedger for MemoryLedger {
    fn account(&self, id: &AccountKey) -> Result<TokenAccount> {
        self.accounts
            .get(id)
            .copied()
            .ok_or_else(|| RegistryError::NotFound(format!("token account {id}")))
    }

    fn transfer(&mut self, from: &AccountKey, to: &AccountKey, amount: Amount) -> Result<()> {
        let source = self.account(from)?;
        let target = self.account(to)?;

        if source.mint != target.mint {
            return Err(RegistryError::InvalidToken);
        }
        if source.amount < amount {
            return Err(RegistryError::InsufficientFunds {
                required: amount,
                available: source.amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = target
            .amount
            .checked_add(amount)
            .ok_or(RegistryError::ArithmeticOverflow)?;

        if let Some(account) = self.accounts.get_mut(from) {
            account.amount = source.amount - amount;
        }
        if let Some(account) = self.accounts.get_mut(to) {
            account.amount = credited;
        }
        Ok(())
    }
}
