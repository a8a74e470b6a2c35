//! Native value held by identities outside the ledger.

use std::collections::HashMap;

use dice_core::Address;

use crate::api::{Result, RuntimeError};

#[derive(Debug, Default, Clone)]
pub(crate) struct NativeAccounts {
    balances: HashMap<Address, u128>,
}

impl NativeAccounts {
    pub(crate) fn balance_of(&self, account: Address) -> u128 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    pub(crate) fn credit(&mut self, account: Address, amount: u128) -> Result<u128> {
        let updated = self.check_credit(account, amount)?;
        self.balances.insert(account, updated);
        Ok(updated)
    }

    /// Balance `account` would hold after receiving `amount`.
    pub(crate) fn check_credit(&self, account: Address, amount: u128) -> Result<u128> {
        self.balance_of(account)
            .checked_add(amount)
            .ok_or(RuntimeError::AccountOverflow(account))
    }

    /// Fails without touching the balance when funds are short.
    pub(crate) fn ensure(&self, account: Address, required: u128) -> Result<()> {
        let available = self.balance_of(account);
        if available < required {
            return Err(RuntimeError::InsufficientFunds {
                account,
                available,
                required,
            });
        }
        Ok(())
    }

    /// Callers must have checked [`ensure`](Self::ensure) first.
    pub(crate) fn debit(&mut self, account: Address, amount: u128) {
        let current = self.balance_of(account);
        self.balances.insert(account, current.saturating_sub(amount));
    }
}
