use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use fragvault_core::{Address, PoolError, Units};

/// Closed-loop fungible balances. Mint and burn are reachable only through
/// the orchestrator; holders may transfer freely.
///
/// Running mint/burn totals are kept so the supply accounting can be
/// re-verified independently of the balance map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitLedger {
    balances: HashMap<Address, Units>,
    total_supply: Units,
    total_minted: u128,
    total_burned: u128,
}

impl UnitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, addr: &Address) -> Units {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> Units {
        self.total_supply
    }

    /// Credit `amount` units to `addr`. A zero amount is a no-op.
    pub fn mint(&mut self, addr: &Address, amount: Units) {
        if amount == 0 {
            return;
        }
        *self.balances.entry(addr.clone()).or_insert(0) += amount;
        self.total_supply += amount;
        self.total_minted += u128::from(amount);
    }

    /// Debit `amount` units from `addr`. Fails without touching state if
    /// the balance is short.
    pub fn burn(&mut self, addr: &Address, amount: Units) -> Result<(), PoolError> {
        let balance = self.balance_of(addr);
        if balance < amount {
            return Err(PoolError::InsufficientBalance {
                needed: amount,
                available: balance,
            });
        }
        if amount == 0 {
            return Ok(());
        }
        let remaining = balance - amount;
        if remaining == 0 {
            self.balances.remove(addr);
        } else {
            self.balances.insert(addr.clone(), remaining);
        }
        self.total_supply -= amount;
        self.total_burned += u128::from(amount);
        Ok(())
    }

    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Units) -> Result<(), PoolError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(PoolError::InsufficientBalance {
                needed: amount,
                available: balance,
            });
        }
        if amount == 0 || from == to {
            return Ok(());
        }
        let remaining = balance - amount;
        if remaining == 0 {
            self.balances.remove(from);
        } else {
            self.balances.insert(from.clone(), remaining);
        }
        *self.balances.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }

    /// Cross-check the supply against the running mint/burn totals.
    pub fn verify(&self) -> Result<(), PoolError> {
        let expected = self.total_minted - self.total_burned;
        if u128::from(self.total_supply) != expected {
            return Err(PoolError::ConservationViolated {
                supply: self.total_supply,
                fragments: 0,
                expected: expected as Units,
            });
        }
        Ok(())
    }
}
