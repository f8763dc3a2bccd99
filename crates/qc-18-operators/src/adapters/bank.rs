//! In-memory token ledger and account registry.
//!
//! Reference implementations of the `TokenLedger` and `AccountService` ports,
//! used by tests and single-process setups.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::domain::address::Address;
use crate::domain::coins::Coins;
use crate::domain::errors::{OperatorsError, OperatorsResult};
use crate::hooks::TransferHookChain;
use crate::ports::outbound::{AccountService, TokenLedger, TransferHooks};

/// Module account holding the shared community pool.
pub const SHARED_POOL_MODULE: &str = "distribution";

#[derive(Debug)]
pub struct InMemoryTokenLedger {
    balances: BTreeMap<Address, Coins>,
    hooks: TransferHookChain,
}

impl Default for InMemoryTokenLedger {
    fn default() -> Self {
        Self {
            balances: BTreeMap::new(),
            hooks: TransferHookChain::new("transfer"),
        }
    }
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared_pool_address() -> Address {
        Address::module_address(SHARED_POOL_MODULE)
    }

    /// Credit `amount` out of thin air. Test and genesis funding only.
    pub fn mint(&mut self, address: &Address, amount: &Coins) -> OperatorsResult<()> {
        let current = self.balance(address);
        let updated = current
            .checked_add(amount)
            .ok_or(OperatorsError::Overflow { context: "mint" })?;
        self.balances.insert(*address, updated);
        Ok(())
    }

    /// Install the transfer guards. Fails if already installed.
    pub fn set_transfer_hooks(&mut self, hooks: Vec<Box<dyn TransferHooks>>) -> OperatorsResult<()> {
        self.hooks.set(hooks)
    }

    pub fn shared_pool(&self) -> Coins {
        self.balance(&Self::shared_pool_address())
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn balance(&self, address: &Address) -> Coins {
        self.balances.get(address).cloned().unwrap_or_default()
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: &Coins) -> OperatorsResult<()> {
        let (available, remaining, credited) = self.hooks.before_send(from, to, amount, || {
            let available = self.balance(from);
            let remaining = available.checked_sub(amount).ok_or_else(|| {
                OperatorsError::InsufficientFunds {
                    address: from.to_string(),
                    available: available.to_string(),
                    required: amount.to_string(),
                }
            })?;
            let credited = self
                .balance(to)
                .checked_add(amount)
                .ok_or(OperatorsError::Overflow { context: "transfer" })?;
            Ok((available, remaining, credited))
        })?;

        self.balances.insert(*from, remaining);
        if from == to {
            self.balances.insert(*to, available);
        } else {
            self.balances.insert(*to, credited);
        }
        debug!(from = %from, to = %to, amount = %amount, "[qc-18] transfer");
        Ok(())
    }

    fn fund_shared_pool(&mut self, from: &Address, amount: &Coins) -> OperatorsResult<()> {
        self.transfer(from, &Self::shared_pool_address(), amount)
    }
}

/// Set of known accounts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccounts {
    accounts: BTreeSet<Address>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountService for InMemoryAccounts {
    fn has_account(&self, address: &Address) -> bool {
        self.accounts.contains(address)
    }

    fn create_account_if_absent(&mut self, address: &Address) -> bool {
        self.accounts.insert(*address)
    }
}
