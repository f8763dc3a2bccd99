//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the operators ledger requires from its host.
//!
//! - `KeyValueStore` - ordered byte store, synchronously committed
//! - `TokenLedger` - balances and transfers (bank)
//! - `AccountService` - account creation for custodial addresses
//! - `OperatorsHooks` - lifecycle observers registered by other modules
//! - `TransferHooks` - pre-send guards installed on the token ledger

use crate::domain::address::Address;
use crate::domain::coins::Coins;
use crate::domain::entities::OperatorId;
use crate::domain::errors::{KVStoreError, OperatorsResult};

/// Lazy ascending iterator over `(key, value)` pairs.
pub type KvIter<'a> = Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + 'a>;

/// Abstract interface for ordered key-value storage.
///
/// Keys compare as raw bytes. Iteration is always ascending.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Apply every operation or none of them.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Keys in `[start, end)`, or `[start, ..)` when `end` is `None`.
    fn range_scan<'a>(&'a self, start: &[u8], end: Option<&[u8]>)
        -> Result<KvIter<'a>, KVStoreError>;

    /// Every entry whose key starts with `prefix`, in key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let end = crate::domain::keys::next_prefix(prefix);
        Ok(self.range_scan(prefix, end.as_deref())?.collect())
    }
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Token-movement collaborator.
///
/// Implementations must run their `TransferHooks` (block first, then track)
/// before any balance changes.
pub trait TokenLedger: Send + Sync {
    fn balance(&self, address: &Address) -> Coins;

    fn transfer(&mut self, from: &Address, to: &Address, amount: &Coins) -> OperatorsResult<()>;

    /// Move `amount` from `from` into the shared community pool.
    fn fund_shared_pool(&mut self, from: &Address, amount: &Coins) -> OperatorsResult<()>;
}

/// Account registry collaborator.
pub trait AccountService: Send + Sync {
    fn has_account(&self, address: &Address) -> bool;

    /// Returns `true` if a new account was created.
    fn create_account_if_absent(&mut self, address: &Address) -> bool;
}

/// Observers of operator lifecycle transitions.
///
/// Hooks run after the transition has been written. Failures are logged and
/// never undo the transition.
pub trait OperatorsHooks: Send + Sync {
    fn after_operator_registered(&self, _operator_id: OperatorId) -> OperatorsResult<()> {
        Ok(())
    }

    fn after_operator_inactivating_started(&self, _operator_id: OperatorId) -> OperatorsResult<()> {
        Ok(())
    }

    fn after_operator_inactivating_completed(
        &self,
        _operator_id: OperatorId,
    ) -> OperatorsResult<()> {
        Ok(())
    }

    fn after_operator_reactivated(&self, _operator_id: OperatorId) -> OperatorsResult<()> {
        Ok(())
    }

    fn before_operator_deleted(&self, _operator_id: OperatorId) -> OperatorsResult<()> {
        Ok(())
    }
}

/// Guards consulted before every token transfer.
pub trait TransferHooks: Send + Sync {
    /// May veto the transfer.
    fn block_before_send(&self, _from: &Address, _to: &Address, _amount: &Coins) -> OperatorsResult<()> {
        Ok(())
    }

    /// Notification only. Never sees a transfer that was vetoed.
    fn track_before_send(&self, _from: &Address, _to: &Address, _amount: &Coins) {}
}
