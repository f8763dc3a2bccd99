//! # Operators Service
//!
//! Application service composing the entity store, the inactivating queue,
//! the lifecycle state machine and the hook chain over injected ports.
//!
//! ## Atomicity
//!
//! All store access goes through an [`OverlayStore`]. Every command and every
//! tick runs inside [`OperatorsService::run_atomic`]: on success the buffered
//! writes are flushed in one batch and the command's events are published; on
//! failure both are dropped.

mod genesis;
mod invariants;
mod lifecycle;
mod msg_server;
mod query;
mod queue;
mod store;
mod tick;
#[cfg(test)]
mod tests;

pub use invariants::InvariantReport;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::adapters::codec::BincodeCodec;
use crate::adapters::storage::OverlayStore;
use crate::config::OperatorsConfig;
use crate::domain::errors::OperatorsResult;
use crate::domain::events::OperatorEvent;
use crate::hooks::OperatorsHookChain;
use crate::ports::outbound::{AccountService, KeyValueStore, OperatorsHooks, TokenLedger};

/// Dependencies for `OperatorsService`.
pub struct OperatorsDependencies<KV, TL, AS> {
    pub store: KV,
    pub token_ledger: TL,
    pub accounts: AS,
}

pub struct OperatorsService<KV, TL, AS>
where
    KV: KeyValueStore,
    TL: TokenLedger,
    AS: AccountService,
{
    pub(crate) store: OverlayStore<KV>,
    pub(crate) token_ledger: TL,
    pub(crate) accounts: AS,
    pub(crate) hooks: OperatorsHookChain,
    pub(crate) config: OperatorsConfig,
    /// Events of the command in flight.
    pending_events: Vec<OperatorEvent>,
    /// Events of committed commands, until drained.
    events: Vec<OperatorEvent>,
}

impl<KV, TL, AS> OperatorsService<KV, TL, AS>
where
    KV: KeyValueStore,
    TL: TokenLedger,
    AS: AccountService,
{
    pub fn new(deps: OperatorsDependencies<KV, TL, AS>, config: OperatorsConfig) -> OperatorsResult<Self> {
        config.validate()?;
        Ok(Self {
            store: OverlayStore::new(deps.store),
            token_ledger: deps.token_ledger,
            accounts: deps.accounts,
            hooks: OperatorsHookChain::new("operators"),
            config,
            pending_events: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Install lifecycle hooks. May be called once.
    pub fn set_hooks(&mut self, hooks: Vec<Box<dyn OperatorsHooks>>) -> OperatorsResult<()> {
        self.hooks.set(hooks)
    }

    pub fn config(&self) -> &OperatorsConfig {
        &self.config
    }

    pub fn store(&self) -> &KV {
        self.store.parent()
    }

    pub fn token_ledger(&self) -> &TL {
        &self.token_ledger
    }

    pub fn token_ledger_mut(&mut self) -> &mut TL {
        &mut self.token_ledger
    }

    pub fn accounts(&self) -> &AS {
        &self.accounts
    }

    /// Committed events since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<OperatorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Run `f` as one all-or-nothing unit.
    pub(crate) fn run_atomic<R>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Self) -> OperatorsResult<R>,
    ) -> OperatorsResult<R> {
        match f(self) {
            Ok(value) => {
                if let Err(e) = self.store.commit() {
                    self.pending_events.clear();
                    return Err(e.into());
                }
                self.events.append(&mut self.pending_events);
                Ok(value)
            }
            Err(e) => {
                let discarded = self.store.pending_writes();
                self.store.discard();
                self.pending_events.clear();
                debug!(operation, discarded, error = %e, "[qc-18] rolled back");
                Err(e)
            }
        }
    }

    pub(crate) fn emit(&mut self, event: OperatorEvent) {
        self.pending_events.push(event);
    }

    pub(crate) fn read<T: DeserializeOwned>(&self, key: &[u8]) -> OperatorsResult<Option<T>> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(BincodeCodec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn write<T: Serialize>(&mut self, key: &[u8], value: &T) -> OperatorsResult<()> {
        let bytes = BincodeCodec::encode(value)?;
        self.store.put(key, &bytes)?;
        Ok(())
    }
}
