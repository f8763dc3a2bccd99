//! # Hook Dispatch
//!
//! Ordered, set-once chains of hook objects.
//!
//! ```text
//! register([h1, h2])          (once, at startup)
//!        │
//!        ▼
//! lifecycle event ──► h1 ──► h2        failures logged, never propagated
//!
//! transfer ──► block(h1) ──► block(h2) ──► track(h1) ──► track(h2) ──► move
//!                 └── first Err vetoes; no track hook runs
//! ```

use tracing::warn;

use crate::domain::address::Address;
use crate::domain::coins::Coins;
use crate::domain::entities::OperatorId;
use crate::domain::errors::{OperatorsError, OperatorsResult};
use crate::ports::outbound::{OperatorsHooks, TransferHooks};

/// Ordered hook list that can be set exactly once.
pub struct HookChain<H: ?Sized> {
    surface: &'static str,
    hooks: Option<Vec<Box<H>>>,
}

impl<H: ?Sized> HookChain<H> {
    pub fn new(surface: &'static str) -> Self {
        Self {
            surface,
            hooks: None,
        }
    }

    /// Install the chain. Fails with `HooksAlreadySet` on a second call.
    pub fn set(&mut self, hooks: Vec<Box<H>>) -> OperatorsResult<()> {
        if self.hooks.is_some() {
            return Err(OperatorsError::HooksAlreadySet {
                surface: self.surface,
            });
        }
        self.hooks = Some(hooks);
        Ok(())
    }

    pub fn is_set(&self) -> bool {
        self.hooks.is_some()
    }

    pub fn len(&self) -> usize {
        self.hooks.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> impl Iterator<Item = &H> {
        self.hooks.iter().flatten().map(|h| h.as_ref())
    }
}

impl<H: ?Sized> std::fmt::Debug for HookChain<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookChain")
            .field("surface", &self.surface)
            .field("hooks", &self.len())
            .finish()
    }
}

/// Lifecycle notifications.
pub type OperatorsHookChain = HookChain<dyn OperatorsHooks>;

impl HookChain<dyn OperatorsHooks> {
    fn notify<F>(&self, event: &'static str, operator_id: OperatorId, call: F)
    where
        F: Fn(&dyn OperatorsHooks) -> OperatorsResult<()>,
    {
        for (index, hook) in self.iter().enumerate() {
            if let Err(e) = call(hook) {
                warn!(
                    hook = index,
                    event,
                    operator_id,
                    error = %e,
                    "[qc-18] operators hook failed"
                );
            }
        }
    }

    pub fn after_operator_registered(&self, operator_id: OperatorId) {
        self.notify("after_operator_registered", operator_id, |h| {
            h.after_operator_registered(operator_id)
        });
    }

    pub fn after_operator_inactivating_started(&self, operator_id: OperatorId) {
        self.notify("after_operator_inactivating_started", operator_id, |h| {
            h.after_operator_inactivating_started(operator_id)
        });
    }

    pub fn after_operator_inactivating_completed(&self, operator_id: OperatorId) {
        self.notify("after_operator_inactivating_completed", operator_id, |h| {
            h.after_operator_inactivating_completed(operator_id)
        });
    }

    pub fn after_operator_reactivated(&self, operator_id: OperatorId) {
        self.notify("after_operator_reactivated", operator_id, |h| {
            h.after_operator_reactivated(operator_id)
        });
    }

    pub fn before_operator_deleted(&self, operator_id: OperatorId) {
        self.notify("before_operator_deleted", operator_id, |h| {
            h.before_operator_deleted(operator_id)
        });
    }
}

/// Pre-transfer guards.
pub type TransferHookChain = HookChain<dyn TransferHooks>;

impl HookChain<dyn TransferHooks> {
    /// Run every block hook, then `settle`, then every track hook.
    ///
    /// `settle` checks that the transfer can go through and returns whatever
    /// the caller needs to apply it. Track hooks only see transfers that were
    /// neither vetoed nor rejected by `settle`. A veto surfaces as
    /// `TransferBlocked`.
    pub fn before_send<T>(
        &self,
        from: &Address,
        to: &Address,
        amount: &Coins,
        settle: impl FnOnce() -> OperatorsResult<T>,
    ) -> OperatorsResult<T> {
        for hook in self.iter() {
            hook.block_before_send(from, to, amount)
                .map_err(|e| match e {
                    blocked @ OperatorsError::TransferBlocked { .. } => blocked,
                    other => OperatorsError::TransferBlocked {
                        reason: other.to_string(),
                    },
                })?;
        }
        let settled = settle()?;
        for hook in self.iter() {
            hook.track_before_send(from, to, amount);
        }
        Ok(settled)
    }
}
