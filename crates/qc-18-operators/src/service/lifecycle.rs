//! Operator lifecycle state machine.
//!
//! ```text
//! register ──► Active ──deactivate──► Inactivating ──tick (time due)──► Inactive
//!                ▲                                                        │
//!                └──────────────────── reactivate ────────────────────────┘
//! ```
//!
//! Each transition checks its exact source state and fails with a named
//! error otherwise.

use tracing::info;

use super::OperatorsService;
use crate::domain::entities::{timestamp_after, BlockContext, OperatorId, OperatorStatus, Timestamp};
use crate::domain::errors::{OperatorsError, OperatorsResult};
use crate::domain::events::OperatorEvent;
use crate::ports::outbound::{AccountService, KeyValueStore, TokenLedger};

impl<KV, TL, AS> OperatorsService<KV, TL, AS>
where
    KV: KeyValueStore,
    TL: TokenLedger,
    AS: AccountService,
{
    // ---------------------------------------------------------------------
    // Public entry points (each one atomic)
    // ---------------------------------------------------------------------

    /// `Active -> Inactivating`. Returns the completion time.
    pub fn start_operator_inactivation(
        &mut self,
        ctx: &BlockContext,
        operator_id: OperatorId,
    ) -> OperatorsResult<Timestamp> {
        self.run_atomic("start_operator_inactivation", |svc| {
            svc.start_inactivation(ctx, operator_id)
        })
    }

    /// `Inactivating -> Inactive`, normally driven by the tick.
    pub fn complete_operator_inactivation(&mut self, operator_id: OperatorId) -> OperatorsResult<()> {
        self.run_atomic("complete_operator_inactivation", |svc| {
            svc.complete_inactivation(operator_id, None)
        })
    }

    /// `Inactive -> Active`.
    pub fn reactivate_inactive_operator(&mut self, operator_id: OperatorId) -> OperatorsResult<()> {
        self.run_atomic("reactivate_inactive_operator", |svc| svc.reactivate(operator_id))
    }

    /// Remove an inactive operator for good.
    pub fn delete_operator(&mut self, operator_id: OperatorId) -> OperatorsResult<()> {
        self.run_atomic("delete_operator", |svc| svc.delete(operator_id))
    }

    // ---------------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------------

    pub(crate) fn start_inactivation(
        &mut self,
        ctx: &BlockContext,
        operator_id: OperatorId,
    ) -> OperatorsResult<Timestamp> {
        let mut operator = self.must_get_operator(operator_id)?;
        if operator.status != OperatorStatus::Active {
            return Err(OperatorsError::OperatorNotActive {
                id: operator_id,
                status: operator.status,
            });
        }

        let params = self.get_params()?;
        let completion_time = timestamp_after(ctx.time, params.deactivation_time).ok_or(
            OperatorsError::Overflow {
                context: "inactivation completion time",
            },
        )?;

        operator.status = OperatorStatus::Inactivating;
        self.put_operator(&operator)?;
        self.queue_insert(operator_id, completion_time)?;

        info!(
            operator_id,
            height = ctx.height,
            completion_time,
            "[qc-18] operator inactivation started"
        );
        self.hooks.after_operator_inactivating_started(operator_id);
        self.emit(OperatorEvent::InactivationStarted {
            operator_id,
            completion_time,
        });
        Ok(completion_time)
    }

    pub(crate) fn complete_inactivation(
        &mut self,
        operator_id: OperatorId,
        completion_time: Option<Timestamp>,
    ) -> OperatorsResult<()> {
        let mut operator = self.must_get_operator(operator_id)?;
        if operator.status != OperatorStatus::Inactivating {
            return Err(OperatorsError::OperatorNotInactivating {
                id: operator_id,
                status: operator.status,
            });
        }

        operator.status = OperatorStatus::Inactive;
        self.put_operator(&operator)?;
        self.queue_remove(operator_id, completion_time)?;
        self.delete_operator_params(operator_id)?;

        info!(operator_id, "[qc-18] operator inactivation completed");
        self.hooks.after_operator_inactivating_completed(operator_id);
        self.emit(OperatorEvent::InactivationCompleted { operator_id });
        Ok(())
    }

    pub(crate) fn reactivate(&mut self, operator_id: OperatorId) -> OperatorsResult<()> {
        let mut operator = self.must_get_operator(operator_id)?;
        if operator.status != OperatorStatus::Inactive {
            return Err(OperatorsError::OperatorNotInactive {
                id: operator_id,
                status: operator.status,
            });
        }

        operator.status = OperatorStatus::Active;
        self.put_operator(&operator)?;

        info!(operator_id, "[qc-18] operator reactivated");
        self.hooks.after_operator_reactivated(operator_id);
        self.emit(OperatorEvent::Reactivated { operator_id });
        Ok(())
    }

    pub(crate) fn delete(&mut self, operator_id: OperatorId) -> OperatorsResult<()> {
        let operator = self.must_get_operator(operator_id)?;
        if operator.status != OperatorStatus::Inactive {
            return Err(OperatorsError::OperatorNotInactive {
                id: operator_id,
                status: operator.status,
            });
        }

        self.hooks.before_operator_deleted(operator_id);
        self.remove_operator_record(&operator)?;
        self.delete_operator_params(operator_id)?;
        info!(operator_id, "[qc-18] operator deleted");
        self.emit(OperatorEvent::Deleted { operator_id });
        Ok(())
    }
}
