//! Command handlers.
//!
//! Admin-gated commands load the operator, compare the sender against the
//! stored admin, then delegate to the entity store or the lifecycle.

use tracing::info;

use super::OperatorsService;
use crate::domain::entities::{
    validate_identity, BlockContext, Operator, OperatorId, OperatorStatus, OperatorUpdate,
    DO_NOT_MODIFY,
};
use crate::domain::errors::{OperatorsError, OperatorsResult};
use crate::domain::events::OperatorEvent;
use crate::ports::inbound::{
    MsgDeactivateOperator, MsgReactivateOperator, MsgRegisterOperator, MsgSetOperatorParams,
    MsgTransferOperatorOwnership, MsgUpdateOperator, MsgUpdateParams, OperatorsMsgApi,
};
use crate::ports::outbound::{AccountService, KeyValueStore, TokenLedger};

impl<KV, TL, AS> OperatorsService<KV, TL, AS>
where
    KV: KeyValueStore,
    TL: TokenLedger,
    AS: AccountService,
{
    /// Load the operator and check `sender` is its admin.
    fn operator_for_admin(&self, operator_id: OperatorId, sender: &str) -> OperatorsResult<Operator> {
        let operator = self.must_get_operator(operator_id)?;
        if operator.admin != sender {
            return Err(OperatorsError::NotOperatorAdmin {
                id: operator_id,
                sender: sender.to_string(),
            });
        }
        Ok(operator)
    }
}

impl<KV, TL, AS> OperatorsMsgApi for OperatorsService<KV, TL, AS>
where
    KV: KeyValueStore,
    TL: TokenLedger,
    AS: AccountService,
{
    fn register_operator(
        &mut self,
        ctx: &BlockContext,
        msg: MsgRegisterOperator,
    ) -> OperatorsResult<OperatorId> {
        self.run_atomic("register_operator", |svc| {
            for (field, value) in [
                ("moniker", &msg.moniker),
                ("website", &msg.website),
                ("picture_url", &msg.picture_url),
            ] {
                if value == DO_NOT_MODIFY {
                    return Err(OperatorsError::ReservedValue { field });
                }
            }

            let operator_id = svc.peek_next_operator_id()?;
            let operator = Operator::new(
                operator_id,
                OperatorStatus::Active,
                msg.moniker.clone(),
                msg.website.clone(),
                msg.picture_url.clone(),
                msg.sender.clone(),
            );
            operator.validate()?;

            let next_id = operator_id.checked_add(1).ok_or(OperatorsError::Overflow {
                context: "next operator id",
            })?;
            svc.set_next_operator_id(next_id)?;

            svc.register(&operator)?;

            info!(
                operator_id,
                admin = %msg.sender,
                height = ctx.height,
                "[qc-18] operator registered"
            );
            svc.emit(OperatorEvent::Registered { operator_id });
            Ok(operator_id)
        })
    }

    fn update_operator(&mut self, _ctx: &BlockContext, msg: MsgUpdateOperator) -> OperatorsResult<()> {
        self.run_atomic("update_operator", |svc| {
            let operator = svc.operator_for_admin(msg.operator_id, &msg.sender)?;
            let updated = operator.update(&OperatorUpdate::new(
                msg.moniker.clone(),
                msg.website.clone(),
                msg.picture_url.clone(),
            ));
            updated.validate()?;
            svc.put_operator(&updated)?;
            svc.emit(OperatorEvent::Updated {
                operator_id: msg.operator_id,
            });
            Ok(())
        })
    }

    fn deactivate_operator(
        &mut self,
        ctx: &BlockContext,
        msg: MsgDeactivateOperator,
    ) -> OperatorsResult<()> {
        self.run_atomic("deactivate_operator", |svc| {
            svc.operator_for_admin(msg.operator_id, &msg.sender)?;
            svc.start_inactivation(ctx, msg.operator_id)?;
            Ok(())
        })
    }

    fn reactivate_operator(
        &mut self,
        _ctx: &BlockContext,
        msg: MsgReactivateOperator,
    ) -> OperatorsResult<()> {
        self.run_atomic("reactivate_operator", |svc| {
            svc.operator_for_admin(msg.operator_id, &msg.sender)?;
            svc.reactivate(msg.operator_id)
        })
    }

    fn transfer_operator_ownership(
        &mut self,
        _ctx: &BlockContext,
        msg: MsgTransferOperatorOwnership,
    ) -> OperatorsResult<()> {
        self.run_atomic("transfer_operator_ownership", |svc| {
            let mut operator = svc.operator_for_admin(msg.operator_id, &msg.sender)?;
            validate_identity("new admin", &msg.new_admin)?;
            operator.admin = msg.new_admin.clone();
            svc.put_operator(&operator)?;

            info!(
                operator_id = msg.operator_id,
                new_admin = %msg.new_admin,
                "[qc-18] operator ownership transferred"
            );
            svc.emit(OperatorEvent::OwnershipTransferred {
                operator_id: msg.operator_id,
                new_admin: msg.new_admin.clone(),
            });
            Ok(())
        })
    }

    fn set_operator_params(
        &mut self,
        _ctx: &BlockContext,
        msg: MsgSetOperatorParams,
    ) -> OperatorsResult<()> {
        self.run_atomic("set_operator_params", |svc| {
            svc.operator_for_admin(msg.operator_id, &msg.sender)?;
            svc.save_operator_params(msg.operator_id, &msg.params)?;
            svc.emit(OperatorEvent::ParamsSet {
                operator_id: msg.operator_id,
            });
            Ok(())
        })
    }

    fn update_params(&mut self, _ctx: &BlockContext, msg: MsgUpdateParams) -> OperatorsResult<()> {
        self.run_atomic("update_params", |svc| {
            if msg.authority != svc.config.authority {
                return Err(OperatorsError::InvalidAuthority {
                    expected: svc.config.authority.clone(),
                    got: msg.authority.clone(),
                });
            }
            svc.set_params(&msg.params)?;
            info!(
                deactivation_secs = msg.params.deactivation_time.as_secs(),
                registration_fee = %msg.params.registration_fee,
                "[qc-18] module params updated"
            );
            svc.emit(OperatorEvent::ModuleParamsUpdated);
            Ok(())
        })
    }
}
