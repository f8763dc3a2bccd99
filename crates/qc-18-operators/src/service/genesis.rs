//! Genesis import and export.
//!
//! Import restores state verbatim: accounts are created for every operator
//! but no hooks fire and no registration fee is charged. Export followed by
//! import reproduces the same store contents.

use tracing::info;

use super::OperatorsService;
use crate::domain::errors::{OperatorsError, OperatorsResult};
use crate::domain::genesis::GenesisState;
use crate::ports::inbound::GenesisApi;
use crate::ports::outbound::{AccountService, KeyValueStore, TokenLedger};

impl<KV, TL, AS> GenesisApi for OperatorsService<KV, TL, AS>
where
    KV: KeyValueStore,
    TL: TokenLedger,
    AS: AccountService,
{
    fn init_genesis(&mut self, state: &GenesisState) -> OperatorsResult<()> {
        state.validate()?;

        self.run_atomic("init_genesis", |svc| {
            svc.set_next_operator_id(state.next_operator_id)?;

            for operator in &state.operators {
                svc.create_operator(operator)?;
            }

            for record in &state.operators_params {
                if svc.get_operator(record.operator_id)?.is_none() {
                    return Err(OperatorsError::OperatorNotFound {
                        id: record.operator_id,
                    });
                }
                svc.save_operator_params(record.operator_id, &record.params)?;
            }

            for entry in &state.unbonding_operators {
                svc.queue_insert(entry.operator_id, entry.completion_time)?;
            }

            svc.set_params(&state.params)?;

            info!(
                operators = state.operators.len(),
                inactivating = state.unbonding_operators.len(),
                next_operator_id = state.next_operator_id,
                "[qc-18] genesis imported"
            );
            Ok(())
        })
    }

    fn export_genesis(&self) -> OperatorsResult<GenesisState> {
        Ok(GenesisState {
            next_operator_id: self.peek_next_operator_id()?,
            operators: self.get_operators()?,
            operators_params: self.get_all_operator_params_records()?,
            unbonding_operators: self.list_inactivating()?,
            params: self.get_params()?,
        })
    }
}
