//! Read-only queries.

use super::OperatorsService;
use crate::domain::address::Address;
use crate::domain::entities::{Operator, OperatorId, OperatorParams, Params, UnbondingOperator};
use crate::domain::errors::{OperatorsError, OperatorsResult};
use crate::ports::inbound::{OperatorsPage, OperatorsQueryApi, PageRequest};
use crate::ports::outbound::{AccountService, KeyValueStore, TokenLedger};

impl<KV, TL, AS> OperatorsQueryApi for OperatorsService<KV, TL, AS>
where
    KV: KeyValueStore,
    TL: TokenLedger,
    AS: AccountService,
{
    fn operator(&self, operator_id: OperatorId) -> OperatorsResult<Operator> {
        self.must_get_operator(operator_id)
    }

    fn operators(&self, page: &PageRequest) -> OperatorsResult<OperatorsPage> {
        let limit = match page.limit {
            Some(0) => {
                return Err(OperatorsError::InvalidPagination {
                    reason: "limit must be positive".to_string(),
                })
            }
            Some(limit) => limit.min(self.config.max_page_limit),
            None => self.config.default_page_limit,
        };

        let mut operators = Vec::with_capacity(limit.min(64));
        let mut next_key = None;
        self.scan_operators(page.key, |operator| {
            if page.status.map_or(false, |status| status != operator.status) {
                return Ok(true);
            }
            if operators.len() == limit {
                next_key = Some(operator.id);
                return Ok(false);
            }
            operators.push(operator);
            Ok(true)
        })?;

        Ok(OperatorsPage {
            operators,
            next_key,
        })
    }

    fn operator_params(&self, operator_id: OperatorId) -> OperatorsResult<OperatorParams> {
        self.must_get_operator(operator_id)?;
        self.get_operator_params(operator_id)
    }

    fn params(&self) -> OperatorsResult<Params> {
        self.get_params()
    }

    fn is_operator_address(&self, address: &Address) -> OperatorsResult<bool> {
        OperatorsService::is_operator_address(self, address)
    }

    fn inactivating_operators(&self) -> OperatorsResult<Vec<UnbondingOperator>> {
        self.list_inactivating()
    }
}
