//! Cross-entity consistency checks over committed and buffered state.

use std::collections::BTreeMap;

use super::OperatorsService;
use crate::domain::address::Address;
use crate::domain::entities::{OperatorStatus, Timestamp};
use crate::domain::errors::OperatorsResult;
use crate::ports::outbound::{AccountService, KeyValueStore, TokenLedger};

/// Violations found by one check. Empty when the ledger is consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvariantReport {
    pub broken: Vec<String>,
}

impl InvariantReport {
    pub fn is_ok(&self) -> bool {
        self.broken.is_empty()
    }
}

impl<KV, TL, AS> OperatorsService<KV, TL, AS>
where
    KV: KeyValueStore,
    TL: TokenLedger,
    AS: AccountService,
{
    /// Check that:
    ///
    /// - every operator id is below the next id and every record validates
    /// - every operator address is in the address set
    /// - an operator has a queue entry iff it is inactivating, and at most one
    /// - params records point at existing operators
    ///
    /// A pool holding shares without tokens is a valid state; delegation
    /// into it is refused by the pool accounting instead.
    ///
    /// Storage and decoding errors are returned, not reported.
    pub fn check_invariants(&self) -> OperatorsResult<InvariantReport> {
        let mut report = InvariantReport::default();
        let next_id = self.peek_next_operator_id()?;

        let mut queued: BTreeMap<_, Vec<Timestamp>> = BTreeMap::new();
        for entry in self.list_inactivating()? {
            queued
                .entry(entry.operator_id)
                .or_default()
                .push(entry.completion_time);
        }

        let operators = self.get_operators()?;
        let mut statuses = BTreeMap::new();
        for operator in &operators {
            statuses.insert(operator.id, operator.status);

            if operator.id >= next_id {
                report.broken.push(format!(
                    "operator {} is not below next operator id {}",
                    operator.id, next_id
                ));
            }
            if let Err(e) = operator.validate() {
                report
                    .broken
                    .push(format!("operator {} is invalid: {}", operator.id, e));
            }
            match operator.address.parse::<Address>() {
                Ok(address) if self.is_operator_address(&address)? => {}
                _ => report.broken.push(format!(
                    "operator {} address {} missing from address set",
                    operator.id, operator.address
                )),
            }

            let entries = queued.get(&operator.id).map_or(0, Vec::len);
            match (operator.status, entries) {
                (OperatorStatus::Inactivating, 1) => {}
                (OperatorStatus::Inactivating, n) => report.broken.push(format!(
                    "inactivating operator {} has {} queue entries",
                    operator.id, n
                )),
                (status, n) if n > 0 => report.broken.push(format!(
                    "{} operator {} has {} queue entries",
                    status, operator.id, n
                )),
                _ => {}
            }
        }

        for id in queued.keys().filter(|id| !statuses.contains_key(*id)) {
            report
                .broken
                .push(format!("queue entry for unknown operator {}", id));
        }

        for record in self.get_all_operator_params_records()? {
            if !statuses.contains_key(&record.operator_id) {
                report.broken.push(format!(
                    "params for unknown operator {}",
                    record.operator_id
                ));
            }
        }

        Ok(report)
    }
}
