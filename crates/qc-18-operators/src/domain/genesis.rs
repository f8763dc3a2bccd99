//! # Genesis State
//!
//! Full snapshot of the operators ledger: allocator, operators, params
//! records, the inactivating queue and module params.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::entities::{
    OperatorId, OperatorParamsRecord, OperatorStatus, Operator, Params, UnbondingOperator,
};
use super::errors::{OperatorsError, OperatorsResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub next_operator_id: OperatorId,
    pub operators: Vec<Operator>,
    pub operators_params: Vec<OperatorParamsRecord>,
    pub unbonding_operators: Vec<UnbondingOperator>,
    pub params: Params,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self {
            next_operator_id: 1,
            operators: Vec::new(),
            operators_params: Vec::new(),
            unbonding_operators: Vec::new(),
            params: Params::default(),
        }
    }
}

fn invalid(reason: impl Into<String>) -> OperatorsError {
    OperatorsError::InvalidGenesis {
        reason: reason.into(),
    }
}

impl GenesisState {
    pub fn validate(&self) -> OperatorsResult<()> {
        if self.next_operator_id == 0 {
            return Err(invalid("next operator id must be positive"));
        }

        let mut statuses = BTreeMap::new();
        for operator in &self.operators {
            operator
                .validate()
                .map_err(|e| invalid(format!("invalid operator {}: {}", operator.id, e)))?;
            if operator.id >= self.next_operator_id {
                return Err(invalid(format!(
                    "operator id {} is not below next operator id {}",
                    operator.id, self.next_operator_id
                )));
            }
            if statuses.insert(operator.id, operator.status).is_some() {
                return Err(invalid(format!("duplicated operator: {}", operator.id)));
            }
        }

        let mut params_seen = BTreeSet::new();
        for record in &self.operators_params {
            if !statuses.contains_key(&record.operator_id) {
                return Err(invalid(format!(
                    "params for unknown operator {}",
                    record.operator_id
                )));
            }
            if !params_seen.insert(record.operator_id) {
                return Err(invalid(format!(
                    "duplicated params for operator {}",
                    record.operator_id
                )));
            }
            record.params.validate()?;
        }

        let mut unbonding_seen = BTreeSet::new();
        for entry in &self.unbonding_operators {
            if entry.operator_id == 0 {
                return Err(invalid("unbonding entry with zero operator id"));
            }
            if entry.completion_time == 0 {
                return Err(invalid(format!(
                    "unbonding entry for operator {} has zero completion time",
                    entry.operator_id
                )));
            }
            if !unbonding_seen.insert(entry.operator_id) {
                return Err(invalid(format!(
                    "duplicated unbonding entry for operator {}",
                    entry.operator_id
                )));
            }
            match statuses.get(&entry.operator_id) {
                None => {
                    return Err(invalid(format!(
                        "unbonding entry for unknown operator {}",
                        entry.operator_id
                    )))
                }
                Some(OperatorStatus::Inactivating) => {}
                Some(status) => {
                    return Err(OperatorsError::OperatorNotInactivating {
                        id: entry.operator_id,
                        status: *status,
                    })
                }
            }
        }

        if let Some((id, _)) = statuses
            .iter()
            .find(|(id, s)| **s == OperatorStatus::Inactivating && !unbonding_seen.contains(*id))
        {
            return Err(invalid(format!(
                "operator {} is inactivating without an unbonding entry",
                id
            )));
        }

        self.params.validate()
    }

    pub fn to_json(&self) -> OperatorsResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| OperatorsError::Serialization {
            message: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> OperatorsResult<Self> {
        serde_json::from_str(json).map_err(|e| OperatorsError::InvalidGenesis {
            reason: e.to_string(),
        })
    }
}
