//! Events emitted by successful commands and ticks.

use serde::{Deserialize, Serialize};

use super::entities::{OperatorId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperatorEvent {
    Registered {
        operator_id: OperatorId,
    },
    Updated {
        operator_id: OperatorId,
    },
    InactivationStarted {
        operator_id: OperatorId,
        completion_time: Timestamp,
    },
    InactivationCompleted {
        operator_id: OperatorId,
    },
    Reactivated {
        operator_id: OperatorId,
    },
    Deleted {
        operator_id: OperatorId,
    },
    OwnershipTransferred {
        operator_id: OperatorId,
        new_admin: String,
    },
    ParamsSet {
        operator_id: OperatorId,
    },
    ModuleParamsUpdated,
}

impl OperatorEvent {
    pub fn operator_id(&self) -> Option<OperatorId> {
        use OperatorEvent::*;
        match self {
            Registered { operator_id }
            | Updated { operator_id }
            | InactivationStarted { operator_id, .. }
            | InactivationCompleted { operator_id }
            | Reactivated { operator_id }
            | Deleted { operator_id }
            | OwnershipTransferred { operator_id, .. }
            | ParamsSet { operator_id } => Some(*operator_id),
            ModuleParamsUpdated => None,
        }
    }
}
