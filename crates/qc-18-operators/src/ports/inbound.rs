//! # Inbound Ports (Driving Ports)
//!
//! API the operators ledger exposes to the transaction pipeline, the block
//! scheduler and query handlers.

use serde::{Deserialize, Serialize};

use crate::domain::address::Address;
use crate::domain::entities::{
    BlockContext, Operator, OperatorId, OperatorParams, OperatorStatus, Params, UnbondingOperator,
};
use crate::domain::errors::OperatorsResult;
use crate::domain::genesis::GenesisState;

// =============================================================================
// COMMANDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRegisterOperator {
    pub sender: String,
    pub moniker: String,
    pub website: String,
    pub picture_url: String,
}

impl MsgRegisterOperator {
    pub fn new(sender: impl Into<String>, moniker: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            moniker: moniker.into(),
            website: String::new(),
            picture_url: String::new(),
        }
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = website.into();
        self
    }

    pub fn with_picture_url(mut self, picture_url: impl Into<String>) -> Self {
        self.picture_url = picture_url.into();
        self
    }
}

/// Fields left at `DO_NOT_MODIFY` keep their stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateOperator {
    pub sender: String,
    pub operator_id: OperatorId,
    pub moniker: String,
    pub website: String,
    pub picture_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDeactivateOperator {
    pub sender: String,
    pub operator_id: OperatorId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgReactivateOperator {
    pub sender: String,
    pub operator_id: OperatorId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgTransferOperatorOwnership {
    pub sender: String,
    pub operator_id: OperatorId,
    pub new_admin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSetOperatorParams {
    pub sender: String,
    pub operator_id: OperatorId,
    pub params: OperatorParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateParams {
    pub authority: String,
    pub params: Params,
}

/// State-mutating commands. Each one either fully applies or leaves no trace.
pub trait OperatorsMsgApi {
    /// Returns the id assigned to the new operator.
    fn register_operator(
        &mut self,
        ctx: &BlockContext,
        msg: MsgRegisterOperator,
    ) -> OperatorsResult<OperatorId>;

    fn update_operator(&mut self, ctx: &BlockContext, msg: MsgUpdateOperator) -> OperatorsResult<()>;

    fn deactivate_operator(
        &mut self,
        ctx: &BlockContext,
        msg: MsgDeactivateOperator,
    ) -> OperatorsResult<()>;

    fn reactivate_operator(
        &mut self,
        ctx: &BlockContext,
        msg: MsgReactivateOperator,
    ) -> OperatorsResult<()>;

    fn transfer_operator_ownership(
        &mut self,
        ctx: &BlockContext,
        msg: MsgTransferOperatorOwnership,
    ) -> OperatorsResult<()>;

    fn set_operator_params(
        &mut self,
        ctx: &BlockContext,
        msg: MsgSetOperatorParams,
    ) -> OperatorsResult<()>;

    fn update_params(&mut self, ctx: &BlockContext, msg: MsgUpdateParams) -> OperatorsResult<()>;
}

// =============================================================================
// QUERIES
// =============================================================================

/// Cursor-based page over operators, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// First id to include. `None` starts from the beginning.
    pub key: Option<OperatorId>,
    /// Clamped to the configured maximum. `None` uses the default.
    pub limit: Option<usize>,
    /// Only return operators with this status.
    pub status: Option<OperatorStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorsPage {
    pub operators: Vec<Operator>,
    /// Pass as `PageRequest::key` to fetch the next page.
    pub next_key: Option<OperatorId>,
}

pub trait OperatorsQueryApi {
    fn operator(&self, operator_id: OperatorId) -> OperatorsResult<Operator>;

    fn operators(&self, page: &PageRequest) -> OperatorsResult<OperatorsPage>;

    /// Default params when no record is stored; `NotFound` if the operator
    /// does not exist.
    fn operator_params(&self, operator_id: OperatorId) -> OperatorsResult<OperatorParams>;

    fn params(&self) -> OperatorsResult<Params>;

    fn is_operator_address(&self, address: &Address) -> OperatorsResult<bool>;

    fn inactivating_operators(&self) -> OperatorsResult<Vec<UnbondingOperator>>;
}

// =============================================================================
// TICK & GENESIS
// =============================================================================

/// Outcome of one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub height: u64,
    /// Operators moved to `inactive`, in completion order.
    pub completed: Vec<OperatorId>,
}

/// Entry point for the block scheduler.
pub trait TickApi {
    /// Complete every inactivation due at `ctx.time`.
    fn begin_block(&mut self, ctx: &BlockContext) -> OperatorsResult<TickSummary>;
}

pub trait GenesisApi {
    fn init_genesis(&mut self, state: &GenesisState) -> OperatorsResult<()>;

    fn export_genesis(&self) -> OperatorsResult<GenesisState>;
}
