//! # Domain Errors
//!
//! Every failure of the operators ledger is an `OperatorsError`. Callers that
//! only care about the category use [`OperatorsError::kind`].

use thiserror::Error;

use super::decimal::Dec;
use super::entities::{OperatorId, OperatorStatus};

/// Failure category surfaced to the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Unauthorized,
    InvalidState,
    InsufficientFunds,
    /// Corrupt or undecodable state. Aborts the tick.
    Internal,
}

/// Errors raised by a key-value backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    #[error("KV I/O error: {message}")]
    IOError { message: String },
    #[error("KV corruption: {message}")]
    CorruptionError { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperatorsError {
    // ---- NotFound ----
    #[error("Operator not found: {id}")]
    OperatorNotFound { id: OperatorId },

    #[error("Inactivating queue entry not found for operator {id}")]
    QueueEntryNotFound { id: OperatorId },

    // ---- InvalidArgument ----
    #[error("Invalid operator id: {id}")]
    InvalidOperatorId { id: OperatorId },

    #[error("Invalid status for operator {id}: unspecified")]
    UnspecifiedStatus { id: OperatorId },

    #[error("Invalid moniker: must not be blank")]
    BlankMoniker,

    #[error("Invalid {field} address: {value}")]
    InvalidIdentity { field: &'static str, value: String },

    #[error("Reserved value used for {field}")]
    ReservedValue { field: &'static str },

    #[error("Invalid commission rate: {rate} (must be within [0, 1])")]
    InvalidCommissionRate { rate: Dec },

    #[error("Invalid deactivation time: must be positive")]
    InvalidDeactivationTime,

    #[error("Invalid coins: {reason}")]
    InvalidCoins { reason: String },

    #[error("Invalid genesis: {reason}")]
    InvalidGenesis { reason: String },

    #[error("Invalid pagination: {reason}")]
    InvalidPagination { reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // ---- Unauthorized ----
    #[error("Unauthorized: {sender} is not the admin of operator {id}")]
    NotOperatorAdmin { id: OperatorId, sender: String },

    #[error("Unauthorized: invalid authority; expected {expected}, got {got}")]
    InvalidAuthority { expected: String, got: String },

    // ---- InvalidState ----
    #[error("Operator {id} is not active (status: {status})")]
    OperatorNotActive { id: OperatorId, status: OperatorStatus },

    #[error("Operator {id} is not inactive (status: {status})")]
    OperatorNotInactive { id: OperatorId, status: OperatorStatus },

    #[error("Operator {id} is not inactivating (status: {status})")]
    OperatorNotInactivating { id: OperatorId, status: OperatorStatus },

    #[error("Insufficient pool: operator {id} has no {denom} tokens to price a deposit")]
    InsufficientPool { id: OperatorId, denom: String },

    #[error("Invalid exchange rate: operator {id} has {denom} shares but no tokens")]
    InvalidExchangeRate { id: OperatorId, denom: String },

    #[error("Insufficient shares: operator {id} cannot remove more {denom} than issued")]
    InsufficientShares { id: OperatorId, denom: String },

    #[error("{surface} hooks already set")]
    HooksAlreadySet { surface: &'static str },

    #[error("Transfer blocked: {reason}")]
    TransferBlocked { reason: String },

    #[error("Hook failed: {reason}")]
    HookFailed { reason: String },

    // ---- InsufficientFunds ----
    #[error("Insufficient funds: {address} has {available}, needs {required}")]
    InsufficientFunds {
        address: String,
        available: String,
        required: String,
    },

    // ---- Internal ----
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Corrupt key under prefix {prefix:#04x}: {reason}")]
    CorruptKey { prefix: u8, reason: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: &'static str },
}

impl OperatorsError {
    pub fn kind(&self) -> ErrorKind {
        use OperatorsError::*;
        match self {
            OperatorNotFound { .. } | QueueEntryNotFound { .. } => ErrorKind::NotFound,
            InvalidOperatorId { .. }
            | UnspecifiedStatus { .. }
            | BlankMoniker
            | InvalidIdentity { .. }
            | ReservedValue { .. }
            | InvalidCommissionRate { .. }
            | InvalidDeactivationTime
            | InvalidCoins { .. }
            | InvalidGenesis { .. }
            | InvalidPagination { .. }
            | InvalidConfig { .. } => ErrorKind::InvalidArgument,
            NotOperatorAdmin { .. } | InvalidAuthority { .. } => ErrorKind::Unauthorized,
            OperatorNotActive { .. }
            | OperatorNotInactive { .. }
            | OperatorNotInactivating { .. }
            | InsufficientPool { .. }
            | InvalidExchangeRate { .. }
            | InsufficientShares { .. }
            | HooksAlreadySet { .. }
            | TransferBlocked { .. }
            | HookFailed { .. } => ErrorKind::InvalidState,
            InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Storage(_) | Serialization { .. } | CorruptKey { .. } | Overflow { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Only corrupt state is fatal; everything else is a rejected request.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }
}

pub type OperatorsResult<T> = Result<T, OperatorsError>;
