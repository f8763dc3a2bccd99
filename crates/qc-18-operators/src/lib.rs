//! # Operators Ledger (qc-18)
//!
//! Registry of restaking operators: identity, delegation pools, the
//! lifecycle state machine and the time-indexed queue that drives
//! deactivation to completion.
//!
//! ## Architecture
//!
//! ```text
//!  tx pipeline ──Msg*──────────┐
//!                               ▼
//!  block scheduler ─tick─► OperatorsService ──► OverlayStore ──► KeyValueStore
//!                               │  │                 (commit on success)
//!  queries ◄────────────────────┘  ├──► TokenLedger (registration fee)
//!                                  ├──► AccountService (custodial account)
//!                                  └──► OperatorsHooks (lifecycle observers)
//! ```
//!
//! Every command and every tick runs as one unit: buffered writes are
//! flushed in a single batch on success and dropped on failure.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Monotonic Ids | Ids start at 1, never reused; every id < next id |
//! | 2 | Queue Consistency | Queue entry exists iff status is `inactivating` |
//! | 3 | Legal Transitions | active → inactivating → inactive → active only |
//! | 4 | Exact Deadline | Inactivation completes at the first tick with time ≥ deadline |
//! | 5 | Admin Gating | Only the admin mutates an operator; only the authority mutates params |
//! | 6 | Pool Soundness | Shares without tokens reject deposits |
//! | 7 | Atomic Commands | A failed command leaves state and events untouched |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Entities, fixed-point math, coins, pool accounting, keys
//! - `ports/` - Inbound API (commands, queries, tick, genesis) and outbound SPI
//! - `adapters/` - In-memory store, write buffer, codec, token ledger
//! - `hooks.rs` - Set-once hook chains
//! - `service/` - Application service implementing the API
//!
//! ## Usage
//!
//! ```ignore
//! use qc_18_operators::*;
//!
//! let mut service = OperatorsService::new(
//!     OperatorsDependencies {
//!         store: InMemoryKVStore::new(),
//!         token_ledger: InMemoryTokenLedger::new(),
//!         accounts: InMemoryAccounts::new(),
//!     },
//!     OperatorsConfig::from_env(),
//! )?;
//!
//! let id = service.register_operator(&ctx, MsgRegisterOperator::new(admin, "validator-1"))?;
//! service.begin_block(&next_ctx)?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod hooks;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use adapters::{BincodeCodec, InMemoryAccounts, InMemoryKVStore, InMemoryTokenLedger, OverlayStore};
pub use config::OperatorsConfig;
pub use domain::address::Address;
pub use domain::coins::{Coin, Coins, DecCoin, DecCoins};
pub use domain::decimal::Dec;
pub use domain::entities::{
    BlockContext, Operator, OperatorId, OperatorParams, OperatorParamsRecord, OperatorStatus,
    OperatorUpdate, Params, Timestamp, UnbondingOperator, DO_NOT_MODIFY,
};
pub use domain::errors::{ErrorKind, KVStoreError, OperatorsError, OperatorsResult};
pub use domain::events::OperatorEvent;
pub use domain::genesis::GenesisState;
pub use hooks::{HookChain, OperatorsHookChain, TransferHookChain};
pub use ports::inbound::{
    GenesisApi, MsgDeactivateOperator, MsgReactivateOperator, MsgRegisterOperator,
    MsgSetOperatorParams, MsgTransferOperatorOwnership, MsgUpdateOperator, MsgUpdateParams,
    OperatorsMsgApi, OperatorsPage, OperatorsQueryApi, PageRequest, TickApi, TickSummary,
};
pub use ports::outbound::{
    AccountService, BatchOperation, KeyValueStore, OperatorsHooks, TokenLedger, TransferHooks,
};
pub use service::{InvariantReport, OperatorsDependencies, OperatorsService};
