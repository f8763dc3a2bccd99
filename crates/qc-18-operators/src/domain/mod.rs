//! # Domain Layer
//!
//! Pure value types and functions for the operators ledger. Nothing in here
//! touches storage.
//!
//! ## Modules
//!
//! - `decimal` - 18-digit fixed-point arithmetic over `U256`
//! - `coins` - Multi-denomination integer and decimal amounts
//! - `address` - 20-byte identities
//! - `entities` - Operator, params, queue entries
//! - `pool` - Token/share exchange-rate accounting
//! - `keys` - Persisted byte layout
//! - `genesis` - Genesis snapshot and its validation
//! - `events` - Events recorded by successful commands
//! - `errors` - Error taxonomy

pub mod address;
pub mod coins;
pub mod decimal;
pub mod entities;
pub mod errors;
pub mod events;
pub mod genesis;
pub mod keys;
pub mod pool;
