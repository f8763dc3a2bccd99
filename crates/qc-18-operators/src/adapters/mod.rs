//! # Adapters
//!
//! - `storage` - ordered in-memory store and the write-buffer overlay
//! - `codec` - bincode record encoding
//! - `bank` - in-memory token ledger and account registry

pub mod bank;
pub mod codec;
pub mod storage;

pub use bank::{InMemoryAccounts, InMemoryTokenLedger};
pub use codec::BincodeCodec;
pub use storage::{InMemoryKVStore, OverlayStore};
