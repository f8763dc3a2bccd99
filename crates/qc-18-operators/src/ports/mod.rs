//! # Ports Layer
//!
//! - `inbound.rs` - Driving ports (commands, queries, tick, genesis)
//! - `outbound.rs` - Driven ports (storage, token ledger, accounts, hooks)

pub mod inbound;
pub mod outbound;
