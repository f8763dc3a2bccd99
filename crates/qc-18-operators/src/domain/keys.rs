//! # Store Keys
//!
//! Byte layout of everything the operators ledger persists.
//!
//! | Prefix | Key | Value |
//! |--------|-----|-------|
//! | `0x01` | - | module `Params` |
//! | `0xa1` | - | next operator id (4 bytes BE) |
//! | `0xa2` | `id(4 BE)` | `Operator` |
//! | `0xa3` | `time(8 BE) ‖ id(4 BE)` | operator id (4 bytes BE) |
//! | `0xa4` | `address(20)` | empty marker |
//! | `0xa5` | `id(4 BE)` | `OperatorParams` |
//!
//! Big-endian encoding makes byte order equal numeric order, so a range
//! scan over the queue prefix visits entries in `(time, id)` order.

use super::address::Address;
use super::entities::{OperatorId, Timestamp};
use super::errors::{OperatorsError, OperatorsResult};

pub const PARAMS_KEY: &[u8] = &[0x01];
pub const NEXT_OPERATOR_ID_KEY: &[u8] = &[0xa1];

/// Namespaces for multi-entry collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KeyPrefix {
    Operator = 0xa2,
    InactivatingQueue = 0xa3,
    OperatorAddressSet = 0xa4,
    OperatorParams = 0xa5,
}

impl KeyPrefix {
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn as_bytes(self) -> [u8; 1] {
        [self as u8]
    }

    pub fn key(self, suffix: &[u8]) -> Vec<u8> {
        let mut key = Vec::with_capacity(1 + suffix.len());
        key.push(self as u8);
        key.extend_from_slice(suffix);
        key
    }
}

pub const ID_LEN: usize = 4;
pub const TIME_LEN: usize = 8;
pub const QUEUE_KEY_LEN: usize = 1 + TIME_LEN + ID_LEN;

pub fn encode_id(id: OperatorId) -> [u8; ID_LEN] {
    id.to_be_bytes()
}

pub fn decode_id(bytes: &[u8]) -> Option<OperatorId> {
    let arr: [u8; ID_LEN] = bytes.try_into().ok()?;
    Some(OperatorId::from_be_bytes(arr))
}

pub fn operator_key(id: OperatorId) -> Vec<u8> {
    KeyPrefix::Operator.key(&encode_id(id))
}

pub fn operator_params_key(id: OperatorId) -> Vec<u8> {
    KeyPrefix::OperatorParams.key(&encode_id(id))
}

pub fn address_set_key(address: &Address) -> Vec<u8> {
    KeyPrefix::OperatorAddressSet.key(address.as_bytes())
}

/// Parse the id out of an `Operator`/`OperatorParams` key.
pub fn parse_id_key(prefix: KeyPrefix, key: &[u8]) -> OperatorsResult<OperatorId> {
    let corrupt = |reason: &str| OperatorsError::CorruptKey {
        prefix: prefix.as_byte(),
        reason: reason.to_string(),
    };
    match key.split_first() {
        Some((p, rest)) if *p == prefix.as_byte() => {
            decode_id(rest).ok_or_else(|| corrupt("bad id length"))
        }
        _ => Err(corrupt("wrong prefix")),
    }
}

/// Build a queue key: `0xa3 ‖ time ‖ id`.
pub fn queue_key(completion_time: Timestamp, id: OperatorId) -> Vec<u8> {
    let mut key = Vec::with_capacity(QUEUE_KEY_LEN);
    key.push(KeyPrefix::InactivatingQueue.as_byte());
    key.extend_from_slice(&completion_time.to_be_bytes());
    key.extend_from_slice(&encode_id(id));
    key
}

/// Split a queue key back into `(time, id)`.
pub fn parse_queue_key(key: &[u8]) -> OperatorsResult<(Timestamp, OperatorId)> {
    let prefix = KeyPrefix::InactivatingQueue.as_byte();
    let corrupt = |reason: &str| OperatorsError::CorruptKey {
        prefix,
        reason: reason.to_string(),
    };
    if key.len() != QUEUE_KEY_LEN {
        return Err(corrupt("bad queue key length"));
    }
    if key[0] != prefix {
        return Err(corrupt("wrong prefix"));
    }
    let mut time = [0u8; TIME_LEN];
    time.copy_from_slice(&key[1..1 + TIME_LEN]);
    let id = decode_id(&key[1 + TIME_LEN..]).ok_or_else(|| corrupt("bad id length"))?;
    Ok((Timestamp::from_be_bytes(time), id))
}

/// Exclusive upper bound covering every queue entry with time `<= cutoff`.
pub fn queue_due_end(cutoff: Timestamp) -> Vec<u8> {
    let queue = KeyPrefix::InactivatingQueue.as_bytes();
    match cutoff.checked_add(1) {
        Some(next) => {
            let mut key = queue.to_vec();
            key.extend_from_slice(&next.to_be_bytes());
            key
        }
        // cutoff == u64::MAX: everything in the namespace is due
        None => next_prefix(&queue).unwrap_or_default(),
    }
}

/// Smallest key strictly greater than every key starting with `prefix`.
///
/// Returns `None` if `prefix` is all `0xff`.
pub fn next_prefix(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut next = prefix.to_vec();
    for i in (0..next.len()).rev() {
        if next[i] < 255 {
            next[i] += 1;
            next.truncate(i + 1);
            return Some(next);
        }
    }
    None
}
