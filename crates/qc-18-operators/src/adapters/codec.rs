//! Bincode encoding for persisted records.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::errors::{OperatorsError, OperatorsResult};

/// Encodes and decodes stored values with bincode.
///
/// Decoding failures mean the stored bytes are corrupt and surface as
/// `OperatorsError::Serialization`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl BincodeCodec {
    pub fn encode<T: Serialize>(value: &T) -> OperatorsResult<Vec<u8>> {
        bincode::serialize(value).map_err(|e| OperatorsError::Serialization {
            message: e.to_string(),
        })
    }

    pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> OperatorsResult<T> {
        bincode::deserialize(bytes).map_err(|e| OperatorsError::Serialization {
            message: e.to_string(),
        })
    }
}
