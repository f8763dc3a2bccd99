//! Time-indexed queue of inactivating operators.
//!
//! Entries live under `0xa3 ‖ completion_time ‖ id`; the value repeats the
//! id and is checked against the key on every read.

use super::OperatorsService;
use crate::domain::entities::{OperatorId, Timestamp, UnbondingOperator};
use crate::domain::errors::{OperatorsError, OperatorsResult};
use crate::domain::keys::{
    decode_id, encode_id, next_prefix, parse_queue_key, queue_due_end, queue_key, KeyPrefix,
};
use crate::ports::outbound::{AccountService, KeyValueStore, TokenLedger};

/// Decode a queue entry and check the value agrees with the key.
fn decode_entry(key: &[u8], value: &[u8]) -> OperatorsResult<UnbondingOperator> {
    let (completion_time, operator_id) = parse_queue_key(key)?;
    if decode_id(value) != Some(operator_id) {
        return Err(OperatorsError::CorruptKey {
            prefix: KeyPrefix::InactivatingQueue.as_byte(),
            reason: format!("queue value does not match operator {}", operator_id),
        });
    }
    Ok(UnbondingOperator::new(operator_id, completion_time))
}

impl<KV, TL, AS> OperatorsService<KV, TL, AS>
where
    KV: KeyValueStore,
    TL: TokenLedger,
    AS: AccountService,
{
    pub(crate) fn queue_insert(
        &mut self,
        operator_id: OperatorId,
        completion_time: Timestamp,
    ) -> OperatorsResult<()> {
        self.store
            .put(&queue_key(completion_time, operator_id), &encode_id(operator_id))?;
        Ok(())
    }

    /// Visit entries with `completion_time <= cutoff` in `(time, id)` order.
    ///
    /// Only the due range is scanned. `visit` returns `true` to stop early.
    pub fn iterate_due<F>(&self, cutoff: Timestamp, mut visit: F) -> OperatorsResult<()>
    where
        F: FnMut(UnbondingOperator) -> OperatorsResult<bool>,
    {
        let start = KeyPrefix::InactivatingQueue.as_bytes();
        let end = queue_due_end(cutoff);
        for (key, value) in self.store.range_scan(&start, Some(end.as_slice()))? {
            if visit(decode_entry(&key, &value)?)? {
                break;
            }
        }
        Ok(())
    }

    /// Entries due at `cutoff`, materialized.
    pub fn due_entries(&self, cutoff: Timestamp) -> OperatorsResult<Vec<UnbondingOperator>> {
        let mut due = Vec::new();
        self.iterate_due(cutoff, |entry| {
            due.push(entry);
            Ok(false)
        })?;
        Ok(due)
    }

    /// Completion time of the operator's queue entry, by full scan.
    pub fn find_completion_time(&self, operator_id: OperatorId) -> OperatorsResult<Option<Timestamp>> {
        Ok(self
            .list_inactivating()?
            .into_iter()
            .find(|e| e.operator_id == operator_id)
            .map(|e| e.completion_time))
    }

    /// Remove the operator's entry. Pass `completion_time` when known to
    /// skip the scan.
    pub(crate) fn queue_remove(
        &mut self,
        operator_id: OperatorId,
        completion_time: Option<Timestamp>,
    ) -> OperatorsResult<Timestamp> {
        let time = match completion_time {
            Some(time) => time,
            None => self
                .find_completion_time(operator_id)?
                .ok_or(OperatorsError::QueueEntryNotFound { id: operator_id })?,
        };
        let key = queue_key(time, operator_id);
        if !self.store.exists(&key)? {
            return Err(OperatorsError::QueueEntryNotFound { id: operator_id });
        }
        self.store.delete(&key)?;
        Ok(time)
    }

    /// The whole queue in `(time, id)` order.
    pub fn list_inactivating(&self) -> OperatorsResult<Vec<UnbondingOperator>> {
        let prefix = KeyPrefix::InactivatingQueue.as_bytes();
        let end = next_prefix(&prefix);
        self.store
            .range_scan(&prefix, end.as_deref())?
            .map(|(key, value)| decode_entry(&key, &value))
            .collect()
    }
}
