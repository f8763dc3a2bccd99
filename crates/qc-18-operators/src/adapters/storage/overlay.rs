//! Write buffer over a parent store.
//!
//! Reads check the buffer first, then fall through to the parent. Writes and
//! deletes only touch the buffer until [`OverlayStore::commit`] flushes them
//! with a single `atomic_batch_write`. [`OverlayStore::discard`] drops them.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::iter::Peekable;

use super::scan_bounds;
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, KvIter};

/// `None` marks a buffered delete.
type Writes = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

#[derive(Debug, Default)]
pub struct OverlayStore<KV: KeyValueStore> {
    parent: KV,
    writes: Writes,
}

impl<KV: KeyValueStore> OverlayStore<KV> {
    pub fn new(parent: KV) -> Self {
        Self {
            parent,
            writes: BTreeMap::new(),
        }
    }

    /// Number of buffered writes and deletes.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Flush buffered writes to the parent atomically.
    ///
    /// The buffer is emptied whether or not the parent write succeeds.
    pub fn commit(&mut self) -> Result<(), KVStoreError> {
        let writes = std::mem::take(&mut self.writes);
        if writes.is_empty() {
            return Ok(());
        }
        let ops = writes
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOperation::Put { key, value },
                None => BatchOperation::Delete { key },
            })
            .collect();
        self.parent.atomic_batch_write(ops)
    }

    pub fn discard(&mut self) {
        self.writes.clear();
    }

    pub fn parent(&self) -> &KV {
        &self.parent
    }

    /// Unwrap the parent. Buffered writes are dropped.
    pub fn into_parent(self) -> KV {
        self.parent
    }
}

impl<KV: KeyValueStore> KeyValueStore for OverlayStore<KV> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        match self.writes.get(key) {
            Some(buffered) => Ok(buffered.clone()),
            None => self.parent.get(key),
        }
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    self.writes.insert(key, Some(value));
                }
                BatchOperation::Delete { key } => {
                    self.writes.insert(key, None);
                }
            }
        }
        Ok(())
    }

    fn range_scan<'a>(
        &'a self,
        start: &[u8],
        end: Option<&[u8]>,
    ) -> Result<KvIter<'a>, KVStoreError> {
        let Some(bounds) = scan_bounds(start, end) else {
            return Ok(Box::new(std::iter::empty()));
        };
        let parent = self.parent.range_scan(start, end)?.peekable();
        let buffered = self.writes.range::<[u8], _>(bounds).peekable();
        Ok(Box::new(MergeIter { parent, buffered }))
    }
}

/// Merges the parent's entries with buffered writes, buffer winning on ties.
struct MergeIter<'a, B>
where
    B: Iterator<Item = (&'a Vec<u8>, &'a Option<Vec<u8>>)>,
{
    parent: Peekable<KvIter<'a>>,
    buffered: Peekable<B>,
}

impl<'a, B> Iterator for MergeIter<'a, B>
where
    B: Iterator<Item = (&'a Vec<u8>, &'a Option<Vec<u8>>)>,
{
    type Item = (Vec<u8>, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let order = match (self.parent.peek(), self.buffered.peek()) {
                (None, None) => return None,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some((pk, _)), Some((bk, _))) => pk.as_slice().cmp(bk.as_slice()),
            };
            match order {
                Ordering::Less => return self.parent.next(),
                Ordering::Equal => {
                    self.parent.next();
                }
                Ordering::Greater => {}
            }
            let (key, value) = self.buffered.next()?;
            if let Some(value) = value {
                return Some((key.clone(), value.clone()));
            }
            // tombstone: keep going
        }
    }
}
