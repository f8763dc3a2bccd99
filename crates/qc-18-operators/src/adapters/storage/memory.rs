use std::collections::BTreeMap;

use super::scan_bounds;
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, KvIter};

/// Ordered in-memory key-value store.
///
/// Backed by a `BTreeMap` so range scans only touch keys inside the range.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.remove(key);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        // Single-threaded, nothing can fail halfway.
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    self.data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    self.data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn range_scan<'a>(
        &'a self,
        start: &[u8],
        end: Option<&[u8]>,
    ) -> Result<KvIter<'a>, KVStoreError> {
        let Some(bounds) = scan_bounds(start, end) else {
            return Ok(Box::new(std::iter::empty()));
        };
        Ok(Box::new(
            self.data
                .range::<[u8], _>(bounds)
                .map(|(k, v)| (k.clone(), v.clone())),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_kv_store() {
        let mut store = InMemoryKVStore::new();

        store.put(b"key1", b"value1").unwrap();
        store.put(b"key2", b"value2").unwrap();

        assert_eq!(store.get(b"key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(store.get(b"key3").unwrap(), None);
        assert!(store.exists(b"key1").unwrap());

        store.delete(b"key1").unwrap();
        assert!(!store.exists(b"key1").unwrap());
    }

    #[test]
    fn test_range_scan_is_ordered_and_half_open() {
        let mut store = InMemoryKVStore::new();
        for k in [[3u8], [1], [2], [5]] {
            store.put(&k, &k).unwrap();
        }
        let keys: Vec<_> = store
            .range_scan(&[1], Some(&[5u8][..]))
            .unwrap()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![vec![1], vec![2], vec![3]]);

        assert_eq!(store.range_scan(&[5], Some(&[1u8][..])).unwrap().count(), 0);
        assert_eq!(store.range_scan(&[2], None).unwrap().count(), 3);
    }

    #[test]
    fn test_prefix_scan() {
        let mut store = InMemoryKVStore::new();
        store.put(&[0xa2, 1], b"a").unwrap();
        store.put(&[0xa2, 2], b"b").unwrap();
        store.put(&[0xa3, 1], b"c").unwrap();
        let found = store.prefix_scan(&[0xa2]).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, vec![0xa2, 1]);
    }

    #[test]
    fn test_atomic_batch_write() {
        let mut store = InMemoryKVStore::new();
        store.put(b"gone", b"x").unwrap();
        store
            .atomic_batch_write(vec![
                BatchOperation::put(b"a".to_vec(), b"1".to_vec()),
                BatchOperation::delete(b"gone".to_vec()),
            ])
            .unwrap();
        assert!(store.exists(b"a").unwrap());
        assert!(!store.exists(b"gone").unwrap());
    }
}
