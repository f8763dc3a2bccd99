//! Storage adapters for the `KeyValueStore` port.

mod memory;
mod overlay;

pub use memory::InMemoryKVStore;
pub use overlay::OverlayStore;

use std::ops::Bound;

/// Range bounds for `[start, end)`, or `None` if the range is empty.
///
/// `BTreeMap::range` panics on inverted bounds, so callers check first.
pub(crate) fn scan_bounds<'a>(
    start: &'a [u8],
    end: Option<&'a [u8]>,
) -> Option<(Bound<&'a [u8]>, Bound<&'a [u8]>)> {
    match end {
        Some(end) if end <= start => None,
        Some(end) => Some((Bound::Included(start), Bound::Excluded(end))),
        None => Some((Bound::Included(start), Bound::Unbounded)),
    }
}
