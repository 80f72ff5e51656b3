use crate::error::StoreResult;

/// One ledger entry produced by a range scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered iterator over a key range.
///
/// Any resources held by the scan are released when the iterator is dropped,
/// whether it was exhausted, abandoned after an error, or never advanced.
pub type StateIterator<'a> = Box<dyn Iterator<Item = StoreResult<KeyValue>> + 'a>;

/// Capability the registry consumes from the ledger.
///
/// Implementations must satisfy these invariants:
/// - `get_state` returns `Ok(None)` for an absent key, `Err` only on backend
///   failure.
/// - `state_by_range` yields keys in ascending byte order within
///   `[start_key, end_key)`; an empty `end_key` means no upper bound.
/// - A `put_state` may still be rejected later, at commit, if it conflicts
///   with a concurrent writer. Callers must not assume single-writer
///   execution.
pub trait LedgerStore {
    /// Read the value stored at `key`.
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` at `key`.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Scan `[start_key, end_key)` in ascending key order.
    fn state_by_range(&self, start_key: &str, end_key: &str) -> StoreResult<StateIterator<'_>>;
}
