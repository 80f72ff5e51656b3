use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::{KeyValue, LedgerStore, StateIterator};

/// A committed value and the commit sequence that wrote it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct VersionedValue {
    pub(crate) value: Vec<u8>,
    pub(crate) version: u64,
}

#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    pub(crate) entries: BTreeMap<String, VersionedValue>,
    pub(crate) commit_seq: u64,
}

impl LedgerState {
    pub(crate) fn range<'a>(
        &'a self,
        start: &'a str,
        end: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a VersionedValue)> + 'a {
        range_bounds(start, end)
            .into_iter()
            .flat_map(move |bounds| self.entries.range::<str, _>(bounds))
    }
}

/// `None` when the range is empty by construction (`start >= end`).
fn range_bounds<'a>(start: &'a str, end: &'a str) -> Option<(Bound<&'a str>, Bound<&'a str>)> {
    if end.is_empty() {
        return Some((Bound::Included(start), Bound::Unbounded));
    }
    if start >= end {
        return None;
    }
    Some((Bound::Included(start), Bound::Excluded(end)))
}

/// In-memory, multi-version key-value ledger.
///
/// Committed entries live in a `BTreeMap` behind a `RwLock`, each tagged with
/// the commit sequence that last wrote it. Work happens in [`TxContext`]s
/// opened with [`begin`](Self::begin); see the crate docs for the commit
/// rules.
pub struct InMemoryLedger {
    pub(crate) state: RwLock<LedgerState>,
    open_iterators: Arc<AtomicUsize>,
    next_tx: AtomicU64,
}

impl InMemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::from_state(LedgerState::default())
    }

    pub(crate) fn from_state(state: LedgerState) -> Self {
        Self {
            state: RwLock::new(state),
            open_iterators: Arc::new(AtomicUsize::new(0)),
            next_tx: AtomicU64::new(1),
        }
    }

    /// Open a transaction context against the current committed state.
    pub fn begin(&self) -> TxContext<'_> {
        let tx_id = self.next_tx.fetch_add(1, Ordering::Relaxed);
        TxContext {
            ledger: self,
            tx_id,
            reads: RefCell::new(BTreeMap::new()),
            range_reads: RefCell::new(Vec::new()),
            writes: BTreeMap::new(),
        }
    }

    /// Read a committed value outside of any transaction.
    pub fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.read_state()?.entries.get(key).map(|e| e.value.clone()))
    }

    /// Commit sequence that last wrote `key`.
    pub fn version(&self, key: &str) -> StoreResult<Option<u64>> {
        Ok(self.read_state()?.entries.get(key).map(|e| e.version))
    }

    /// Sequence number of the latest commit (0 for a fresh ledger).
    pub fn commit_seq(&self) -> StoreResult<u64> {
        Ok(self.read_state()?.commit_seq)
    }

    /// Sorted list of all committed keys.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.read_state()?.entries.keys().cloned().collect())
    }

    /// Number of committed entries.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_state()?.entries.len())
    }

    /// Returns `true` if nothing has been committed.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Range iterators handed out and not yet dropped.
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::Acquire)
    }

    pub(crate) fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, LedgerState>> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("ledger read lock poisoned".into()))
    }

    pub(crate) fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, LedgerState>> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("ledger write lock poisoned".into()))
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (entries, commit_seq) = match self.state.read() {
            Ok(state) => (state.entries.len(), state.commit_seq),
            Err(_) => (0, 0),
        };
        f.debug_struct("InMemoryLedger")
            .field("entry_count", &entries)
            .field("commit_seq", &commit_seq)
            .field("open_iterators", &self.open_iterators())
            .finish()
    }
}

/// Outcome of a successful commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_id: u64,
    /// Commit sequence assigned to the writes. For a read-only transaction,
    /// the sequence it observed.
    pub version: u64,
    pub writes: usize,
}

#[derive(Debug)]
struct RangeRead {
    start: String,
    end: String,
    observed: Vec<(String, u64)>,
}

/// Per-invocation view of an [`InMemoryLedger`].
///
/// Reads see committed state only; the context does not read its own
/// buffered writes. Dropping a context without committing discards its
/// writes.
pub struct TxContext<'a> {
    ledger: &'a InMemoryLedger,
    tx_id: u64,
    reads: RefCell<BTreeMap<String, Option<u64>>>,
    range_reads: RefCell<Vec<RangeRead>>,
    writes: BTreeMap<String, Vec<u8>>,
}

impl<'a> TxContext<'a> {
    pub fn tx_id(&self) -> u64 {
        self.tx_id
    }

    /// Number of buffered writes.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Validate the read set against the committed state and apply the
    /// buffered writes atomically.
    pub fn commit(self) -> StoreResult<TxReceipt> {
        let mut state = self.ledger.write_state()?;

        if self.writes.is_empty() {
            return Ok(TxReceipt {
                tx_id: self.tx_id,
                version: state.commit_seq,
                writes: 0,
            });
        }

        for (key, read) in self.reads.borrow().iter() {
            let current = state.entries.get(key).map(|e| e.version);
            if current != *read {
                warn!(tx_id = self.tx_id, key = %key, ?read, ?current, "write conflict");
                return Err(StoreError::WriteConflict {
                    key: key.clone(),
                    read: *read,
                    current,
                });
            }
        }

        for range in self.range_reads.borrow().iter() {
            let unchanged = state
                .range(&range.start, &range.end)
                .map(|(k, e)| (k.as_str(), e.version))
                .eq(range.observed.iter().map(|(k, v)| (k.as_str(), *v)));
            if !unchanged {
                warn!(tx_id = self.tx_id, start = %range.start, end = %range.end, "phantom read");
                return Err(StoreError::PhantomRead {
                    start: range.start.clone(),
                    end: range.end.clone(),
                });
            }
        }

        let version = state.commit_seq + 1;
        let writes = self.writes.len();
        for (key, value) in self.writes {
            state.entries.insert(key, VersionedValue { value, version });
        }
        state.commit_seq = version;
        debug!(tx_id = self.tx_id, version, writes, "transaction committed");

        Ok(TxReceipt {
            tx_id: self.tx_id,
            version,
            writes,
        })
    }
}

impl LedgerStore for TxContext<'_> {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let state = self.ledger.read_state()?;
        let entry = state.entries.get(key);
        self.reads
            .borrow_mut()
            .entry(key.to_string())
            .or_insert_with(|| entry.map(|e| e.version));
        Ok(entry.map(|e| e.value.clone()))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        self.writes.insert(key.to_string(), value);
        Ok(())
    }

    fn state_by_range(&self, start_key: &str, end_key: &str) -> StoreResult<StateIterator<'_>> {
        let state = self.ledger.read_state()?;
        let mut observed = Vec::new();
        let mut entries = Vec::new();
        for (key, entry) in state.range(start_key, end_key) {
            observed.push((key.clone(), entry.version));
            entries.push(KeyValue::new(key.clone(), entry.value.clone()));
        }
        self.range_reads.borrow_mut().push(RangeRead {
            start: start_key.to_string(),
            end: end_key.to_string(),
            observed,
        });

        Ok(Box::new(MemoryRangeIter {
            entries: entries.into_iter(),
            _lease: IteratorLease::acquire(&self.ledger.open_iterators),
        }))
    }
}

/// Counts a live range iterator against its ledger until dropped.
struct IteratorLease(Arc<AtomicUsize>);

impl IteratorLease {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(counter))
    }
}

impl Drop for IteratorLease {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

struct MemoryRangeIter {
    entries: std::vec::IntoIter<KeyValue>,
    _lease: IteratorLease,
}

impl Iterator for MemoryRangeIter {
    type Item = StoreResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(Ok)
    }
}
