//! Fault-injecting ledger double for operation tests.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use custody_store::{KeyValue, LedgerStore, StateIterator, StoreError, StoreResult};

#[derive(Default)]
pub(crate) struct FaultyStore {
    entries: BTreeMap<String, Vec<u8>>,
    fail_gets: bool,
    fail_puts: bool,
    fail_range_open: bool,
    fail_scan_after: Option<usize>,
    open_iterators: Rc<Cell<usize>>,
}

impl FaultyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_entry(mut self, key: &str, value: Vec<u8>) -> Self {
        self.entries.insert(key.to_string(), value);
        self
    }

    pub(crate) fn fail_gets(mut self) -> Self {
        self.fail_gets = true;
        self
    }

    pub(crate) fn fail_puts(mut self) -> Self {
        self.fail_puts = true;
        self
    }

    pub(crate) fn fail_range_open(mut self) -> Self {
        self.fail_range_open = true;
        self
    }

    /// Yield `n` entries, then an error.
    pub(crate) fn fail_scan_after(mut self, n: usize) -> Self {
        self.fail_scan_after = Some(n);
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn open_iterators(&self) -> usize {
        self.open_iterators.get()
    }
}

impl LedgerStore for FaultyStore {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if self.fail_gets {
            return Err(StoreError::Unavailable(format!("injected get failure for {key}")));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        if self.fail_puts {
            return Err(StoreError::Unavailable(format!("injected put failure for {key}")));
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn state_by_range(&self, start_key: &str, end_key: &str) -> StoreResult<StateIterator<'_>> {
        if self.fail_range_open {
            return Err(StoreError::Unavailable("injected range failure".into()));
        }
        let entries: Vec<KeyValue> = self
            .entries
            .iter()
            .filter(|(k, _)| k.as_str() >= start_key && (end_key.is_empty() || k.as_str() < end_key))
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect();
        self.open_iterators.set(self.open_iterators.get() + 1);
        Ok(Box::new(FaultyIter {
            entries: entries.into_iter(),
            fail_after: self.fail_scan_after,
            yielded: 0,
            open: Rc::clone(&self.open_iterators),
        }))
    }
}

struct FaultyIter {
    entries: std::vec::IntoIter<KeyValue>,
    fail_after: Option<usize>,
    yielded: usize,
    open: Rc<Cell<usize>>,
}

impl Iterator for FaultyIter {
    type Item = StoreResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fail_after == Some(self.yielded) {
            self.fail_after = None;
            return Some(Err(StoreError::Unavailable("injected scan failure".into())));
        }
        let next = self.entries.next()?;
        self.yielded += 1;
        Some(Ok(next))
    }
}

impl Drop for FaultyIter {
    fn drop(&mut self) {
        self.open.set(self.open.get() - 1);
    }
}
