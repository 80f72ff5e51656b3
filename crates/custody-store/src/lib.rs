//! Transactional key-value ledger for the custody registry.
//!
//! Registry operations never touch a storage engine directly. They see the
//! ledger through [`LedgerStore`], a narrow capability with three calls:
//! point get, point put, and an ordered range scan whose iterator releases
//! itself when dropped.
//!
//! # Storage Backends
//!
//! - [`InMemoryLedger`] -- `BTreeMap`-based multi-version ledger for tests,
//!   the CLI, and the HTTP gateway, with JSON snapshot persistence
//!
//! # Design Rules
//!
//! 1. Every invocation runs inside a [`TxContext`]: reads see committed state,
//!    writes are buffered until [`TxContext::commit`].
//! 2. Commit re-validates the version of every key read and the key set of
//!    every range scanned. A transaction that raced another writer is
//!    rejected whole with [`StoreError::WriteConflict`] or
//!    [`StoreError::PhantomRead`].
//! 3. Range scans are half-open `[start, end)`; an empty end key is unbounded.
//! 4. The ledger never interprets values -- it is a pure key-value store.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryLedger, TxContext, TxReceipt};
pub use traits::{KeyValue, LedgerStore, StateIterator};
