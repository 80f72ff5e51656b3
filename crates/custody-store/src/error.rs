/// Errors from ledger store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A key read by the transaction was changed by a later commit.
    #[error("write conflict on key {key}: read version {read:?}, committed version {current:?}")]
    WriteConflict {
        key: String,
        read: Option<u64>,
        current: Option<u64>,
    },

    /// A range scanned by the transaction gained, lost, or changed entries.
    #[error("phantom read in range [{start}, {end})")]
    PhantomRead { start: String, end: String },

    /// Keys must be non-empty.
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted snapshot could not be decoded.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// The backend cannot serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns `true` for optimistic-concurrency rejections; retrying the
    /// whole invocation may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::WriteConflict { .. } | Self::PhantomRead { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
