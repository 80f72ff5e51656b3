//! JSON snapshots of committed ledger state.
//!
//! A snapshot holds every committed entry with its version and the latest
//! commit sequence, so a restored ledger keeps detecting conflicts against
//! the same versions. Values are hex-encoded.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::memory::{InMemoryLedger, LedgerState, VersionedValue};

pub const SNAPSHOT_FORMAT: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct LedgerSnapshot {
    format: u32,
    commit_seq: u64,
    entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    key: String,
    version: u64,
    value: String,
}

impl InMemoryLedger {
    /// Write all committed state to `path`.
    ///
    /// The snapshot is written to a temporary file in the same directory and
    /// renamed over `path`, so readers never observe a partial file.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let snapshot = {
            let state = self.read_state()?;
            LedgerSnapshot {
                format: SNAPSHOT_FORMAT,
                commit_seq: state.commit_seq,
                entries: state
                    .entries
                    .iter()
                    .map(|(key, entry)| SnapshotEntry {
                        key: key.clone(),
                        version: entry.version,
                        value: hex::encode(&entry.value),
                    })
                    .collect(),
            }
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| StoreError::Io(e.error))?;

        debug!(
            path = %path.display(),
            entries = snapshot.entries.len(),
            commit_seq = snapshot.commit_seq,
            "ledger snapshot saved"
        );
        Ok(())
    }

    /// Restore a ledger from `path`. A missing file yields an empty ledger.
    pub fn load_snapshot(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot found, starting empty");
            return Ok(Self::new());
        }

        let bytes = std::fs::read(path)?;
        let snapshot: LedgerSnapshot = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::CorruptSnapshot(e.to_string()))?;
        if snapshot.format != SNAPSHOT_FORMAT {
            return Err(StoreError::CorruptSnapshot(format!(
                "unsupported snapshot format {}",
                snapshot.format
            )));
        }

        let mut entries = BTreeMap::new();
        for entry in snapshot.entries {
            if entry.version > snapshot.commit_seq {
                return Err(StoreError::CorruptSnapshot(format!(
                    "entry {} has version {} beyond commit sequence {}",
                    entry.key, entry.version, snapshot.commit_seq
                )));
            }
            let value = hex::decode(&entry.value).map_err(|e| {
                StoreError::CorruptSnapshot(format!("entry {}: {e}", entry.key))
            })?;
            entries.insert(
                entry.key,
                VersionedValue {
                    value,
                    version: entry.version,
                },
            );
        }

        info!(
            path = %path.display(),
            entries = entries.len(),
            commit_seq = snapshot.commit_seq,
            "ledger snapshot loaded"
        );
        Ok(Self::from_state(LedgerState {
            entries,
            commit_seq: snapshot.commit_seq,
        }))
    }
}
