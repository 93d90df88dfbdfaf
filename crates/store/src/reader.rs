//! Session log reader
//!
//! Reads `<session_id>.jsonl` files back into `FlowRecord` chains and
//! re-verifies their hash chains. Reading is strict: a malformed line
//! fails the whole session rather than being skipped.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use greyledger_core::SessionId;
use greyledger_ledger::{verify_chain_integrity, FlowRecord, IntegrityIssue};

use crate::error::StoreError;
use crate::store::SessionLogStore;

/// Read-side counterpart of `SessionLogStore`
#[derive(Debug, Clone)]
pub struct SessionLogReader {
    dir: PathBuf,
}

impl SessionLogReader {
    /// Open a reader over an existing store directory.
    pub fn from_directory(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn session_file(&self, session_id: &SessionId) -> PathBuf {
        self.dir.join(format!("{}.jsonl", session_id.as_str()))
    }

    /// Records of one session in file order. A missing file reads as an
    /// empty session.
    pub fn read_session(&self, session_id: &SessionId) -> Result<Vec<FlowRecord>, StoreError> {
        let path = self.session_file(session_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for line in BufReader::new(File::open(&path)?).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        debug!(session_id = %session_id, count = records.len(), "session log read");
        Ok(records)
    }

    /// All sessions in the directory, keyed by id.
    pub fn read_all(&self) -> Result<BTreeMap<SessionId, Vec<FlowRecord>>, StoreError> {
        let mut all = BTreeMap::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                let session_id = SessionId::from(stem);
                let records = self.read_session(&session_id)?;
                all.insert(session_id, records);
            }
        }
        Ok(all)
    }

    /// Re-verify one session's hash chain straight from disk.
    pub fn verify_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<IntegrityIssue>, StoreError> {
        let records = self.read_session(session_id)?;
        Ok(verify_chain_integrity(records.iter())?)
    }
}

impl From<&SessionLogStore> for SessionLogReader {
    fn from(store: &SessionLogStore) -> Self {
        Self::from_directory(store.dir())
    }
}
