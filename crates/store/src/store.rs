//! Append-only session log writer
//!
//! Each session gets its own `<session_id>.jsonl` file under the store
//! directory, one serialized `FlowRecord` per line in append order. The
//! writer never rewrites or truncates an existing file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use greyledger_core::SessionId;
use greyledger_ledger::FlowRecord;

use crate::error::StoreError;

const LOG_EXTENSION: &str = "jsonl";

/// Durable append-only writer for session logs
#[derive(Debug, Clone)]
pub struct SessionLogStore {
    dir: PathBuf,
}

impl SessionLogStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Path of the log file backing one session
    pub fn session_file(&self, session_id: &SessionId) -> PathBuf {
        self.dir
            .join(format!("{}.{}", session_id.as_str(), LOG_EXTENSION))
    }

    /// Append one record to its session's log file.
    ///
    /// The line is serialized before the file is opened, so a
    /// serialization failure never leaves a partial line behind.
    pub fn append(&self, record: &FlowRecord) -> Result<(), StoreError> {
        let line = serde_json::to_string(record)?;
        let path = self.session_file(&record.session_id);

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;

        debug!(
            session_id = %record.session_id,
            sequence = record.sequence,
            "record appended to session log"
        );
        Ok(())
    }

    /// Session ids with a log file in the store, sorted.
    pub fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError> {
        let mut sessions = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                sessions.push(SessionId::from(stem));
            }
        }
        sessions.sort();
        Ok(sessions)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
