//! Session chain state
//!
//! A session groups flow records into one hash chain. It tracks the next
//! sequence number and the running checksum that becomes the next
//! record's `previous_hash`. Sessions are created implicitly on first
//! append or explicitly with a validated timestamp, and never deleted.

use greyledger_core::{SessionId, GENESIS_HASH};

/// Per-session chain state inside the registry.
///
/// `slots` indexes into the registry's flat log, so session record lists
/// are views over the arena rather than copies.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) session_id: SessionId,
    pub(crate) created_at: i64,
    pub(crate) slots: Vec<usize>,
    pub(crate) next_sequence: u64,
    pub(crate) last_checksum: String,
}

impl Session {
    pub(crate) fn new(session_id: SessionId, created_at: i64) -> Self {
        Self {
            session_id,
            created_at,
            slots: Vec::new(),
            next_sequence: 0,
            last_checksum: GENESIS_HASH.to_string(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Caller-supplied creation timestamp (positive integer)
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Number of records appended to this session's chain
    pub fn record_count(&self) -> usize {
        self.slots.len()
    }

    /// Sequence of the most recent record, if any
    pub fn last_sequence(&self) -> Option<u64> {
        self.next_sequence.checked_sub(1)
    }

    /// Checksum of the most recent record, or the genesis constant
    pub fn last_checksum(&self) -> &str {
        &self.last_checksum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_at_genesis() {
        let session = Session::new(SessionId::new("S-1"), 1_700_000_000_000);
        assert_eq!(session.record_count(), 0);
        assert_eq!(session.last_sequence(), None);
        assert_eq!(session.last_checksum(), GENESIS_HASH);
        assert_eq!(session.created_at(), 1_700_000_000_000);
    }
}
