//! Chain and checksum verification
//!
//! Verification reports every discrepancy found instead of failing fast;
//! a single pass over a damaged log should surface all problems at once.

use greyledger_core::{ChecksumError, SessionId, GENESIS_HASH};
use serde::Serialize;

use crate::record::FlowRecord;

/// One detected discrepancy in a session chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrityIssue {
    pub session_id: SessionId,
    pub sequence: u64,
    pub kind: IntegrityIssueKind,
}

/// What exactly did not line up
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrityIssueKind {
    /// Stored checksum differs from a fresh recomputation
    ChecksumMismatch { expected: String, actual: String },
    /// `previous_hash` does not match the prior record's checksum
    BrokenLink { expected: String, actual: String },
    /// Session-local sequence is not contiguous from 0
    SequenceGap { expected: u64, actual: u64 },
}

/// Recompute one record's checksum and compare against the stored one
pub fn verify_flow_record_checksum(record: &FlowRecord) -> Result<bool, ChecksumError> {
    record.verify_checksum()
}

/// Walk one session's records in order and collect every discrepancy.
///
/// Expects the records of a single session, ordered by sequence. The
/// first record must link to the genesis constant; each later record
/// must link to its predecessor's checksum and continue the sequence.
pub fn verify_chain_integrity<'a, I>(records: I) -> Result<Vec<IntegrityIssue>, ChecksumError>
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    let mut issues = Vec::new();
    let mut expected_prev = GENESIS_HASH.to_string();
    let mut expected_sequence: u64 = 0;

    for record in records {
        if record.sequence != expected_sequence {
            issues.push(IntegrityIssue {
                session_id: record.session_id.clone(),
                sequence: record.sequence,
                kind: IntegrityIssueKind::SequenceGap {
                    expected: expected_sequence,
                    actual: record.sequence,
                },
            });
        }

        if record.previous_hash != expected_prev {
            issues.push(IntegrityIssue {
                session_id: record.session_id.clone(),
                sequence: record.sequence,
                kind: IntegrityIssueKind::BrokenLink {
                    expected: expected_prev.clone(),
                    actual: record.previous_hash.clone(),
                },
            });
        }

        let recomputed = record.compute_checksum()?;
        if recomputed != record.checksum {
            issues.push(IntegrityIssue {
                session_id: record.session_id.clone(),
                sequence: record.sequence,
                kind: IntegrityIssueKind::ChecksumMismatch {
                    expected: recomputed,
                    actual: record.checksum.clone(),
                },
            });
        }

        expected_prev = record.checksum.clone();
        expected_sequence = record.sequence + 1;
    }

    Ok(issues)
}
