//! Append-only flow registry
//!
//! The registry owns every session and flow record. All storage is an
//! arena: one flat append log, a `flow_id -> slots` history index for
//! O(1) duplicate detection, and per-session slot lists viewing the same
//! arena. No operation removes or edits an entry; a status change is a
//! new ledger entry chained to its predecessor.
//!
//! In a multi-threaded host, wrap the registry in a single lock held for
//! the whole duration of each mutating call; reads never observe a
//! partially updated session because every mutation updates session
//! state, index, log and counter before returning.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use greyledger_core::{FlowId, FlowStatus, FlowType, PartyId, SessionId};

use crate::error::LedgerError;
use crate::integrity::{verify_chain_integrity, IntegrityIssue};
use crate::record::{create_flow_record, transition_flow_status, FlowInput, FlowRecord};
use crate::session::Session;
use crate::validation::ValidationConfig;

/// Result of a successful append or transition
#[derive(Debug, Clone)]
pub struct AppendReceipt {
    /// The freshly appended record
    pub record: FlowRecord,
    /// Sequence within the record's session
    pub session_sequence: u64,
    /// Position in the global append order
    pub global_sequence: u64,
}

/// Append-only store of sessions and flow records
#[derive(Debug, Default)]
pub struct FlowRegistry {
    config: ValidationConfig,
    /// Flat append log; slot index == global sequence
    log: Vec<FlowRecord>,
    /// Full history per flow id; the last slot is the current record
    flow_index: HashMap<FlowId, Vec<usize>>,
    /// Sessions keyed by id, ordered for deterministic walks
    sessions: BTreeMap<SessionId, Session>,
    global_sequence: u64,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a custom validation configuration
    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Explicitly create a session.
    ///
    /// Rejects a duplicate session id or a non-positive timestamp.
    pub fn create_session(
        &mut self,
        session_id: SessionId,
        timestamp: i64,
    ) -> Result<&Session, LedgerError> {
        if self.sessions.contains_key(&session_id) {
            return Err(LedgerError::DuplicateSessionId { session_id });
        }
        if timestamp <= 0 {
            return Err(LedgerError::InvalidTimestamp { timestamp });
        }

        debug!(session_id = %session_id, timestamp, "session created");
        let session = Session::new(session_id.clone(), timestamp);
        Ok(self.sessions.entry(session_id).or_insert(session))
    }

    /// Append a new flow reference.
    ///
    /// The flow id is the idempotency key: a second append with an
    /// already-indexed id is rejected with `DUPLICATE_FLOW_ID` and leaves
    /// the registry untouched. The session is created implicitly if
    /// needed, using the flow's injected timestamp.
    pub fn append_flow(&mut self, input: FlowInput) -> Result<AppendReceipt, LedgerError> {
        if self.flow_index.contains_key(&input.flow_id) {
            return Err(LedgerError::DuplicateFlowId {
                flow_id: input.flow_id,
            });
        }

        // Derive chain position without touching state, so a validation
        // failure leaves nothing half-updated.
        let (sequence, previous_hash) = match self.sessions.get(&input.session_id) {
            Some(session) => (session.next_sequence, session.last_checksum.clone()),
            None => (0, greyledger_core::GENESIS_HASH.to_string()),
        };

        let record = create_flow_record(&input, sequence, &previous_hash, &self.config)?;

        let session = self
            .sessions
            .entry(input.session_id.clone())
            .or_insert_with(|| {
                Session::new(input.session_id.clone(), input.injected_timestamp)
            });

        let receipt = Self::commit(
            &mut self.log,
            &mut self.flow_index,
            &mut self.global_sequence,
            session,
            record,
        );
        debug!(
            flow_id = %receipt.record.flow_id,
            session_id = %receipt.record.session_id,
            sequence = receipt.session_sequence,
            "flow appended"
        );
        Ok(receipt)
    }

    /// Confirm a pending flow. Appends a `CONFIRMED` successor record.
    pub fn confirm_flow(&mut self, flow_id: &FlowId) -> Result<AppendReceipt, LedgerError> {
        self.transition(flow_id, FlowStatus::Confirmed)
    }

    /// Void a pending flow. Appends a `VOID` successor record.
    pub fn void_flow(&mut self, flow_id: &FlowId) -> Result<AppendReceipt, LedgerError> {
        self.transition(flow_id, FlowStatus::Void)
    }

    fn transition(
        &mut self,
        flow_id: &FlowId,
        target: FlowStatus,
    ) -> Result<AppendReceipt, LedgerError> {
        let current = match self.flow_index.get(flow_id).and_then(|slots| slots.last()) {
            Some(&slot) => &self.log[slot],
            None => {
                return Err(LedgerError::FlowNotFound {
                    flow_id: flow_id.clone(),
                })
            }
        };

        // The session exists for every indexed flow.
        let session = self
            .sessions
            .get_mut(&current.session_id)
            .ok_or_else(|| LedgerError::FlowNotFound {
                flow_id: flow_id.clone(),
            })?;

        let successor = transition_flow_status(
            current,
            target,
            session.next_sequence,
            &session.last_checksum,
        )?;

        let receipt = Self::commit(
            &mut self.log,
            &mut self.flow_index,
            &mut self.global_sequence,
            session,
            successor,
        );
        debug!(
            flow_id = %receipt.record.flow_id,
            status = %target,
            sequence = receipt.session_sequence,
            "flow status transitioned"
        );
        Ok(receipt)
    }

    /// Update all four internal structures as one logical step.
    fn commit(
        log: &mut Vec<FlowRecord>,
        flow_index: &mut HashMap<FlowId, Vec<usize>>,
        global_sequence: &mut u64,
        session: &mut Session,
        record: FlowRecord,
    ) -> AppendReceipt {
        let slot = log.len();
        let session_sequence = record.sequence;
        let global = *global_sequence;

        session.slots.push(slot);
        session.next_sequence = record.sequence + 1;
        session.last_checksum = record.checksum.clone();
        flow_index
            .entry(record.flow_id.clone())
            .or_default()
            .push(slot);
        log.push(record);
        *global_sequence += 1;

        AppendReceipt {
            record: log[slot].clone(),
            session_sequence,
            global_sequence: global,
        }
    }

    // === Read operations (pure lookups, no side effects) ===

    /// Current (highest-sequence) record for a flow id
    pub fn get_flow(&self, flow_id: &FlowId) -> Option<&FlowRecord> {
        self.flow_index
            .get(flow_id)
            .and_then(|slots| slots.last())
            .map(|&slot| &self.log[slot])
    }

    /// Full history of a flow id, ordered by sequence
    pub fn get_flow_history(&self, flow_id: &FlowId) -> Vec<&FlowRecord> {
        self.flow_index
            .get(flow_id)
            .map(|slots| slots.iter().map(|&slot| &self.log[slot]).collect())
            .unwrap_or_default()
    }

    pub fn has_flow(&self, flow_id: &FlowId) -> bool {
        self.flow_index.contains_key(flow_id)
    }

    pub fn get_session(&self, session_id: &SessionId) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    /// All records of one session, in chain order
    pub fn session_records(&self, session_id: &SessionId) -> Option<Vec<&FlowRecord>> {
        self.sessions
            .get(session_id)
            .map(|session| session.slots.iter().map(|&slot| &self.log[slot]).collect())
    }

    /// The flat append log, in global append order
    pub fn all_records(&self) -> &[FlowRecord] {
        &self.log
    }

    pub fn records_by_party(&self, party_id: &PartyId) -> Vec<&FlowRecord> {
        self.log
            .iter()
            .filter(|r| &r.party.party_id == party_id)
            .collect()
    }

    pub fn records_by_type(&self, flow_type: FlowType) -> Vec<&FlowRecord> {
        self.log.iter().filter(|r| r.flow_type == flow_type).collect()
    }

    pub fn records_by_status(&self, status: FlowStatus) -> Vec<&FlowRecord> {
        self.log.iter().filter(|r| r.status == status).collect()
    }

    /// Total number of records across all sessions; never decreases
    pub fn record_count(&self) -> usize {
        self.log.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Recompute every checksum and chain link, collecting all
    /// discrepancies instead of failing at the first.
    pub fn verify_integrity(&self) -> Result<Vec<IntegrityIssue>, LedgerError> {
        let mut issues = Vec::new();
        for session in self.sessions.values() {
            let records = session.slots.iter().map(|&slot| &self.log[slot]);
            issues.extend(verify_chain_integrity(records)?);
        }
        Ok(issues)
    }
}
