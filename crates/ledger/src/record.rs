//! Flow records - the atomic, immutable unit of the ledger
//!
//! A record is never mutated after construction. A status change is a new
//! record chained to its predecessor: fresh sequence, `previous_hash`
//! equal to the predecessor's checksum, freshly computed checksum.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use greyledger_core::{
    checksum, Amount, ChecksumError, FlowDirection, FlowId, FlowStatus, FlowType, PartyRef,
    SessionId,
};

use crate::error::LedgerError;
use crate::validation::{validate_flow_input, ValidationConfig};

/// Caller-supplied fields for a new flow reference.
///
/// The registry derives everything else (sequence, previous hash,
/// checksum, status). Metadata keys are a `BTreeMap` so canonical
/// serialization is order-stable by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowInput {
    pub flow_id: FlowId,
    pub session_id: SessionId,
    pub party: PartyRef,
    pub flow_type: FlowType,
    pub amount: i64,
    pub direction: FlowDirection,
    pub injected_timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_ledger_entry_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

/// One immutable, hash-chained flow record.
///
/// `checksum` covers every other field; `previous_hash` is the checksum
/// of the prior record in the same session, or [`checksum::GENESIS_HASH`]
/// for the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub flow_id: FlowId,
    pub session_id: SessionId,
    pub sequence: u64,
    pub party: PartyRef,
    pub flow_type: FlowType,
    pub amount: Amount,
    pub direction: FlowDirection,
    pub status: FlowStatus,
    pub injected_timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_ledger_entry_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
    pub previous_hash: String,
    pub checksum: String,
}

impl FlowRecord {
    /// Recompute the checksum over every field except `checksum` itself.
    ///
    /// The record is canonically serialized (sorted keys, stable array
    /// order) and hashed with the deterministic integer hash.
    pub fn compute_checksum(&self) -> Result<String, ChecksumError> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(ref mut map) = value {
            map.remove("checksum");
        }
        Ok(format!(
            "{:016x}",
            checksum::fnv1a64(&checksum::canonical_json(&value))
        ))
    }

    /// Check the stored checksum against a fresh recomputation
    pub fn verify_checksum(&self) -> Result<bool, ChecksumError> {
        Ok(self.compute_checksum()? == self.checksum)
    }
}

/// Construct a validated, checksummed flow record.
///
/// Validation runs in a fixed order (see [`validate_flow_input`]); on any
/// failure a typed error names the rule and the offending value. New
/// records always start `PENDING`.
pub fn create_flow_record(
    input: &FlowInput,
    sequence: u64,
    previous_hash: &str,
    config: &ValidationConfig,
) -> Result<FlowRecord, LedgerError> {
    validate_flow_input(input, config)?;

    let mut record = FlowRecord {
        flow_id: input.flow_id.clone(),
        session_id: input.session_id.clone(),
        sequence,
        party: input.party.clone(),
        flow_type: input.flow_type,
        amount: Amount::new(input.amount)?,
        direction: input.direction,
        status: FlowStatus::Pending,
        injected_timestamp: input.injected_timestamp,
        linked_ledger_entry_id: input.linked_ledger_entry_id.clone(),
        description: input.description.clone(),
        metadata: input.metadata.clone(),
        previous_hash: previous_hash.to_string(),
        checksum: String::new(),
    };
    record.checksum = record.compute_checksum()?;
    Ok(record)
}

/// Produce the successor record for a status transition.
///
/// Only `PENDING -> CONFIRMED` and `PENDING -> VOID` are legal. The
/// original record is untouched; the successor shares all business
/// fields but carries the new status, sequence, previous hash and a
/// fresh checksum.
pub fn transition_flow_status(
    record: &FlowRecord,
    new_status: FlowStatus,
    new_sequence: u64,
    previous_hash: &str,
) -> Result<FlowRecord, LedgerError> {
    if !record.status.can_transition_to(new_status) {
        return Err(LedgerError::InvalidStatusTransition {
            from: record.status,
            to: new_status,
        });
    }

    let mut successor = FlowRecord {
        sequence: new_sequence,
        status: new_status,
        previous_hash: previous_hash.to_string(),
        checksum: String::new(),
        ..record.clone()
    };
    successor.checksum = successor.compute_checksum()?;
    Ok(successor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use greyledger_core::{PartyType, GENESIS_HASH};

    fn input(flow_id: &str) -> FlowInput {
        FlowInput {
            flow_id: flow_id.into(),
            session_id: "SESSION-001".into(),
            party: PartyRef::new("CLUB-001", PartyType::Club),
            flow_type: FlowType::RakeRef,
            amount: 500,
            direction: FlowDirection::In,
            injected_timestamp: 1_700_000_000_000,
            linked_ledger_entry_id: Some("LEDGER-REF-42".to_string()),
            description: Some("Rake reference".to_string()),
            metadata: None,
        }
    }

    #[test]
    fn test_create_starts_pending() {
        let record =
            create_flow_record(&input("F-1"), 0, GENESIS_HASH, &ValidationConfig::default())
                .unwrap();
        assert_eq!(record.status, FlowStatus::Pending);
        assert_eq!(record.sequence, 0);
        assert_eq!(record.previous_hash, GENESIS_HASH);
        assert!(record.verify_checksum().unwrap());
    }

    #[test]
    fn test_create_is_deterministic() {
        let config = ValidationConfig::default();
        let a = create_flow_record(&input("F-1"), 0, GENESIS_HASH, &config).unwrap();
        let b = create_flow_record(&input("F-1"), 0, GENESIS_HASH, &config).unwrap();
        assert_eq!(a.checksum, b.checksum);
        assert_eq!(a, b);
    }

    #[test]
    fn test_checksum_covers_every_field() {
        let config = ValidationConfig::default();
        let base = create_flow_record(&input("F-1"), 0, GENESIS_HASH, &config).unwrap();

        let mut other = input("F-1");
        other.amount = 501;
        let changed = create_flow_record(&other, 0, GENESIS_HASH, &config).unwrap();
        assert_ne!(base.checksum, changed.checksum);

        let mut other = input("F-1");
        other.description = Some("Different text".to_string());
        let changed = create_flow_record(&other, 0, GENESIS_HASH, &config).unwrap();
        assert_ne!(base.checksum, changed.checksum);
    }

    #[test]
    fn test_metadata_order_does_not_change_checksum() {
        let config = ValidationConfig::default();

        let mut meta_a = BTreeMap::new();
        meta_a.insert("table".to_string(), serde_json::json!("T-9"));
        meta_a.insert("hand".to_string(), serde_json::json!(17));

        let mut meta_b = BTreeMap::new();
        meta_b.insert("hand".to_string(), serde_json::json!(17));
        meta_b.insert("table".to_string(), serde_json::json!("T-9"));

        let mut a = input("F-1");
        a.metadata = Some(meta_a);
        let mut b = input("F-1");
        b.metadata = Some(meta_b);

        let ra = create_flow_record(&a, 0, GENESIS_HASH, &config).unwrap();
        let rb = create_flow_record(&b, 0, GENESIS_HASH, &config).unwrap();
        assert_eq!(ra.checksum, rb.checksum);
    }

    #[test]
    fn test_transition_chains_to_predecessor() {
        let config = ValidationConfig::default();
        let pending = create_flow_record(&input("F-1"), 0, GENESIS_HASH, &config).unwrap();

        let confirmed =
            transition_flow_status(&pending, FlowStatus::Confirmed, 1, &pending.checksum)
                .unwrap();

        assert_eq!(confirmed.status, FlowStatus::Confirmed);
        assert_eq!(confirmed.sequence, 1);
        assert_eq!(confirmed.previous_hash, pending.checksum);
        assert_eq!(confirmed.flow_id, pending.flow_id);
        assert_eq!(confirmed.amount, pending.amount);
        assert!(confirmed.verify_checksum().unwrap());
        // The predecessor is untouched
        assert_eq!(pending.status, FlowStatus::Pending);
    }

    #[test]
    fn test_transition_from_terminal_rejected() {
        let config = ValidationConfig::default();
        let pending = create_flow_record(&input("F-1"), 0, GENESIS_HASH, &config).unwrap();
        let voided =
            transition_flow_status(&pending, FlowStatus::Void, 1, &pending.checksum).unwrap();

        let err = transition_flow_status(&voided, FlowStatus::Confirmed, 2, &voided.checksum)
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATUS_TRANSITION");
    }

    #[test]
    fn test_transition_to_pending_rejected() {
        let config = ValidationConfig::default();
        let pending = create_flow_record(&input("F-1"), 0, GENESIS_HASH, &config).unwrap();
        let err = transition_flow_status(&pending, FlowStatus::Pending, 1, &pending.checksum)
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATUS_TRANSITION");
    }

    #[test]
    fn test_tampered_record_fails_verification() {
        let config = ValidationConfig::default();
        let mut record = create_flow_record(&input("F-1"), 0, GENESIS_HASH, &config).unwrap();
        record.amount = Amount::new(9999).unwrap();
        assert!(!record.verify_checksum().unwrap());
    }

    #[test]
    fn test_serde_roundtrip_preserves_checksum() {
        let config = ValidationConfig::default();
        let record = create_flow_record(&input("F-1"), 0, GENESIS_HASH, &config).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: FlowRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
        assert!(parsed.verify_checksum().unwrap());
    }
}
