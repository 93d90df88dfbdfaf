//! Ledger errors
//!
//! Every variant carries a stable machine-readable code through
//! [`LedgerError::code`]; callers branch on the code, never on the
//! message text. Nothing in this crate panics on expected misuse.

use greyledger_core::{AmountError, ChecksumError, FlowDirection, FlowId, FlowStatus, FlowType, PartyType, SessionId};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors that can occur in ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Required field missing or empty: {field}")]
    MissingField { field: &'static str },

    #[error("Amount cannot be negative: {amount}")]
    NegativeAmount { amount: i64 },

    #[error("Amount must be an integer: {value}")]
    NonIntegerAmount { value: String },

    #[error("Timestamp must be a positive integer: {timestamp}")]
    InvalidTimestamp { timestamp: i64 },

    #[error("Description contains forbidden term '{term}'")]
    ForbiddenDescription { term: String },

    #[error("{flow_type} may not target party type {party_type}")]
    InvalidPartyType {
        flow_type: FlowType,
        party_type: PartyType,
    },

    #[error("{flow_type} does not permit direction {direction}")]
    InvalidDirection {
        flow_type: FlowType,
        direction: FlowDirection,
    },

    #[error("Flow id already recorded: {flow_id}")]
    DuplicateFlowId { flow_id: FlowId },

    #[error("Session id already exists: {session_id}")]
    DuplicateSessionId { session_id: SessionId },

    #[error("Flow not found: {flow_id}")]
    FlowNotFound { flow_id: FlowId },

    #[error("Illegal status transition from {from} to {to}")]
    InvalidStatusTransition { from: FlowStatus, to: FlowStatus },

    #[error("Checksum computation failed: {0}")]
    Checksum(#[from] ChecksumError),
}

impl LedgerError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::MissingField { .. } => "MISSING_FIELD",
            LedgerError::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            LedgerError::NonIntegerAmount { .. } => "NON_INTEGER_AMOUNT",
            LedgerError::InvalidTimestamp { .. } => "INVALID_TIMESTAMP",
            LedgerError::ForbiddenDescription { .. } => "FORBIDDEN_DESCRIPTION",
            LedgerError::InvalidPartyType { .. } => "INVALID_PARTY_TYPE",
            LedgerError::InvalidDirection { .. } => "INVALID_DIRECTION",
            LedgerError::DuplicateFlowId { .. } => "DUPLICATE_FLOW_ID",
            LedgerError::DuplicateSessionId { .. } => "DUPLICATE_SESSION_ID",
            LedgerError::FlowNotFound { .. } => "FLOW_NOT_FOUND",
            LedgerError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            LedgerError::Checksum(..) => "CHECKSUM_FAILED",
        }
    }

    /// Offending values as a JSON map, for structured consumers
    pub fn details(&self) -> Value {
        match self {
            LedgerError::MissingField { field } => json!({ "field": field }),
            LedgerError::NegativeAmount { amount } => json!({ "amount": amount }),
            LedgerError::NonIntegerAmount { value } => json!({ "value": value }),
            LedgerError::InvalidTimestamp { timestamp } => json!({ "timestamp": timestamp }),
            LedgerError::ForbiddenDescription { term } => json!({ "term": term }),
            LedgerError::InvalidPartyType {
                flow_type,
                party_type,
            } => json!({ "flow_type": flow_type, "party_type": party_type }),
            LedgerError::InvalidDirection {
                flow_type,
                direction,
            } => json!({ "flow_type": flow_type, "direction": direction }),
            LedgerError::DuplicateFlowId { flow_id } => json!({ "flow_id": flow_id }),
            LedgerError::DuplicateSessionId { session_id } => {
                json!({ "session_id": session_id })
            }
            LedgerError::FlowNotFound { flow_id } => json!({ "flow_id": flow_id }),
            LedgerError::InvalidStatusTransition { from, to } => {
                json!({ "from": from, "to": to })
            }
            LedgerError::Checksum(err) => json!({ "reason": err.to_string() }),
        }
    }
}

impl From<AmountError> for LedgerError {
    fn from(err: AmountError) -> Self {
        match err {
            AmountError::NegativeAmount(amount) => LedgerError::NegativeAmount { amount },
            AmountError::NonIntegerAmount(value) => LedgerError::NonIntegerAmount { value },
        }
    }
}
