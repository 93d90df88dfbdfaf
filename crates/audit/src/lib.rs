//! GreyLedger Audit - deterministic reconciliation engine
//!
//! The engine correlates three read-only snapshots - grey flows, recharge
//! records with their flow links, and an attribution snapshot - into one
//! checksummed verdict per flow plus orphan lists. It never mutates any
//! input, never reads a clock, and identical inputs always produce
//! byte-identical checksums; `verify_audit_reproducibility` treats any
//! drift as a defect.
//!
//! # Key Types
//! - `AuditFlowData` / `AuditRechargeData` / `AuditAttributionData`: indexed snapshots
//! - `run_audit`: the pure correlation function
//! - `AuditOutput`: summary + rows + orphan lists, owned by the caller

pub mod adapters;
pub mod engine;
pub mod error;
pub mod types;
pub mod views;

pub use adapters::{
    AttributionEntry, AttributionSnapshot, AuditAttributionData, AuditFlowData,
    AuditRechargeData, RechargeLink, RechargeRecord, RechargeStatus,
};
pub use engine::{run_audit, verify_audit_reproducibility, AuditSessionDescriptor};
pub use error::AuditError;
pub use types::{AuditFlag, AuditOutput, AuditRow, AuditStatus, AuditSummary};
pub use views::{
    correlation_trace, exception_list, flag_breakdown, party_match_rates, pass_rate_by_period,
    status_breakdown, AuditException, CorrelationTrace, ExceptionSource, FlagBreakdown,
    PartyMatchRate, PeriodPassRate, Severity, StatusBreakdown,
};
