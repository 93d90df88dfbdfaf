//! Audit output types
//!
//! Rows and summaries are produced once per run and never mutated. Both
//! carry checksums computed over canonical serializations so two runs on
//! the same inputs can be compared byte for byte.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use greyledger_core::{checksum, ChecksumError, FlowId, PartyRef, PeriodId, RechargeId, SessionId};

/// Reconciliation verdict for one flow
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    /// Recharge and attribution both present, no flags raised
    Matched,
    /// Exactly one side present
    Partial,
    /// Confirmed flow without attribution - always an audit failure
    Missing,
    /// Neither side present
    Orphan,
}

/// Named conditions raised during correlation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditFlag {
    FlowNoRecharge,
    RechargeNotConfirmed,
    FlowNotConfirmed,
    FlowNoAttribution,
    /// Informational: several attribution entries for one flow
    MultipleAttributions,
    /// Recharge unreachable from the audited flow set
    RechargeNoFlow,
    /// Attribution entry whose flow is absent from the audited set
    AttributionNoFlow,
}

/// One flow's reconciliation verdict for a given audit run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRow {
    /// Derived from session id + sequence
    pub row_id: String,
    pub session_id: SessionId,
    pub sequence: u64,
    pub grey_flow_id: FlowId,
    /// First linked recharge, if any
    pub recharge_id: Option<RechargeId>,
    /// Parties attributed to the flow, frozen at audit time
    pub attribution_breakdown: Vec<PartyRef>,
    pub status: AuditStatus,
    /// Sorted by wire name for deterministic checksums
    pub flags: Vec<AuditFlag>,
    pub checksum: String,
}

#[derive(Serialize)]
struct RowChecksumPayload<'a> {
    row_id: &'a str,
    session_id: &'a SessionId,
    sequence: u64,
    flow_id: &'a FlowId,
    recharge_id: &'a Option<RechargeId>,
    status: AuditStatus,
    flags: &'a [AuditFlag],
}

impl AuditRow {
    /// Recompute this row's checksum from its identifying fields
    pub fn compute_checksum(&self) -> Result<String, ChecksumError> {
        checksum::checksum_of(&RowChecksumPayload {
            row_id: &self.row_id,
            session_id: &self.session_id,
            sequence: self.sequence,
            flow_id: &self.grey_flow_id,
            recharge_id: &self.recharge_id,
            status: self.status,
            flags: &self.flags,
        })
    }
}

/// Aggregate counters for one audit run, derived entirely from its rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub session_id: SessionId,
    pub period_id: PeriodId,
    pub audit_timestamp: i64,
    pub flow_count: usize,
    pub recharge_count: usize,
    /// Audited flows with at least one attribution entry
    pub attributed_flow_count: usize,
    pub total_rows: usize,
    /// Zero-filled over all statuses so the shape is stable across runs
    pub count_by_status: BTreeMap<String, u64>,
    /// Zero-filled over all flags
    pub count_by_flag: BTreeMap<String, u64>,
    /// True iff no MISSING/ORPHAN rows and no orphans of either kind
    pub passed: bool,
    pub checksum: String,
}

#[derive(Serialize)]
struct SummaryChecksumPayload<'a> {
    session_id: &'a SessionId,
    period_id: &'a PeriodId,
    audit_timestamp: i64,
    total_rows: usize,
    count_by_status: &'a BTreeMap<String, u64>,
    count_by_flag: &'a BTreeMap<String, u64>,
}

impl AuditSummary {
    /// Recompute the summary checksum from its counter fields
    pub fn compute_checksum(&self) -> Result<String, ChecksumError> {
        checksum::checksum_of(&SummaryChecksumPayload {
            session_id: &self.session_id,
            period_id: &self.period_id,
            audit_timestamp: self.audit_timestamp,
            total_rows: self.total_rows,
            count_by_status: &self.count_by_status,
            count_by_flag: &self.count_by_flag,
        })
    }
}

/// Result of one audit run, owned by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditOutput {
    pub summary: AuditSummary,
    /// One row per audited flow, ordered by flow id
    pub rows: Vec<AuditRow>,
    /// Recharges unreachable from the audited flow set, sorted
    pub orphan_recharges: Vec<RechargeId>,
    /// Distinct attribution flow ids absent from the audited set, sorted
    pub orphan_attributions: Vec<FlowId>,
}
