//! Correlation engine
//!
//! `run_audit` is a pure function over three read-only snapshots. Rows
//! are produced in ascending flow-id order regardless of input iteration
//! order, flags are sorted by wire name, and all counters are zero-filled
//! over closed enums, so two runs on the same inputs are byte-identical.

use std::collections::BTreeMap;

use strum::IntoEnumIterator;
use tracing::info;

use greyledger_core::{FlowId, FlowStatus, PeriodId, RechargeId, SessionId};
use greyledger_ledger::FlowRecord;

use crate::adapters::{AuditAttributionData, AuditFlowData, AuditRechargeData, RechargeStatus};
use crate::error::AuditError;
use crate::types::{AuditFlag, AuditOutput, AuditRow, AuditStatus, AuditSummary};

/// Identifies the session and period one audit run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSessionDescriptor {
    pub session_id: SessionId,
    pub period_id: PeriodId,
    /// Caller-supplied positive integer; the engine never reads a clock
    pub audit_timestamp: i64,
}

/// Correlate flows against recharges and attribution into one verdict
/// per flow plus orphan lists.
///
/// Fails only for a non-positive audit timestamp. Inputs are never
/// mutated; the returned output is freshly owned by the caller.
pub fn run_audit(
    descriptor: &AuditSessionDescriptor,
    flow_data: &AuditFlowData,
    recharge_data: &AuditRechargeData,
    attribution_data: &AuditAttributionData,
) -> Result<AuditOutput, AuditError> {
    if descriptor.audit_timestamp <= 0 {
        return Err(AuditError::InvalidTimestamp {
            timestamp: descriptor.audit_timestamp,
        });
    }

    // Deterministic row order: ascending by flow id, ties impossible
    // within a snapshot but resolved lexicographically regardless.
    let mut flows: Vec<&FlowRecord> = flow_data.flows().iter().collect();
    flows.sort_by(|a, b| a.flow_id.cmp(&b.flow_id));

    let mut count_by_status: BTreeMap<String, u64> =
        AuditStatus::iter().map(|s| (s.to_string(), 0)).collect();
    let mut count_by_flag: BTreeMap<String, u64> =
        AuditFlag::iter().map(|f| (f.to_string(), 0)).collect();

    let mut rows = Vec::with_capacity(flows.len());
    let mut attributed_flow_count = 0;

    for flow in flows {
        let mut flags = Vec::new();

        let links = recharge_data.get_links_by_flow(&flow.flow_id);
        // Known limitation carried over from the source system: only the
        // first link is correlated when several exist.
        let recharge_id: Option<RechargeId> =
            links.first().map(|link| link.recharge_id.clone());

        if links.is_empty() {
            flags.push(AuditFlag::FlowNoRecharge);
        } else {
            let confirmed = recharge_id
                .as_ref()
                .and_then(|id| recharge_data.get_recharge(id))
                .map(|recharge| recharge.status == RechargeStatus::Confirmed)
                .unwrap_or(false);
            if !confirmed {
                flags.push(AuditFlag::RechargeNotConfirmed);
            }
        }

        if flow.status != FlowStatus::Confirmed {
            flags.push(AuditFlag::FlowNotConfirmed);
        }

        let entries = attribution_data.get_entries_for_flow(&flow.flow_id);
        if entries.is_empty() {
            flags.push(AuditFlag::FlowNoAttribution);
        } else {
            attributed_flow_count += 1;
            if entries.len() > 1 {
                flags.push(AuditFlag::MultipleAttributions);
            }
        }

        let has_recharge = !links.is_empty();
        let has_attribution = !entries.is_empty();

        let mut status = if has_recharge && has_attribution && flags.is_empty() {
            AuditStatus::Matched
        } else if has_recharge || has_attribution {
            AuditStatus::Partial
        } else {
            AuditStatus::Orphan
        };
        // A confirmed flow without attribution is always an audit
        // failure, never merely partial.
        if flow.status == FlowStatus::Confirmed && !has_attribution {
            status = AuditStatus::Missing;
        }

        flags.sort_by_key(|flag| flag.to_string());
        for flag in &flags {
            if let Some(count) = count_by_flag.get_mut(&flag.to_string()) {
                *count += 1;
            }
        }
        if let Some(count) = count_by_status.get_mut(&status.to_string()) {
            *count += 1;
        }

        let mut row = AuditRow {
            row_id: format!("{}:{}", flow.session_id, flow.sequence),
            session_id: flow.session_id.clone(),
            sequence: flow.sequence,
            grey_flow_id: flow.flow_id.clone(),
            recharge_id,
            attribution_breakdown: entries.iter().map(|e| e.party.clone()).collect(),
            status,
            flags,
            checksum: String::new(),
        };
        row.checksum = row.compute_checksum()?;
        rows.push(row);
    }

    // Recharges unreachable from the audited flow set.
    let mut orphan_recharges: Vec<RechargeId> = recharge_data
        .recharges()
        .iter()
        .filter(|recharge| {
            let links = recharge_data.get_links_by_recharge(&recharge.recharge_id);
            links.is_empty() || links.iter().all(|link| !flow_data.contains(&link.flow_id))
        })
        .map(|recharge| recharge.recharge_id.clone())
        .collect();
    orphan_recharges.sort();
    if let Some(count) = count_by_flag.get_mut(&AuditFlag::RechargeNoFlow.to_string()) {
        *count += orphan_recharges.len() as u64;
    }

    // Attribution entries pointing at flows outside the audited set.
    let mut orphan_attributions: Vec<FlowId> = attribution_data
        .entries()
        .iter()
        .filter(|entry| !flow_data.contains(&entry.flow_id))
        .map(|entry| entry.flow_id.clone())
        .collect();
    orphan_attributions.sort();
    orphan_attributions.dedup();
    if let Some(count) = count_by_flag.get_mut(&AuditFlag::AttributionNoFlow.to_string()) {
        *count += orphan_attributions.len() as u64;
    }

    let failed_rows = rows
        .iter()
        .filter(|row| matches!(row.status, AuditStatus::Missing | AuditStatus::Orphan))
        .count();
    let passed =
        failed_rows == 0 && orphan_recharges.is_empty() && orphan_attributions.is_empty();

    let mut summary = AuditSummary {
        session_id: descriptor.session_id.clone(),
        period_id: descriptor.period_id.clone(),
        audit_timestamp: descriptor.audit_timestamp,
        flow_count: flow_data.flows().len(),
        recharge_count: recharge_data.recharges().len(),
        attributed_flow_count,
        total_rows: rows.len(),
        count_by_status,
        count_by_flag,
        passed,
        checksum: String::new(),
    };
    summary.checksum = summary.compute_checksum()?;

    info!(
        session_id = %descriptor.session_id,
        period_id = %descriptor.period_id,
        rows = summary.total_rows,
        passed,
        "audit run completed"
    );

    Ok(AuditOutput {
        summary,
        rows,
        orphan_recharges,
        orphan_attributions,
    })
}

/// Re-run the audit and compare every checksum against a previous output.
///
/// Returns `true` only if the summary checksum, the row count and every
/// row checksum match. Any mismatch signals non-determinism and must be
/// treated as a defect.
pub fn verify_audit_reproducibility(
    descriptor: &AuditSessionDescriptor,
    flow_data: &AuditFlowData,
    recharge_data: &AuditRechargeData,
    attribution_data: &AuditAttributionData,
    previous: &AuditOutput,
) -> Result<bool, AuditError> {
    let rerun = run_audit(descriptor, flow_data, recharge_data, attribution_data)?;

    if rerun.summary.checksum != previous.summary.checksum {
        return Ok(false);
    }
    if rerun.rows.len() != previous.rows.len() {
        return Ok(false);
    }
    Ok(rerun
        .rows
        .iter()
        .zip(previous.rows.iter())
        .all(|(a, b)| a.checksum == b.checksum))
}
