//! Reporting views over audit output
//!
//! Every view is a pure function of one or more `AuditOutput` values.
//! Rates are expressed in basis points (1/10000) so the views stay in
//! integer arithmetic end to end.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::Display;

use greyledger_core::{FlowId, PartyId, PartyType};

use crate::types::{AuditFlag, AuditOutput, AuditRow, AuditStatus, AuditSummary};

/// Integer rate in basis points, 10000 = 100%
fn basis_points(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        0
    } else {
        ((part * 10_000) / whole) as u32
    }
}

/// How severe an exception is for downstream triage
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// Where an exception was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionSource {
    FlowRow,
    OrphanRecharge,
    OrphanAttribution,
}

/// One triage item derived from an audit run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditException {
    pub severity: Severity,
    pub source: ExceptionSource,
    /// Flow id, recharge id or attribution flow id depending on source
    pub reference: String,
    pub status: Option<AuditStatus>,
    pub flags: Vec<AuditFlag>,
}

/// Severity is driven by the flags, not the verdict, except that a
/// MISSING or ORPHAN row is always high.
fn row_severity(row: &AuditRow) -> Option<Severity> {
    if matches!(row.status, AuditStatus::Missing | AuditStatus::Orphan) {
        return Some(Severity::High);
    }
    if row.flags.is_empty() {
        return None;
    }
    let unconfirmed = row.flags.iter().any(|flag| {
        matches!(
            flag,
            AuditFlag::FlowNotConfirmed | AuditFlag::RechargeNotConfirmed
        )
    });
    Some(if unconfirmed {
        Severity::Medium
    } else {
        Severity::Low
    })
}

/// Everything in a run that needs human attention, worst first.
///
/// MISSING and ORPHAN rows and both orphan lists are high,
/// unconfirmed-status flags raise medium, any other flag low. Rows with
/// no flags never appear. Within a severity the order is by reference,
/// so the list is stable across runs.
pub fn exception_list(output: &AuditOutput) -> Vec<AuditException> {
    let mut exceptions: Vec<AuditException> = output
        .rows
        .iter()
        .filter_map(|row| {
            row_severity(row).map(|severity| AuditException {
                severity,
                source: ExceptionSource::FlowRow,
                reference: row.grey_flow_id.to_string(),
                status: Some(row.status),
                flags: row.flags.clone(),
            })
        })
        .collect();

    for recharge_id in &output.orphan_recharges {
        exceptions.push(AuditException {
            severity: Severity::High,
            source: ExceptionSource::OrphanRecharge,
            reference: recharge_id.to_string(),
            status: None,
            flags: vec![AuditFlag::RechargeNoFlow],
        });
    }
    for flow_id in &output.orphan_attributions {
        exceptions.push(AuditException {
            severity: Severity::High,
            source: ExceptionSource::OrphanAttribution,
            reference: flow_id.to_string(),
            status: None,
            flags: vec![AuditFlag::AttributionNoFlow],
        });
    }

    exceptions.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.reference.cmp(&b.reference))
    });
    exceptions
}

/// Row counts per verdict, zero-filled over every status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub status: AuditStatus,
    pub count: u64,
    pub share_bp: u32,
}

/// Break a run's rows down by verdict, in declaration order.
pub fn status_breakdown(output: &AuditOutput) -> Vec<StatusBreakdown> {
    let total = output.rows.len() as u64;
    AuditStatus::iter()
        .map(|status| {
            let count = output
                .summary
                .count_by_status
                .get(&status.to_string())
                .copied()
                .unwrap_or(0);
            StatusBreakdown {
                status,
                count,
                share_bp: basis_points(count, total),
            }
        })
        .collect()
}

/// Flag raise counts, zero-filled over every flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagBreakdown {
    pub flag: AuditFlag,
    pub count: u64,
    /// Rows carrying the flag; orphan-list flags never touch a row
    pub affected_rows: u64,
}

/// Break a run's flags down, in declaration order.
pub fn flag_breakdown(output: &AuditOutput) -> Vec<FlagBreakdown> {
    AuditFlag::iter()
        .map(|flag| {
            let count = output
                .summary
                .count_by_flag
                .get(&flag.to_string())
                .copied()
                .unwrap_or(0);
            let affected_rows = output
                .rows
                .iter()
                .filter(|row| row.flags.contains(&flag))
                .count() as u64;
            FlagBreakdown {
                flag,
                count,
                affected_rows,
            }
        })
        .collect()
}

/// Pass rate aggregated over the runs of one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodPassRate {
    pub period_id: String,
    pub total_runs: u64,
    pub passed_runs: u64,
    pub pass_rate_bp: u32,
}

/// Group summaries by period and compute per-period pass rates,
/// ordered by period id.
pub fn pass_rate_by_period(summaries: &[AuditSummary]) -> Vec<PeriodPassRate> {
    let mut by_period: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for summary in summaries {
        let slot = by_period.entry(summary.period_id.as_str()).or_insert((0, 0));
        slot.0 += 1;
        if summary.passed {
            slot.1 += 1;
        }
    }
    by_period
        .into_iter()
        .map(|(period_id, (total_runs, passed_runs))| PeriodPassRate {
            period_id: period_id.to_string(),
            total_runs,
            passed_runs,
            pass_rate_bp: basis_points(passed_runs, total_runs),
        })
        .collect()
}

/// Match rate for one attributed party across a run's rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyMatchRate {
    pub party_id: PartyId,
    pub party_type: PartyType,
    pub total_rows: u64,
    pub matched_rows: u64,
    pub match_rate_bp: u32,
}

/// For every party appearing in a row's attribution breakdown, the share
/// of its rows that fully matched. Ordered by party id then type.
pub fn party_match_rates(output: &AuditOutput) -> Vec<PartyMatchRate> {
    let mut by_party: BTreeMap<(&PartyId, String), (PartyType, u64, u64)> = BTreeMap::new();
    for row in &output.rows {
        for party in &row.attribution_breakdown {
            let slot = by_party
                .entry((&party.party_id, party.party_type.to_string()))
                .or_insert((party.party_type, 0, 0));
            slot.1 += 1;
            if row.status == AuditStatus::Matched {
                slot.2 += 1;
            }
        }
    }
    by_party
        .into_iter()
        .map(
            |((party_id, _), (party_type, total_rows, matched_rows))| PartyMatchRate {
                party_id: party_id.clone(),
                party_type,
                total_rows,
                matched_rows,
                match_rate_bp: basis_points(matched_rows, total_rows),
            },
        )
        .collect()
}

/// Step-by-step explanation of one flow's verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationTrace {
    pub flow_id: FlowId,
    pub row_id: String,
    pub status: AuditStatus,
    pub flags: Vec<AuditFlag>,
    /// Human-readable correlation steps, in evaluation order
    pub steps: Vec<String>,
}

/// Explain how one flow reached its verdict, or `None` if the flow was
/// not part of the run.
pub fn correlation_trace(output: &AuditOutput, flow_id: &FlowId) -> Option<CorrelationTrace> {
    let row = output.rows.iter().find(|row| &row.grey_flow_id == flow_id)?;

    let mut steps = Vec::new();
    match &row.recharge_id {
        Some(recharge_id) => {
            steps.push(format!("correlated with recharge {recharge_id}"));
        }
        None => steps.push("no recharge link found".to_string()),
    }
    if row.attribution_breakdown.is_empty() {
        steps.push("no attribution entries found".to_string());
    } else {
        steps.push(format!(
            "{} attribution entries: {}",
            row.attribution_breakdown.len(),
            row.attribution_breakdown
                .iter()
                .map(|party| party.party_id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    for flag in &row.flags {
        steps.push(format!("raised {flag}"));
    }
    steps.push(format!("verdict {}", row.status));

    Some(CorrelationTrace {
        flow_id: flow_id.clone(),
        row_id: row.row_id.clone(),
        status: row.status,
        flags: row.flags.clone(),
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        AttributionEntry, AttributionSnapshot, AuditAttributionData, AuditFlowData,
        AuditRechargeData, RechargeLink, RechargeRecord, RechargeStatus,
    };
    use crate::engine::{run_audit, AuditSessionDescriptor};
    use greyledger_core::{
        Amount, FlowDirection, FlowStatus, FlowType, PartyRef, PartyType, GENESIS_HASH,
    };
    use greyledger_ledger::{
        create_flow_record, transition_flow_status, FlowInput, FlowRecord, ValidationConfig,
    };

    const TS: i64 = 1_700_000_000_000;

    fn flow(flow_id: &str, sequence: u64, confirmed: bool) -> FlowRecord {
        let input = FlowInput {
            flow_id: flow_id.into(),
            session_id: "S-1".into(),
            party: PartyRef::new("P-1", PartyType::Player),
            flow_type: FlowType::BuyinRef,
            amount: 100,
            direction: FlowDirection::In,
            injected_timestamp: TS,
            linked_ledger_entry_id: None,
            description: None,
            metadata: None,
        };
        let pending =
            create_flow_record(&input, sequence, GENESIS_HASH, &ValidationConfig::default())
                .unwrap();
        if confirmed {
            transition_flow_status(&pending, FlowStatus::Confirmed, sequence + 1, &pending.checksum)
                .unwrap()
        } else {
            pending
        }
    }

    /// F-1 fully matched, F-2 confirmed but unattributed (MISSING),
    /// plus one orphan recharge.
    fn sample_output() -> AuditOutput {
        let descriptor = AuditSessionDescriptor {
            session_id: "S-1".into(),
            period_id: "2024-W01".into(),
            audit_timestamp: TS,
        };
        let flows =
            AuditFlowData::from_records(vec![flow("F-1", 0, true), flow("F-2", 1, true)]);
        let recharges = AuditRechargeData::new(
            vec![
                RechargeRecord {
                    recharge_id: "R-1".into(),
                    amount: Amount::new(100).unwrap(),
                    status: RechargeStatus::Confirmed,
                    timestamp: TS,
                },
                RechargeRecord {
                    recharge_id: "R-9".into(),
                    amount: Amount::new(50).unwrap(),
                    status: RechargeStatus::Confirmed,
                    timestamp: TS,
                },
            ],
            vec![
                RechargeLink {
                    recharge_id: "R-1".into(),
                    flow_id: "F-1".into(),
                },
                RechargeLink {
                    recharge_id: "R-2".into(),
                    flow_id: "F-2".into(),
                },
            ],
        );
        let attribution = AuditAttributionData::new(AttributionSnapshot {
            period_id: "2024-W01".into(),
            entries: vec![AttributionEntry {
                flow_id: "F-1".into(),
                party: PartyRef::new("CLUB-1", PartyType::Club),
            }],
        });
        run_audit(&descriptor, &flows, &recharges, &attribution).unwrap()
    }

    #[test]
    fn test_status_breakdown_zero_filled() {
        let breakdown = status_breakdown(&sample_output());
        assert_eq!(breakdown.len(), 4);
        let matched = breakdown
            .iter()
            .find(|b| b.status == AuditStatus::Matched)
            .unwrap();
        assert_eq!(matched.count, 1);
        assert_eq!(matched.share_bp, 5_000);
        let orphan = breakdown
            .iter()
            .find(|b| b.status == AuditStatus::Orphan)
            .unwrap();
        assert_eq!(orphan.count, 0);
        assert_eq!(orphan.share_bp, 0);
    }

    #[test]
    fn test_flag_breakdown_counts_orphan_flags() {
        let breakdown = flag_breakdown(&sample_output());
        let recharge_no_flow = breakdown
            .iter()
            .find(|b| b.flag == AuditFlag::RechargeNoFlow)
            .unwrap();
        assert_eq!(recharge_no_flow.count, 1);
        assert_eq!(recharge_no_flow.affected_rows, 0);
    }

    #[test]
    fn test_exception_list_worst_first() {
        let exceptions = exception_list(&sample_output());
        // MISSING row F-2 and orphan recharge R-9, both high
        assert_eq!(exceptions.len(), 2);
        assert!(exceptions.iter().all(|e| e.severity == Severity::High));
        assert_eq!(exceptions[0].reference, "F-2");
        assert_eq!(exceptions[0].source, ExceptionSource::FlowRow);
        assert_eq!(exceptions[1].reference, "R-9");
        assert_eq!(exceptions[1].source, ExceptionSource::OrphanRecharge);
    }

    #[test]
    fn test_missing_recharge_alone_is_low() {
        // Confirmed and attributed, just no recharge link: the only flag
        // is FLOW_NO_RECHARGE, which must grade low, not medium.
        let descriptor = AuditSessionDescriptor {
            session_id: "S-1".into(),
            period_id: "2024-W01".into(),
            audit_timestamp: TS,
        };
        let flows = AuditFlowData::from_records(vec![flow("F-1", 0, true)]);
        let recharges = AuditRechargeData::new(vec![], vec![]);
        let attribution = AuditAttributionData::new(AttributionSnapshot {
            period_id: "2024-W01".into(),
            entries: vec![AttributionEntry {
                flow_id: "F-1".into(),
                party: PartyRef::new("CLUB-1", PartyType::Club),
            }],
        });
        let output = run_audit(&descriptor, &flows, &recharges, &attribution).unwrap();
        assert_eq!(output.rows[0].status, AuditStatus::Partial);
        assert_eq!(output.rows[0].flags, vec![AuditFlag::FlowNoRecharge]);

        let exceptions = exception_list(&output);
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].severity, Severity::Low);
    }

    #[test]
    fn test_unconfirmed_recharge_is_medium() {
        let descriptor = AuditSessionDescriptor {
            session_id: "S-1".into(),
            period_id: "2024-W01".into(),
            audit_timestamp: TS,
        };
        let flows = AuditFlowData::from_records(vec![flow("F-1", 0, true)]);
        let recharges = AuditRechargeData::new(
            vec![RechargeRecord {
                recharge_id: "R-1".into(),
                amount: Amount::new(500).unwrap(),
                status: RechargeStatus::Pending,
                timestamp: TS,
            }],
            vec![RechargeLink {
                recharge_id: "R-1".into(),
                flow_id: "F-1".into(),
            }],
        );
        let attribution = AuditAttributionData::new(AttributionSnapshot {
            period_id: "2024-W01".into(),
            entries: vec![AttributionEntry {
                flow_id: "F-1".into(),
                party: PartyRef::new("CLUB-1", PartyType::Club),
            }],
        });
        let output = run_audit(&descriptor, &flows, &recharges, &attribution).unwrap();
        assert!(output.rows[0]
            .flags
            .contains(&AuditFlag::RechargeNotConfirmed));

        let exceptions = exception_list(&output);
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].severity, Severity::Medium);
    }

    #[test]
    fn test_severity_wire_names() {
        assert_eq!(
            serde_json::to_string(&Severity::High).unwrap(),
            "\"HIGH\""
        );
        assert_eq!(Severity::Medium.to_string(), "MEDIUM");
        assert!(Severity::High < Severity::Low);
    }

    #[test]
    fn test_pass_rate_by_period_groups() {
        let output = sample_output();
        let mut failed = output.summary.clone();
        failed.passed = false;
        let mut passed = output.summary.clone();
        passed.passed = true;
        let mut other = output.summary.clone();
        other.period_id = "2024-W02".into();
        other.passed = true;

        let rates = pass_rate_by_period(&[failed, passed, other]);
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].period_id, "2024-W01");
        assert_eq!(rates[0].total_runs, 2);
        assert_eq!(rates[0].passed_runs, 1);
        assert_eq!(rates[0].pass_rate_bp, 5_000);
        assert_eq!(rates[1].pass_rate_bp, 10_000);
    }

    #[test]
    fn test_party_match_rates() {
        let rates = party_match_rates(&sample_output());
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].party_id.as_str(), "CLUB-1");
        assert_eq!(rates[0].total_rows, 1);
        assert_eq!(rates[0].matched_rows, 1);
        assert_eq!(rates[0].match_rate_bp, 10_000);
    }

    #[test]
    fn test_correlation_trace_explains_verdict() {
        let output = sample_output();
        let trace = correlation_trace(&output, &"F-2".into()).unwrap();
        assert_eq!(trace.status, AuditStatus::Missing);
        assert!(trace.steps.iter().any(|s| s.contains("no attribution")));
        assert!(trace.steps.last().unwrap().contains("MISSING"));

        assert!(correlation_trace(&output, &"F-404".into()).is_none());
    }
}
