//! Read-only snapshot adapters
//!
//! The engine sees its three data sources only through these adapters.
//! Each one pre-builds indices at construction so every lookup during
//! correlation is O(1), and none of them exposes a mutating operation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use greyledger_core::{Amount, FlowId, PartyRef, PeriodId, RechargeId};
use greyledger_ledger::FlowRecord;

/// Status of an externally produced recharge record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RechargeStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Externally produced reconciling top-up, consumed read-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RechargeRecord {
    pub recharge_id: RechargeId,
    pub amount: Amount,
    pub status: RechargeStatus,
    pub timestamp: i64,
}

/// Association between a recharge and a flow, consumed read-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechargeLink {
    pub recharge_id: RechargeId,
    pub flow_id: FlowId,
}

/// One externally attributed party share for a flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionEntry {
    pub flow_id: FlowId,
    pub party: PartyRef,
}

/// Externally produced attribution snapshot for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionSnapshot {
    pub period_id: PeriodId,
    pub entries: Vec<AttributionEntry>,
}

/// Indexed, read-only view of the flows under audit
#[derive(Debug, Clone)]
pub struct AuditFlowData {
    flows: Vec<FlowRecord>,
    by_id: HashMap<FlowId, usize>,
}

impl AuditFlowData {
    /// Build from an owned snapshot of records.
    ///
    /// Callers usually pass the effective records of one session; if the
    /// same flow id appears more than once, the later record wins.
    pub fn from_records(flows: Vec<FlowRecord>) -> Self {
        let by_id = flows
            .iter()
            .enumerate()
            .map(|(i, record)| (record.flow_id.clone(), i))
            .collect();
        Self { flows, by_id }
    }

    pub fn get_flow(&self, flow_id: &FlowId) -> Option<&FlowRecord> {
        self.by_id.get(flow_id).map(|&i| &self.flows[i])
    }

    pub fn contains(&self, flow_id: &FlowId) -> bool {
        self.by_id.contains_key(flow_id)
    }

    pub fn flows(&self) -> &[FlowRecord] {
        &self.flows
    }
}

/// Indexed, read-only view of recharges and recharge-flow links
#[derive(Debug, Clone)]
pub struct AuditRechargeData {
    recharges: Vec<RechargeRecord>,
    links: Vec<RechargeLink>,
    by_id: HashMap<RechargeId, usize>,
    links_by_flow: HashMap<FlowId, Vec<usize>>,
    links_by_recharge: HashMap<RechargeId, Vec<usize>>,
}

impl AuditRechargeData {
    pub fn new(recharges: Vec<RechargeRecord>, links: Vec<RechargeLink>) -> Self {
        let by_id = recharges
            .iter()
            .enumerate()
            .map(|(i, r)| (r.recharge_id.clone(), i))
            .collect();

        let mut links_by_flow: HashMap<FlowId, Vec<usize>> = HashMap::new();
        let mut links_by_recharge: HashMap<RechargeId, Vec<usize>> = HashMap::new();
        for (i, link) in links.iter().enumerate() {
            links_by_flow.entry(link.flow_id.clone()).or_default().push(i);
            links_by_recharge
                .entry(link.recharge_id.clone())
                .or_default()
                .push(i);
        }

        Self {
            recharges,
            links,
            by_id,
            links_by_flow,
            links_by_recharge,
        }
    }

    pub fn get_recharge(&self, recharge_id: &RechargeId) -> Option<&RechargeRecord> {
        self.by_id.get(recharge_id).map(|&i| &self.recharges[i])
    }

    /// Links for a flow, in input order. The engine correlates against
    /// the first only.
    pub fn get_links_by_flow(&self, flow_id: &FlowId) -> Vec<&RechargeLink> {
        self.links_by_flow
            .get(flow_id)
            .map(|indices| indices.iter().map(|&i| &self.links[i]).collect())
            .unwrap_or_default()
    }

    pub fn get_links_by_recharge(&self, recharge_id: &RechargeId) -> Vec<&RechargeLink> {
        self.links_by_recharge
            .get(recharge_id)
            .map(|indices| indices.iter().map(|&i| &self.links[i]).collect())
            .unwrap_or_default()
    }

    pub fn recharges(&self) -> &[RechargeRecord] {
        &self.recharges
    }
}

/// Read-only wrapper over an optional attribution snapshot
#[derive(Debug, Clone, Default)]
pub struct AuditAttributionData {
    snapshot: Option<AttributionSnapshot>,
    by_flow: HashMap<FlowId, Vec<usize>>,
}

impl AuditAttributionData {
    pub fn new(snapshot: AttributionSnapshot) -> Self {
        let mut by_flow: HashMap<FlowId, Vec<usize>> = HashMap::new();
        for (i, entry) in snapshot.entries.iter().enumerate() {
            by_flow.entry(entry.flow_id.clone()).or_default().push(i);
        }
        Self {
            snapshot: Some(snapshot),
            by_flow,
        }
    }

    /// Adapter for an audit run with no attribution snapshot at all
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get_entries_for_flow(&self, flow_id: &FlowId) -> Vec<&AttributionEntry> {
        match (&self.snapshot, self.by_flow.get(flow_id)) {
            (Some(snapshot), Some(indices)) => {
                indices.iter().map(|&i| &snapshot.entries[i]).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn has_attribution_for_flow(&self, flow_id: &FlowId) -> bool {
        self.by_flow.contains_key(flow_id)
    }

    pub fn entries(&self) -> &[AttributionEntry] {
        self.snapshot
            .as_ref()
            .map(|s| s.entries.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greyledger_core::{FlowDirection, FlowType, PartyType, GENESIS_HASH};
    use greyledger_ledger::{create_flow_record, FlowInput, ValidationConfig};

    fn flow(flow_id: &str) -> FlowRecord {
        let input = FlowInput {
            flow_id: flow_id.into(),
            session_id: "S-1".into(),
            party: PartyRef::new("P-1", PartyType::Player),
            flow_type: FlowType::BuyinRef,
            amount: 100,
            direction: FlowDirection::In,
            injected_timestamp: 1_700_000_000_000,
            linked_ledger_entry_id: None,
            description: None,
            metadata: None,
        };
        create_flow_record(&input, 0, GENESIS_HASH, &ValidationConfig::default()).unwrap()
    }

    fn recharge(id: &str, status: RechargeStatus) -> RechargeRecord {
        RechargeRecord {
            recharge_id: id.into(),
            amount: Amount::new(100).unwrap(),
            status,
            timestamp: 1_700_000_000_000,
        }
    }

    fn link(recharge_id: &str, flow_id: &str) -> RechargeLink {
        RechargeLink {
            recharge_id: recharge_id.into(),
            flow_id: flow_id.into(),
        }
    }

    #[test]
    fn test_flow_data_lookup() {
        let data = AuditFlowData::from_records(vec![flow("F-1"), flow("F-2")]);
        assert!(data.contains(&"F-1".into()));
        assert!(!data.contains(&"F-3".into()));
        assert_eq!(
            data.get_flow(&"F-2".into()).unwrap().flow_id.as_str(),
            "F-2"
        );
    }

    #[test]
    fn test_recharge_links_preserve_input_order() {
        let data = AuditRechargeData::new(
            vec![
                recharge("R-1", RechargeStatus::Confirmed),
                recharge("R-2", RechargeStatus::Pending),
            ],
            vec![link("R-2", "F-1"), link("R-1", "F-1")],
        );

        let links = data.get_links_by_flow(&"F-1".into());
        assert_eq!(links.len(), 2);
        // First-match semantics depend on input order surviving
        assert_eq!(links[0].recharge_id.as_str(), "R-2");
        assert_eq!(data.get_links_by_recharge(&"R-1".into()).len(), 1);
        assert!(data.get_links_by_flow(&"F-9".into()).is_empty());
    }

    #[test]
    fn test_attribution_data_empty() {
        let data = AuditAttributionData::empty();
        assert!(!data.has_attribution_for_flow(&"F-1".into()));
        assert!(data.get_entries_for_flow(&"F-1".into()).is_empty());
        assert!(data.entries().is_empty());
    }

    #[test]
    fn test_attribution_lookup() {
        let snapshot = AttributionSnapshot {
            period_id: "2024-W01".into(),
            entries: vec![
                AttributionEntry {
                    flow_id: "F-1".into(),
                    party: PartyRef::new("CLUB-1", PartyType::Club),
                },
                AttributionEntry {
                    flow_id: "F-1".into(),
                    party: PartyRef::new("AGENT-1", PartyType::Agent),
                },
            ],
        };
        let data = AuditAttributionData::new(snapshot);
        assert!(data.has_attribution_for_flow(&"F-1".into()));
        assert_eq!(data.get_entries_for_flow(&"F-1".into()).len(), 2);
        assert!(data.get_entries_for_flow(&"F-2".into()).is_empty());
    }
}
