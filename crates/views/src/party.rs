//! Per-party summaries
//!
//! Platform/club/agent summaries fold RAKE_REF and ADJUST_REF amounts by
//! direction. Player summaries additionally fold buy-ins and cash-outs
//! into a `net_flow_reference` - explicitly a reference figure, never a
//! balance. Voided records contribute zero everywhere but stay counted.

use std::collections::BTreeMap;

use serde::Serialize;

use greyledger_core::{FlowDirection, FlowStatus, FlowType, PartyId, PartyType};
use greyledger_ledger::FlowRecord;

use crate::effective::effective_records;

/// Aggregate of rake/adjustment references for one non-player party
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartySummary {
    pub party_id: PartyId,
    pub party_type: PartyType,
    /// Sum of non-void RAKE_REF amounts (rake always flows in)
    pub rake_in: i64,
    /// Sum of non-void ADJUST_REF amounts with direction IN
    pub adjust_in: i64,
    /// Sum of non-void ADJUST_REF amounts with direction OUT
    pub adjust_out: i64,
    /// Non-void effective records attached to this party
    pub flow_count: usize,
    /// Voided effective records; visible but excluded from all totals
    pub voided_count: usize,
}

/// Aggregate of buy-in/cash-out/adjustment references for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub party_id: PartyId,
    pub buyin_total: i64,
    pub cashout_total: i64,
    pub adjust_in: i64,
    pub adjust_out: i64,
    /// buyin - cashout + adjust_in - adjust_out. A reference figure for
    /// reconciliation, not a balance.
    pub net_flow_reference: i64,
    pub flow_count: usize,
    pub voided_count: usize,
}

/// Summaries for every party of the given non-player type, sorted by
/// party id.
pub fn party_summaries(records: &[FlowRecord], party_type: PartyType) -> Vec<PartySummary> {
    let mut by_party: BTreeMap<&PartyId, PartySummary> = BTreeMap::new();

    for record in effective_records(records) {
        if record.party.party_type != party_type {
            continue;
        }
        let summary = by_party
            .entry(&record.party.party_id)
            .or_insert_with(|| PartySummary {
                party_id: record.party.party_id.clone(),
                party_type,
                rake_in: 0,
                adjust_in: 0,
                adjust_out: 0,
                flow_count: 0,
                voided_count: 0,
            });

        if record.status == FlowStatus::Void {
            summary.voided_count += 1;
            continue;
        }
        summary.flow_count += 1;

        match (record.flow_type, record.direction) {
            (FlowType::RakeRef, FlowDirection::In) => summary.rake_in += record.amount.value(),
            (FlowType::AdjustRef, FlowDirection::In) => {
                summary.adjust_in += record.amount.value()
            }
            (FlowType::AdjustRef, FlowDirection::Out) => {
                summary.adjust_out += record.amount.value()
            }
            _ => {}
        }
    }

    by_party.into_values().collect()
}

/// Summaries for every player party, sorted by party id
pub fn player_summaries(records: &[FlowRecord]) -> Vec<PlayerSummary> {
    let mut by_player: BTreeMap<&PartyId, PlayerSummary> = BTreeMap::new();

    for record in effective_records(records) {
        if record.party.party_type != PartyType::Player {
            continue;
        }
        let summary = by_player
            .entry(&record.party.party_id)
            .or_insert_with(|| PlayerSummary {
                party_id: record.party.party_id.clone(),
                buyin_total: 0,
                cashout_total: 0,
                adjust_in: 0,
                adjust_out: 0,
                net_flow_reference: 0,
                flow_count: 0,
                voided_count: 0,
            });

        if record.status == FlowStatus::Void {
            summary.voided_count += 1;
            continue;
        }
        summary.flow_count += 1;

        let amount = record.amount.value();
        match (record.flow_type, record.direction) {
            (FlowType::BuyinRef, _) => summary.buyin_total += amount,
            (FlowType::CashoutRef, _) => summary.cashout_total += amount,
            (FlowType::AdjustRef, FlowDirection::In) => summary.adjust_in += amount,
            (FlowType::AdjustRef, FlowDirection::Out) => summary.adjust_out += amount,
            _ => {}
        }
    }

    for summary in by_player.values_mut() {
        summary.net_flow_reference = summary.buyin_total - summary.cashout_total
            + summary.adjust_in
            - summary.adjust_out;
    }

    by_player.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use greyledger_core::PartyRef;
    use greyledger_ledger::{FlowInput, FlowRegistry};

    const TS: i64 = 1_700_000_000_000;

    fn input(
        flow_id: &str,
        party: PartyRef,
        flow_type: FlowType,
        amount: i64,
        direction: FlowDirection,
    ) -> FlowInput {
        FlowInput {
            flow_id: flow_id.into(),
            session_id: "S-1".into(),
            party,
            flow_type,
            amount,
            direction,
            injected_timestamp: TS,
            linked_ledger_entry_id: None,
            description: None,
            metadata: None,
        }
    }

    fn club(id: &str) -> PartyRef {
        PartyRef::new(id, PartyType::Club)
    }

    fn player(id: &str) -> PartyRef {
        PartyRef::new(id, PartyType::Player)
    }

    #[test]
    fn test_club_summary_sums_rake_and_adjust() {
        let mut registry = FlowRegistry::new();
        registry
            .append_flow(input("F-1", club("C-1"), FlowType::RakeRef, 300, FlowDirection::In))
            .unwrap();
        registry
            .append_flow(input("F-2", club("C-1"), FlowType::AdjustRef, 50, FlowDirection::Out))
            .unwrap();
        registry
            .append_flow(input("F-3", club("C-2"), FlowType::RakeRef, 700, FlowDirection::In))
            .unwrap();

        let summaries = party_summaries(registry.all_records(), PartyType::Club);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].party_id.as_str(), "C-1");
        assert_eq!(summaries[0].rake_in, 300);
        assert_eq!(summaries[0].adjust_out, 50);
        assert_eq!(summaries[0].flow_count, 2);
        assert_eq!(summaries[1].party_id.as_str(), "C-2");
        assert_eq!(summaries[1].rake_in, 700);
    }

    #[test]
    fn test_void_excluded_from_totals_but_counted() {
        let mut registry = FlowRegistry::new();
        registry
            .append_flow(input("F-1", club("C-1"), FlowType::RakeRef, 300, FlowDirection::In))
            .unwrap();
        registry
            .append_flow(input("F-2", club("C-1"), FlowType::RakeRef, 500, FlowDirection::In))
            .unwrap();
        registry.void_flow(&"F-2".into()).unwrap();

        let summaries = party_summaries(registry.all_records(), PartyType::Club);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].rake_in, 300);
        assert_eq!(summaries[0].flow_count, 1);
        assert_eq!(summaries[0].voided_count, 1);
        // The voided record is still in the log
        assert_eq!(registry.record_count(), 3);
    }

    #[test]
    fn test_player_net_flow_reference() {
        let mut registry = FlowRegistry::new();
        registry
            .append_flow(input("F-1", player("P-1"), FlowType::BuyinRef, 1_000, FlowDirection::In))
            .unwrap();
        registry
            .append_flow(input(
                "F-2",
                player("P-1"),
                FlowType::CashoutRef,
                400,
                FlowDirection::Out,
            ))
            .unwrap();
        registry
            .append_flow(input("F-3", player("P-1"), FlowType::AdjustRef, 50, FlowDirection::In))
            .unwrap();
        registry
            .append_flow(input("F-4", player("P-1"), FlowType::AdjustRef, 20, FlowDirection::Out))
            .unwrap();

        let summaries = player_summaries(registry.all_records());
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.buyin_total, 1_000);
        assert_eq!(s.cashout_total, 400);
        assert_eq!(s.adjust_in, 50);
        assert_eq!(s.adjust_out, 20);
        assert_eq!(s.net_flow_reference, 630);
    }

    #[test]
    fn test_effective_fold_uses_latest_status() {
        let mut registry = FlowRegistry::new();
        registry
            .append_flow(input("F-1", player("P-1"), FlowType::BuyinRef, 1_000, FlowDirection::In))
            .unwrap();
        registry.void_flow(&"F-1".into()).unwrap();

        let summaries = player_summaries(registry.all_records());
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].buyin_total, 0);
        assert_eq!(summaries[0].voided_count, 1);
        assert_eq!(summaries[0].net_flow_reference, 0);
    }

    #[test]
    fn test_other_party_types_excluded() {
        let mut registry = FlowRegistry::new();
        registry
            .append_flow(input("F-1", club("C-1"), FlowType::RakeRef, 300, FlowDirection::In))
            .unwrap();

        assert!(party_summaries(registry.all_records(), PartyType::Agent).is_empty());
        assert!(player_summaries(registry.all_records()).is_empty());
    }
}
