//! Effective record selection
//!
//! For each flow id only the record with the highest sequence counts.
//! This folds a PENDING -> CONFIRMED/VOID history into one logical state,
//! which is what every aggregate in this crate reduces over.

use std::collections::HashMap;

use greyledger_ledger::FlowRecord;

/// Latest record per flow id, sorted by flow id for deterministic output
pub fn effective_records(records: &[FlowRecord]) -> Vec<&FlowRecord> {
    let mut latest: HashMap<&str, &FlowRecord> = HashMap::new();
    for record in records {
        latest
            .entry(record.flow_id.as_str())
            .and_modify(|current| {
                if record.sequence > current.sequence {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    let mut effective: Vec<&FlowRecord> = latest.into_values().collect();
    effective.sort_by(|a, b| a.flow_id.cmp(&b.flow_id));
    effective
}
