//! Time-bucketed views
//!
//! Records are assigned to fixed-size buckets
//! (`floor(timestamp / bucket_size) * bucket_size`) at minute, hour or
//! day granularity. Every bucket in the requested window is emitted,
//! empty ones included, so charts never have gaps. Timestamps are
//! caller-supplied Unix milliseconds.

use serde::Serialize;
use strum_macros::Display;

use greyledger_core::{FlowDirection, FlowStatus};
use greyledger_ledger::FlowRecord;

use crate::effective::effective_records;
use crate::error::ViewError;

/// Bucket granularity over millisecond timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    Minute,
    Hour,
    Day,
}

impl Granularity {
    /// Bucket size in milliseconds
    pub const fn bucket_size(&self) -> i64 {
        match self {
            Granularity::Minute => 60_000,
            Granularity::Hour => 3_600_000,
            Granularity::Day => 86_400_000,
        }
    }
}

/// Inclusive time window over caller-supplied millisecond timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    /// Validated window; start and end must be positive and ordered
    pub fn new(start: i64, end: i64) -> Result<Self, ViewError> {
        if start <= 0 || end <= 0 || start > end {
            return Err(ViewError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// One fixed-size bucket of flow activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    /// Bucket start: `floor(timestamp / bucket_size) * bucket_size`
    pub bucket_start: i64,
    /// Sum of non-void IN amounts
    pub in_total: i64,
    /// Sum of non-void OUT amounts
    pub out_total: i64,
    /// Non-void effective records in this bucket
    pub flow_count: usize,
    /// Voided effective records in this bucket, excluded from totals
    pub voided_count: usize,
}

/// Fold effective records into a gap-free series of buckets.
///
/// Buckets run from the bucket containing `window.start` through the
/// bucket containing `window.end`; records outside the window are
/// ignored.
pub fn time_bucketed_view(
    records: &[FlowRecord],
    window: TimeWindow,
    granularity: Granularity,
) -> Result<Vec<TimeBucket>, ViewError> {
    if window.start <= 0 || window.end <= 0 || window.start > window.end {
        return Err(ViewError::InvalidWindow {
            start: window.start,
            end: window.end,
        });
    }

    let size = granularity.bucket_size();
    let first_bucket = (window.start / size) * size;
    let last_bucket = (window.end / size) * size;

    let mut buckets: Vec<TimeBucket> = (0..)
        .map(|i| first_bucket + i * size)
        .take_while(|&start| start <= last_bucket)
        .map(|bucket_start| TimeBucket {
            bucket_start,
            in_total: 0,
            out_total: 0,
            flow_count: 0,
            voided_count: 0,
        })
        .collect();

    for record in effective_records(records) {
        if !window.contains(record.injected_timestamp) {
            continue;
        }
        let bucket_start = (record.injected_timestamp / size) * size;
        let index = ((bucket_start - first_bucket) / size) as usize;
        let bucket = &mut buckets[index];

        if record.status == FlowStatus::Void {
            bucket.voided_count += 1;
            continue;
        }
        bucket.flow_count += 1;
        match record.direction {
            FlowDirection::In => bucket.in_total += record.amount.value(),
            FlowDirection::Out => bucket.out_total += record.amount.value(),
        }
    }

    Ok(buckets)
}
