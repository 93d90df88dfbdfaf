//! GreyLedger Views - pure aggregation over effective flow records
//!
//! Every function here is a pure reducer: it takes a slice of records,
//! folds the *effective* ones (latest version per flow id) and returns a
//! freshly owned summary. Nothing here mutates the ledger or reads a
//! clock, and a voided flow contributes zero to every total while
//! remaining visible through `voided_count`.

pub mod effective;
pub mod error;
pub mod party;
pub mod time;

pub use effective::effective_records;
pub use error::ViewError;
pub use party::{party_summaries, player_summaries, PartySummary, PlayerSummary};
pub use time::{time_bucketed_view, Granularity, TimeBucket, TimeWindow};
