//! GreyLedger Store - append-only JSONL persistence for session logs
//!
//! One `<session_id>.jsonl` file per session, one serialized `FlowRecord`
//! per line in append order. The writer only ever appends; the reader
//! re-verifies hash chains straight from disk so tampering with a
//! persisted log is detectable without the in-memory registry.
//!
//! # Key Types
//! - `SessionLogStore`: durable append-only writer
//! - `SessionLogReader`: read-back and chain re-verification

pub mod error;
pub mod reader;
pub mod store;

pub use error::StoreError;
pub use reader::SessionLogReader;
pub use store::SessionLogStore;
