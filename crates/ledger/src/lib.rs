//! GreyLedger Flow Ledger - append-only, hash-chained flow registry
//!
//! This is the HEART of GreyLedger. Every grey flow reference enters the
//! system through this crate and nothing here ever deletes or edits a
//! record in place.
//!
//! # Key Types
//! - `FlowRecord`: Atomic, immutable, hash-chained unit of the ledger
//! - `FlowInput`: Caller-supplied fields for a new flow reference
//! - `FlowRegistry`: Append-only store owning all sessions and records
//! - `Session`: Per-session chain state (sequence + running checksum)

pub mod error;
pub mod integrity;
pub mod record;
pub mod registry;
pub mod session;
pub mod validation;

pub use error::LedgerError;
pub use integrity::{verify_chain_integrity, verify_flow_record_checksum, IntegrityIssue, IntegrityIssueKind};
pub use record::{create_flow_record, transition_flow_status, FlowInput, FlowRecord};
pub use registry::{AppendReceipt, FlowRegistry};
pub use session::Session;
pub use validation::{validate_flow_input, ValidationConfig};
