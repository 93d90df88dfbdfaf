//! GreyLedger Core - Domain types
//!
//! This crate contains the fundamental types used across GreyLedger:
//! - Identifier newtypes: `FlowId`, `SessionId`, `PartyId`, `RechargeId`, `PeriodId`
//! - Closed enums: `PartyType`, `FlowType`, `FlowDirection`, `FlowStatus`
//! - `Amount`: Non-negative integer wrapper for flow amounts
//! - Checksum toolkit: canonical JSON serialization + FNV-1a 64 hashing

pub mod amount;
pub mod checksum;
pub mod ids;
pub mod types;

pub use amount::{Amount, AmountError};
pub use checksum::{canonical_json, checksum_of, fnv1a64, ChecksumError, GENESIS_HASH};
pub use ids::{FlowId, PartyId, PeriodId, RechargeId, SessionId};
pub use types::{FlowDirection, FlowStatus, FlowType, PartyRef, PartyType};
