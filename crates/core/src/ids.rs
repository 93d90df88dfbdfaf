//! Identifier newtypes for ledger and audit entities
//!
//! All identifiers are caller-supplied opaque strings. The core never
//! generates an id; uniqueness is the caller's contract and duplicate
//! detection is the registry's.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from a caller-supplied string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Check whether the identifier is empty (invalid)
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id! {
    /// Globally unique identifier of a grey flow.
    ///
    /// Doubles as the idempotency key: the registry rejects a second
    /// append carrying an already-indexed `FlowId`.
    FlowId
}

string_id! {
    /// Identifier of a session grouping flow records into one hash chain
    SessionId
}

string_id! {
    /// Identifier of a party (player, club, agent or platform)
    PartyId
}

string_id! {
    /// Identifier of an externally produced recharge record
    RechargeId
}

string_id! {
    /// Identifier of a settlement/attribution period
    PeriodId
}
