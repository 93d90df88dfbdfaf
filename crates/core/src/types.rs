//! Closed enumerations for flow records
//!
//! Wire names are SCREAMING_SNAKE_CASE and identical for serde and strum,
//! matching the codes the registry's consumers branch on.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::ids::PartyId;

/// Kind of party a flow is attached to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyType {
    Player,
    Club,
    Agent,
    Platform,
}

/// Kind of grey flow being referenced
///
/// These are references to value movements that happened outside the
/// settlement engine, never movements themselves.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowType {
    BuyinRef,
    CashoutRef,
    RakeRef,
    AdjustRef,
}

/// Direction of the referenced movement relative to the party
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowDirection {
    In,
    Out,
}

/// Lifecycle status of a flow record
///
/// `Pending -> Confirmed` and `Pending -> Void` are the only legal
/// transitions; both targets are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStatus {
    Pending,
    Confirmed,
    Void,
}

impl FlowType {
    /// Check flow-type/party-type compatibility.
    ///
    /// Rake references may never target a player; everything else is open.
    pub fn permits_party(&self, party_type: PartyType) -> bool {
        match self {
            FlowType::RakeRef => party_type != PartyType::Player,
            _ => true,
        }
    }

    /// Check flow-type/direction compatibility.
    ///
    /// Buy-ins and rake flow in, cash-outs flow out, adjustments go either way.
    pub fn permits_direction(&self, direction: FlowDirection) -> bool {
        match self {
            FlowType::BuyinRef | FlowType::RakeRef => direction == FlowDirection::In,
            FlowType::CashoutRef => direction == FlowDirection::Out,
            FlowType::AdjustRef => true,
        }
    }
}

impl FlowStatus {
    /// Check whether this status accepts no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowStatus::Confirmed | FlowStatus::Void)
    }

    /// Check whether `target` is a legal successor of this status
    pub fn can_transition_to(&self, target: FlowStatus) -> bool {
        matches!(self, FlowStatus::Pending)
            && matches!(target, FlowStatus::Confirmed | FlowStatus::Void)
    }
}

/// A party reference carried by flow records and attribution entries
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyRef {
    pub party_id: PartyId,
    pub party_type: PartyType,
}

impl PartyRef {
    pub fn new(party_id: impl Into<PartyId>, party_type: PartyType) -> Self {
        Self {
            party_id: party_id.into(),
            party_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&FlowType::BuyinRef).unwrap(),
            "\"BUYIN_REF\""
        );
        assert_eq!(
            serde_json::to_string(&PartyType::Platform).unwrap(),
            "\"PLATFORM\""
        );
        assert_eq!(serde_json::to_string(&FlowStatus::Void).unwrap(), "\"VOID\"");
        assert_eq!(FlowType::CashoutRef.to_string(), "CASHOUT_REF");
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!(FlowType::from_str("RAKE_REF").unwrap(), FlowType::RakeRef);
        assert_eq!(PartyType::from_str("AGENT").unwrap(), PartyType::Agent);
        assert!(FlowType::from_str("RAKE").is_err());
    }

    #[test]
    fn test_rake_never_targets_player() {
        assert!(!FlowType::RakeRef.permits_party(PartyType::Player));
        assert!(FlowType::RakeRef.permits_party(PartyType::Club));
        assert!(FlowType::RakeRef.permits_party(PartyType::Agent));
        assert!(FlowType::RakeRef.permits_party(PartyType::Platform));
        assert!(FlowType::BuyinRef.permits_party(PartyType::Player));
    }

    #[test]
    fn test_direction_compatibility() {
        assert!(FlowType::BuyinRef.permits_direction(FlowDirection::In));
        assert!(!FlowType::BuyinRef.permits_direction(FlowDirection::Out));
        assert!(FlowType::CashoutRef.permits_direction(FlowDirection::Out));
        assert!(!FlowType::CashoutRef.permits_direction(FlowDirection::In));
        assert!(FlowType::RakeRef.permits_direction(FlowDirection::In));
        assert!(!FlowType::RakeRef.permits_direction(FlowDirection::Out));
        assert!(FlowType::AdjustRef.permits_direction(FlowDirection::In));
        assert!(FlowType::AdjustRef.permits_direction(FlowDirection::Out));
    }

    #[test]
    fn test_status_machine_closure() {
        assert!(FlowStatus::Pending.can_transition_to(FlowStatus::Confirmed));
        assert!(FlowStatus::Pending.can_transition_to(FlowStatus::Void));
        assert!(!FlowStatus::Pending.can_transition_to(FlowStatus::Pending));
        assert!(!FlowStatus::Confirmed.can_transition_to(FlowStatus::Void));
        assert!(!FlowStatus::Void.can_transition_to(FlowStatus::Confirmed));
        assert!(FlowStatus::Confirmed.is_terminal());
        assert!(FlowStatus::Void.is_terminal());
        assert!(!FlowStatus::Pending.is_terminal());
    }
}
