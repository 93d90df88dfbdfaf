//! Flow input validation
//!
//! Rules run in a fixed order and the first failure is returned, so a
//! caller always sees the same error for the same bad input:
//! required fields, amount sign, timestamp, description terms, then the
//! flow-type compatibility tables.

use crate::error::LedgerError;
use crate::record::FlowInput;

/// Validation result with detailed error
pub type ValidationResult = Result<(), LedgerError>;

/// Validation configuration
///
/// The forbidden-term list keeps grey flow descriptions from claiming to
/// be real money movements. Matching is case-insensitive substring.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub forbidden_terms: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            forbidden_terms: ["balance", "settlement", "transfer", "payout"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ValidationConfig {
    /// Find the first forbidden term contained in `text`, if any
    pub fn forbidden_term_in(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.forbidden_terms
            .iter()
            .find(|term| lowered.contains(&term.to_lowercase()))
            .map(|term| term.as_str())
    }
}

/// Validate a flow input against all construction rules, in order
pub fn validate_flow_input(input: &FlowInput, config: &ValidationConfig) -> ValidationResult {
    validate_required_fields(input)?;
    validate_amount(input)?;
    validate_timestamp(input)?;
    validate_description(input, config)?;
    validate_party_compatibility(input)?;
    validate_direction_compatibility(input)?;
    Ok(())
}

fn validate_required_fields(input: &FlowInput) -> ValidationResult {
    if input.flow_id.is_empty() {
        return Err(LedgerError::MissingField { field: "flow_id" });
    }
    if input.session_id.is_empty() {
        return Err(LedgerError::MissingField { field: "session_id" });
    }
    if input.party.party_id.is_empty() {
        return Err(LedgerError::MissingField { field: "party_id" });
    }
    Ok(())
}

fn validate_amount(input: &FlowInput) -> ValidationResult {
    if input.amount < 0 {
        return Err(LedgerError::NegativeAmount {
            amount: input.amount,
        });
    }
    Ok(())
}

fn validate_timestamp(input: &FlowInput) -> ValidationResult {
    if input.injected_timestamp <= 0 {
        return Err(LedgerError::InvalidTimestamp {
            timestamp: input.injected_timestamp,
        });
    }
    Ok(())
}

fn validate_description(input: &FlowInput, config: &ValidationConfig) -> ValidationResult {
    if let Some(ref description) = input.description {
        if let Some(term) = config.forbidden_term_in(description) {
            return Err(LedgerError::ForbiddenDescription {
                term: term.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_party_compatibility(input: &FlowInput) -> ValidationResult {
    if !input.flow_type.permits_party(input.party.party_type) {
        return Err(LedgerError::InvalidPartyType {
            flow_type: input.flow_type,
            party_type: input.party.party_type,
        });
    }
    Ok(())
}

fn validate_direction_compatibility(input: &FlowInput) -> ValidationResult {
    if !input.flow_type.permits_direction(input.direction) {
        return Err(LedgerError::InvalidDirection {
            flow_type: input.flow_type,
            direction: input.direction,
        });
    }
    Ok(())
}
