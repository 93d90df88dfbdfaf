//! Deterministic checksums over heterogeneous nested data
//!
//! Every checksum in GreyLedger is produced the same way: serialize the
//! value to a canonical string (object keys sorted, array order preserved,
//! strings quoted, numbers and booleans stringified), then hash that
//! string with FNV-1a 64. The hash is non-cryptographic on purpose;
//! determinism, not collision resistance, is the contract. Identical
//! input always yields an identical checksum, across runs and across
//! independently built stores.

use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;
use thiserror::Error;

/// Previous-hash constant for the first record of every session chain
pub const GENESIS_HASH: &str = "GENESIS";

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Errors that can occur while building a checksum
#[derive(Error, Debug)]
pub enum ChecksumError {
    #[error("Value could not be serialized for hashing: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// FNV-1a 64-bit over a string
pub fn fnv1a64(input: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in input.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Render a JSON value in canonical form.
///
/// Objects emit keys in sorted order, arrays preserve element order,
/// strings are quoted with JSON escaping, numbers and booleans are
/// rendered with their standard string form.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => {
            let _ = write!(out, "{}", b);
        }
        Value::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::String(s) => {
            // serde_json renders with JSON escaping
            let _ = write!(out, "{}", Value::String(s.clone()));
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}:", Value::String(key.clone()));
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
    }
}

/// Canonical string of any serializable value
pub fn canonicalize<T: Serialize>(value: &T) -> Result<String, ChecksumError> {
    let json = serde_json::to_value(value)?;
    Ok(canonical_json(&json))
}

/// Deterministic checksum of any serializable value.
///
/// Rendered as 16 lowercase hex digits.
pub fn checksum_of<T: Serialize>(value: &T) -> Result<String, ChecksumError> {
    let canonical = canonicalize(value)?;
    Ok(format!("{:016x}", fnv1a64(&canonical)))
}
