//! Tolerant serde helpers for documents written by other clients
//!
//! 远端文档可能由旧版本客户端写入，字段类型不一定可靠：
//! - quantity 可能缺失、为字符串、为 0 或负数

use serde::{Deserialize, Deserializer};

/// Parse a user-entered quantity. Anything that is not a positive integer becomes 1.
pub fn parse_quantity(raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(q) if q >= 1 => q,
        _ => 1,
    }
}

/// Clamp an integer quantity into the valid range
pub fn clamp_quantity(q: i64) -> u32 {
    if q < 1 {
        1
    } else {
        u32::try_from(q).unwrap_or(u32::MAX)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Deserialize quantity: numbers, numeric strings, null and garbage all map to a value >= 1
pub fn quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawQuantity>::deserialize(deserializer)?;
    let q = match raw {
        Some(RawQuantity::Int(n)) => clamp_quantity(n),
        Some(RawQuantity::Float(f)) if f.is_finite() && f.fract() == 0.0 => clamp_quantity(f as i64),
        Some(RawQuantity::Text(s)) => parse_quantity(&s),
        Some(RawQuantity::Float(_)) | Some(RawQuantity::Other(_)) | None => {
            tracing::debug!("Malformed quantity in document, falling back to 1");
            1
        }
    };
    Ok(q)
}

/// Deserialize a string that treats null as empty
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}

pub fn default_quantity() -> u32 {
    1
}
