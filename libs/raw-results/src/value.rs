use std::fmt;

use base64::Engine;
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Native value of one deserialized field.
///
/// Strategy by tag:
/// - pass-through tags (`int`, `string`, `uuid`, ...) and `json`: kept as `Json`
/// - `bigint`, `decimal`: arbitrary precision, no float rounding
/// - `datetime`: `DateTime` when the literal carries an offset, else `NaiveDateTime`
/// - `date`: always `NaiveDateTime` (offset dropped)
/// - `time`: `DateTime` on 1970-01-01 at UTC
/// - `bytes`: `Bytes`
/// - `array`: recursive
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Json(serde_json::Value),
    BigInt(BigInt),
    Decimal(BigDecimal),
    DateTime(DateTime<FixedOffset>),
    NaiveDateTime(NaiveDateTime),
    Bytes(Base64),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(serde_json::Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Json(v) => v.as_i64(),
            Value::BigInt(n) => i64::try_from(n).ok(),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_naive_datetime(&self) -> Option<&NaiveDateTime> {
        match self {
            Value::NaiveDateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Base64> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Json(serde_json::Value::Null))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

/// JSON rendering used when a record is handed to a serde model.
///
/// `BigInt` becomes a number when it fits `i64` and a string otherwise,
/// `Decimal` a string, timestamps ISO-8601 strings, `Bytes` base64.
impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Json(v) => v.serialize(serializer),
            Value::BigInt(n) => match i64::try_from(n) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => serializer.collect_str(n),
            },
            Value::Decimal(d) => serializer.collect_str(d),
            Value::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            Value::NaiveDateTime(dt) => serializer.collect_str(&dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Bytes(b) => b.serialize(serializer),
            Value::Array(items) => serializer.collect_seq(items),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Base64
// ════════════════════════════════════════════════════════════════

/// Byte blob received as base64 that serializes back to base64.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Base64(Vec<u8>);

impl Base64 {
    /// Decode a base64 (standard alphabet, padded) payload.
    pub fn from_b64(encoded: &str) -> Result<Self, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map(Self)
    }

    /// Wrap raw bytes.
    pub fn encode(data: impl Into<Vec<u8>>) -> Self {
        Self(data.into())
    }

    pub fn to_b64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Base64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Base64({:?})", self.to_b64())
    }
}

impl fmt::Display for Base64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_b64())
    }
}

impl Serialize for Base64 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_b64())
    }
}

impl<'de> Deserialize<'de> for Base64 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Base64::from_b64(&encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    #[test]
    fn base64_round_trip() {
        let b = Base64::from_b64("aGVsbG8=").unwrap();
        assert_eq!(b.as_bytes(), b"hello");
        assert_eq!(b.to_b64(), "aGVsbG8=");
        assert_eq!(serde_json::to_value(&b).unwrap(), json!("aGVsbG8="));
        let back: Base64 = serde_json::from_value(json!("aGVsbG8=")).unwrap();
        assert_eq!(back, b);
        assert_eq!(format!("{b:?}"), r#"Base64("aGVsbG8=")"#);
    }

    #[test]
    fn base64_rejects_garbage() {
        assert!(Base64::from_b64("not base64!").is_err());
        assert!(serde_json::from_value::<Base64>(json!("%%")).is_err());
    }

    #[test]
    fn serializes_to_model_friendly_json() {
        let big = BigInt::from_str("123456789012345678901234567890").unwrap();
        let values = vec![
            Value::BigInt(BigInt::from(42)),
            Value::BigInt(big),
            Value::Decimal(BigDecimal::from_str("10.005").unwrap()),
            Value::DateTime(DateTime::parse_from_rfc3339("2023-01-01T00:00:00+02:00").unwrap()),
            Value::NaiveDateTime(
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_milli_opt(8, 30, 0, 250).unwrap(),
            ),
            Value::Bytes(Base64::encode(b"hi".to_vec())),
            Value::Array(vec![Value::Json(json!(1)), Value::Json(json!(null))]),
        ];
        assert_eq!(
            serde_json::to_value(&values).unwrap(),
            json!([
                42,
                "123456789012345678901234567890",
                "10.005",
                "2023-01-01T00:00:00+02:00",
                "2023-01-01T08:30:00.250",
                "aGk=",
                [1, null]
            ])
        );
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::BigInt(BigInt::from(-5)).as_i64(), Some(-5));
        assert_eq!(Value::Json(json!("x")).as_str(), Some("x"));
        assert!(Value::Json(json!(null)).is_null());
        assert!(Value::Json(json!(1)).as_decimal().is_none());
    }
}
