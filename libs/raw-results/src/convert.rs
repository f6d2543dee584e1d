//! Per-tag converters.
//!
//! Every converter has the [`Deserializer`](crate::Deserializer) signature so
//! it can sit in a dispatch table. They receive the raw wire value and the
//! conversion [`Context`] (field path, `for_model`, recursion).

use std::borrow::Cow;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;

use crate::deserializer::Context;
use crate::error::DeserializeError;
use crate::tag::TypeTag;
use crate::value::{Base64, Value};
use crate::wire::kind_of;

/// Date prefixed to `time` literals, which carry no date of their own.
pub const TIME_EPOCH_DATE: &str = "1970-01-01";

pub(crate) fn deserialize_bigint(ctx: &Context<'_>, value: &serde_json::Value) -> Result<Value, DeserializeError> {
    let parsed = match value {
        serde_json::Value::String(s) => BigInt::from_str(s.trim()).map_err(|e| e.to_string()),
        serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Ok(BigInt::from(i)),
            (None, Some(u)) => Ok(BigInt::from(u)),
            _ => Err("not an integer".to_string()),
        },
        other => Err(format!("expected a string, got {}", kind_of(other))),
    };
    parsed
        .map(Value::BigInt)
        .map_err(|reason| ctx.conversion(TypeTag::BigInt, value, reason))
}

pub(crate) fn deserialize_decimal(ctx: &Context<'_>, value: &serde_json::Value) -> Result<Value, DeserializeError> {
    let parsed = match value {
        serde_json::Value::String(s) => BigDecimal::from_str(s.trim()).map_err(|e| e.to_string()),
        serde_json::Value::Number(n) => BigDecimal::from_str(&n.to_string()).map_err(|e| e.to_string()),
        other => Err(format!("expected a string, got {}", kind_of(other))),
    };
    parsed
        .map(Value::Decimal)
        .map_err(|reason| ctx.conversion(TypeTag::Decimal, value, reason))
}

pub(crate) fn deserialize_datetime(ctx: &Context<'_>, value: &serde_json::Value) -> Result<Value, DeserializeError> {
    let literal = expect_str(ctx, TypeTag::DateTime, value)?;
    match parse_iso(literal) {
        Ok(IsoTimestamp::Aware(dt)) => Ok(Value::DateTime(dt)),
        Ok(IsoTimestamp::Naive(dt)) => Ok(Value::NaiveDateTime(dt)),
        Err(reason) => Err(ctx.conversion(TypeTag::DateTime, value, reason)),
    }
}

/// The wire format has no pure date type: dates arrive as timestamps and are
/// normalized to a naive timestamp, keeping the wall-clock fields. Backends
/// that already omit the offset pass through unchanged.
pub(crate) fn deserialize_date(ctx: &Context<'_>, value: &serde_json::Value) -> Result<Value, DeserializeError> {
    let literal = expect_str(ctx, TypeTag::Date, value)?;
    parse_iso(literal)
        .map(|ts| Value::NaiveDateTime(ts.naive_local()))
        .map_err(|reason| ctx.conversion(TypeTag::Date, value, reason))
}

pub(crate) fn deserialize_time(ctx: &Context<'_>, value: &serde_json::Value) -> Result<Value, DeserializeError> {
    let literal = expect_str(ctx, TypeTag::Time, value)?;
    let full = format!("{TIME_EPOCH_DATE}T{literal}Z");
    match parse_iso(&full) {
        Ok(IsoTimestamp::Aware(dt)) => Ok(Value::DateTime(dt)),
        Ok(IsoTimestamp::Naive(_)) => Err(ctx.conversion(TypeTag::Time, value, "missing UTC marker")),
        Err(reason) => Err(ctx.conversion(TypeTag::Time, value, reason)),
    }
}

pub(crate) fn deserialize_bytes(ctx: &Context<'_>, value: &serde_json::Value) -> Result<Value, DeserializeError> {
    let encoded = expect_str(ctx, TypeTag::Bytes, value)?;
    Base64::from_b64(encoded)
        .map(Value::Bytes)
        .map_err(|e| ctx.conversion(TypeTag::Bytes, value, e.to_string()))
}

pub(crate) fn deserialize_array(ctx: &Context<'_>, value: &serde_json::Value) -> Result<Value, DeserializeError> {
    let entries = value.as_array().ok_or_else(|| {
        DeserializeError::malformed(ctx.field(), format!("array tag with {} value", kind_of(value)))
    })?;

    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        items.push(ctx.element(index)?.deserialize(entry)?);
    }
    Ok(Value::Array(items))
}

/// JSON columns may or may not already be decoded by the database.
///
/// For model output a structured value is re-encoded to a JSON string: model
/// validators expect JSON fields as text. Plain output leaves it as is.
pub(crate) fn deserialize_json(ctx: &Context<'_>, value: &serde_json::Value) -> Result<Value, DeserializeError> {
    if ctx.for_model() && !value.is_string() {
        let encoded = serde_json::to_string(value)
            .map_err(|e| ctx.conversion(TypeTag::Json, value, e.to_string()))?;
        return Ok(Value::Json(serde_json::Value::String(encoded)));
    }
    Ok(Value::Json(value.clone()))
}

fn expect_str<'v>(ctx: &Context<'_>, tag: TypeTag, value: &'v serde_json::Value) -> Result<&'v str, DeserializeError> {
    value
        .as_str()
        .ok_or_else(|| ctx.conversion(tag, value, format!("expected a string, got {}", kind_of(value))))
}

// ════════════════════════════════════════════════════════════════
//  ISO-8601
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsoTimestamp {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl IsoTimestamp {
    /// Wall-clock fields with any offset dropped.
    pub fn naive_local(self) -> NaiveDateTime {
        match self {
            IsoTimestamp::Aware(dt) => dt.naive_local(),
            IsoTimestamp::Naive(dt) => dt,
        }
    }
}

const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp the way `fromisoformat`-style parsers do:
/// `T` or space separator, `HH`, `HH:MM` or `HH:MM:SS` with optional fraction,
/// optional `Z`/`±HH:MM`/`±HHMM`/`±HH` offset, or a bare date (midnight).
///
/// Decimal-style specials (`NaN`, `Infinity`) have no timestamp or
/// `BigDecimal` form and are conversion errors.
pub fn parse_iso(literal: &str) -> Result<IsoTimestamp, String> {
    let trimmed = literal.trim();
    let normalized;
    let s = match trimmed.strip_suffix(['Z', 'z']) {
        Some(rest) => {
            normalized = format!("{rest}+00:00");
            normalized.as_str()
        }
        None => trimmed,
    };
    let padded = pad_hour_only(s);
    let s = padded.as_ref();

    for fmt in AWARE_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(IsoTimestamp::Aware(dt));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(IsoTimestamp::Naive(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(IsoTimestamp::Naive(date.and_time(NaiveTime::MIN)));
    }

    Err(format!("invalid ISO-8601 timestamp '{literal}'"))
}

/// `YYYY-MM-DDTHH[±offset]` → `YYYY-MM-DDTHH:00[±offset]`.
fn pad_hour_only(s: &str) -> Cow<'_, str> {
    let b = s.as_bytes();
    let hour_only = b.len() >= 13
        && matches!(b[10], b'T' | b' ')
        && b[11].is_ascii_digit()
        && b[12].is_ascii_digit()
        && (b.len() == 13 || matches!(b[13], b'+' | b'-'));
    if hour_only {
        Cow::Owned(format!("{}:00{}", &s[..13], &s[13..]))
    } else {
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, s).unwrap()
    }

    #[test]
    fn iso_with_offset_is_aware() {
        let ts = parse_iso("2023-01-01T00:00:00+02:00").unwrap();
        let IsoTimestamp::Aware(dt) = ts else { panic!("expected aware, got {ts:?}") };
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(dt.naive_local(), naive(2023, 1, 1, 0, 0, 0));
    }

    #[test]
    fn iso_accepts_zulu_compact_offsets_and_space() {
        for literal in [
            "2023-06-15T10:20:30Z",
            "2023-06-15T10:20:30.123Z",
            "2023-06-15 10:20:30+00:00",
            "2023-06-15T10:20:30+0000",
            "2023-06-15T10:20:30.000000+00:00",
        ] {
            let ts = parse_iso(literal).unwrap_or_else(|e| panic!("{literal}: {e}"));
            let IsoTimestamp::Aware(dt) = ts else { panic!("{literal}: expected aware") };
            assert_eq!(dt.offset().local_minus_utc(), 0, "{literal}");
            assert_eq!((dt.hour(), dt.minute(), dt.second()), (10, 20, 30), "{literal}");
        }
    }

    #[test]
    fn iso_without_offset_is_naive() {
        assert_eq!(
            parse_iso("2023-06-15T10:20:30").unwrap(),
            IsoTimestamp::Naive(naive(2023, 6, 15, 10, 20, 30))
        );
        assert_eq!(
            parse_iso("2023-06-15 10:20").unwrap(),
            IsoTimestamp::Naive(naive(2023, 6, 15, 10, 20, 0))
        );
        assert_eq!(
            parse_iso("2023-06-15").unwrap(),
            IsoTimestamp::Naive(naive(2023, 6, 15, 0, 0, 0))
        );
    }

    #[test]
    fn iso_accepts_hour_only_offsets_and_times() {
        let ts = parse_iso("2023-01-01T10:00:00+02").unwrap();
        let IsoTimestamp::Aware(dt) = ts else { panic!("expected aware, got {ts:?}") };
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(dt.naive_local(), naive(2023, 1, 1, 10, 0, 0));

        assert_eq!(
            parse_iso("2023-01-01T10").unwrap(),
            IsoTimestamp::Naive(naive(2023, 1, 1, 10, 0, 0))
        );

        let ts = parse_iso("2023-01-01 07-05").unwrap();
        let IsoTimestamp::Aware(dt) = ts else { panic!("expected aware, got {ts:?}") };
        assert_eq!(dt.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(dt.hour(), 7);

        let ts = parse_iso("2023-01-01T10Z").unwrap();
        assert!(matches!(ts, IsoTimestamp::Aware(dt) if dt.offset().local_minus_utc() == 0));
    }

    #[test]
    fn hour_padding_leaves_other_forms_alone() {
        assert_eq!(pad_hour_only("2023-01-01T10"), "2023-01-01T10:00");
        assert_eq!(pad_hour_only("2023-01-01T10+02"), "2023-01-01T10:00+02");
        assert_eq!(pad_hour_only("2023-01-01T10:30"), "2023-01-01T10:30");
        assert_eq!(pad_hour_only("2023-01-01"), "2023-01-01");
        assert_eq!(pad_hour_only("2023-01-01T1"), "2023-01-01T1");
    }

    #[test]
    fn iso_keeps_fraction() {
        let ts = parse_iso("2023-06-15T10:20:30.5").unwrap().naive_local();
        assert_eq!(ts.nanosecond(), 500_000_000);
        assert_eq!(ts.day(), 15);
    }

    #[test]
    fn iso_rejects_garbage() {
        for literal in ["", "yesterday", "2023-13-01", "2023-01-01T25:00:00", "1970-01-01T$10:00:00Z"] {
            assert!(parse_iso(literal).is_err(), "{literal}");
        }
    }

    #[test]
    fn naive_local_drops_offset_only() {
        let aware = parse_iso("2023-01-01T23:30:00-05:00").unwrap();
        assert_eq!(aware.naive_local(), naive(2023, 1, 1, 23, 30, 0));
    }
}
