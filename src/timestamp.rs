use serde_json::Value;
use thiserror::Error;

/// Multipliers for the colon-separated fields, read right to left:
/// milliseconds, seconds, minutes, hours, days.
pub const CONVERSION_FACTORS: [i64; 5] = [1, 1_000, 60_000, 3_600_000, 86_400_000];

pub const FORMAT_HINT: &str = "[[[[%d:]%h:]%m:]%s:]%ms | int in ms";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp '{input}' has an invalid segment '{segment}' (format: {})", FORMAT_HINT)]
    InvalidSegment { input: String, segment: String },

    #[error("timestamp '{0}' is too large")]
    Overflow(String),

    #[error("timestamp of {0} ms does not fit into a chapter time")]
    OutOfRange(i64),
}

/// Convert a JSON timestamp to milliseconds.
///
/// Integers are taken as milliseconds and returned as their absolute value.
/// Strings are colon-separated clock values: a single field is milliseconds,
/// `m:s`, `h:m:s` and `d:h:m:s` end in seconds, and `d:h:m:s:ms` carries
/// milliseconds; fields past the fifth from the right are ignored. Values of
/// any other type are reported and count as 0.
pub fn convert_to_ms(timestamp: &Value) -> Result<i64, TimestampError> {
    match timestamp {
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            if let Some(i) = n.as_i64() {
                i.checked_abs()
                    .ok_or_else(|| TimestampError::Overflow(n.to_string()))
            } else {
                n.as_u64()
                    .and_then(|u| i64::try_from(u).ok())
                    .ok_or_else(|| TimestampError::Overflow(n.to_string()))
            }
        }
        Value::String(s) => parse_clock(s),
        other => {
            tracing::warn!(
                "The timestamp of type {} wasn't recognized. \
                 Please use a string or integer to describe the timestamp.",
                json_type_name(other)
            );
            tracing::warn!("format: {}", FORMAT_HINT);
            Ok(0)
        }
    }
}

fn parse_clock(input: &str) -> Result<i64, TimestampError> {
    let segments: Vec<&str> = input.split(':').collect();
    // A lone field is milliseconds, two to four fields end in seconds
    // (`m:s`, `h:m:s`, `d:h:m:s`), five or more end in milliseconds.
    let all: &'static [i64] = &CONVERSION_FACTORS;
    let factors = match segments.len() {
        1 => &all[..1],
        2..=4 => &all[1..],
        _ => all,
    };
    segments
        .iter()
        .rev()
        .zip(factors)
        .try_fold(0i64, |total, (segment, factor)| {
            let amount: i64 = segment.trim().parse().map_err(|_| TimestampError::InvalidSegment {
                input: input.to_string(),
                segment: segment.to_string(),
            })?;
            amount
                .checked_mul(*factor)
                .and_then(|ms| total.checked_add(ms))
                .ok_or_else(|| TimestampError::Overflow(input.to_string()))
        })
}

/// Narrow a converted timestamp to the 32-bit millisecond field of a CHAP frame.
pub fn to_chapter_time(ms: i64) -> Result<u32, TimestampError> {
    u32::try_from(ms).map_err(|_| TimestampError::OutOfRange(ms))
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integers_are_absolute_ms() {
        assert_eq!(convert_to_ms(&json!(0)), Ok(0));
        assert_eq!(convert_to_ms(&json!(1500)), Ok(1500));
        assert_eq!(convert_to_ms(&json!(-5)), Ok(5));
    }

    #[test]
    fn test_clock_strings() {
        assert_eq!(convert_to_ms(&json!("500")), Ok(500));
        assert_eq!(convert_to_ms(&json!("1:30")), Ok(90_000));
        assert_eq!(convert_to_ms(&json!("1:00")), Ok(60_000));
        assert_eq!(convert_to_ms(&json!("1:0:0:0")), Ok(86_400_000));
        assert_eq!(convert_to_ms(&json!("2:00:00")), Ok(7_200_000));
        assert_eq!(
            convert_to_ms(&json!("1:2:3:4:5")),
            Ok(86_400_000 + 7_200_000 + 180_000 + 4_000 + 5)
        );
    }

    #[test]
    fn test_extra_leading_fields_are_ignored() {
        assert_eq!(convert_to_ms(&json!("9:0:0:0:0:7")), Ok(7));
    }

    #[test]
    fn test_string_sign_is_kept() {
        assert_eq!(convert_to_ms(&json!("-1:0")), Ok(-60_000));
    }

    #[test]
    fn test_other_types_count_as_zero() {
        assert_eq!(convert_to_ms(&json!(1.5)), Ok(0));
        assert_eq!(convert_to_ms(&json!(null)), Ok(0));
        assert_eq!(convert_to_ms(&json!([1, 2])), Ok(0));
    }

    #[test]
    fn test_malformed_segments() {
        assert!(matches!(
            convert_to_ms(&json!("::30")),
            Err(TimestampError::InvalidSegment { .. })
        ));
        assert!(matches!(
            convert_to_ms(&json!("")),
            Err(TimestampError::InvalidSegment { .. })
        ));
        assert!(matches!(
            convert_to_ms(&json!("1:ab")),
            Err(TimestampError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(
            convert_to_ms(&json!("999999999999999:0:0:0:0")),
            Err(TimestampError::Overflow(_))
        ));
    }

    #[test]
    fn test_to_chapter_time() {
        assert_eq!(to_chapter_time(120_000), Ok(120_000));
        assert_eq!(to_chapter_time(-1), Err(TimestampError::OutOfRange(-1)));
        assert!(to_chapter_time(i64::from(u32::MAX) + 1).is_err());
    }
}
