use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de::IgnoredAny, Deserialize, Deserializer};

/// Identifies entities that expose a stable opaque identifier.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Other(IgnoredAny),
}

/// Deserializes an optional timestamp, mapping malformed values to `None`
/// so a single bad record does not reject the whole payload.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawTimestamp::Text(text)) => parse_timestamp(&text),
        Some(RawTimestamp::Other(_)) | None => None,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Deserializes a monetary amount. Null, missing, or non-numeric values become
/// `NaN`, which every aggregate treats as unusable.
pub(crate) fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawAmount::Number(value)) => value,
        Some(RawAmount::Text(text)) => text.trim().parse().unwrap_or(f64::NAN),
        Some(RawAmount::Other(_)) | None => f64::NAN,
    })
}

pub(crate) fn missing_amount() -> f64 {
    f64::NAN
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_supported_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 10, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-01-10T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-10T09:30:00-03:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-10T12:30:00.000"), Some(expected));
        assert_eq!(
            parse_timestamp("2025-01-10"),
            Some(Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2025-13-40"), None);
    }
}
