//! Timestamp serde helpers.
//!
//! Timestamps are written as RFC3339 with millisecond precision and a `Z`
//! suffix, the same shape browsers produce with `Date.toISOString()`.
//! Reading accepts either that string form or epoch milliseconds, so
//! snapshots exported by older dashboards still load.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
}

impl RawTimestamp {
    fn into_datetime<E: serde::de::Error>(self) -> Result<DateTime<Utc>, E> {
        match self {
            Self::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| E::custom(format!("Invalid RFC3339 timestamp '{s}': {e}"))),
            Self::Millis(ms) => DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| E::custom(format!("Timestamp out of range: {ms}"))),
        }
    }
}

fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(dt))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    RawTimestamp::deserialize(deserializer)?.into_datetime()
}

/// Same encoding for `Option<DateTime<Utc>>`; `None` maps to `null`.
pub mod option {
    use super::{format, DateTime, Deserialize, Deserializer, RawTimestamp, Serializer, Utc};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_some(&format(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<RawTimestamp>::deserialize(deserializer)?
            .map(RawTimestamp::into_datetime)
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Stamped {
        #[serde(with = "crate::utils::datetime")]
        at: DateTime<Utc>,
        #[serde(default, with = "crate::utils::datetime::option")]
        maybe: Option<DateTime<Utc>>,
    }

    #[test]
    fn writes_millisecond_utc_strings() {
        let at = Utc.with_ymd_and_hms(2024, 6, 20, 11, 0, 0).unwrap();
        let json = serde_json::to_string(&Stamped { at, maybe: None }).unwrap();
        assert_eq!(json, r#"{"at":"2024-06-20T11:00:00.000Z","maybe":null}"#);
    }

    #[test]
    fn reads_epoch_millis() {
        let parsed: Stamped =
            serde_json::from_str(r#"{"at":1718881200000,"maybe":"2024-06-20T11:30:00Z"}"#)
                .unwrap();
        assert_eq!(parsed.at, Utc.with_ymd_and_hms(2024, 6, 20, 11, 0, 0).unwrap());
        assert_eq!(
            parsed.maybe,
            Some(Utc.with_ymd_and_hms(2024, 6, 20, 11, 30, 0).unwrap())
        );
    }

    #[test]
    fn missing_optional_is_none() {
        let parsed: Stamped = serde_json::from_str(r#"{"at":"2024-06-20T11:00:00Z"}"#).unwrap();
        assert!(parsed.maybe.is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Stamped>(r#"{"at":"yesterday"}"#).is_err());
    }
}
