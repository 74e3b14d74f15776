//! Serde helpers for the API's timestamp encoding.
//!
//! The service writes UTC times without an offset and with up to six
//! fractional digits (`2019-02-12T10:49:53.123456`). RFC 3339 input is
//! accepted too. Times are always written back in the service's form.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn parse_wire_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, PARSE_FORMAT) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|time| time.with_timezone(&Utc))
}

pub fn format_wire_time(time: &DateTime<Utc>) -> String {
    time.naive_utc().format(WIRE_FORMAT).to_string()
}

pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_wire_time(time))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_wire_time(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

/// Same encoding for `Option<DateTime<Utc>>` fields.
pub mod option {
    use super::*;

    pub fn serialize<S>(time: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(time) => super::serialize(time, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_wire_time(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }
}
