use chrono::{NaiveDateTime, TimeZone, Utc};

pub type Time = chrono::DateTime<Utc>;

/// Format the backend uses for its `LocalDateTime` fields
pub const BACKEND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses any of the timestamp formats the backend has been seen to send:
/// RFC 3339, `yyyy-MM-dd HH:mm:ss` and ISO without an offset (taken as UTC)
pub fn parse_time(s: &str) -> Option<Time> {
    if let Ok(t) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, BACKEND_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|n| Utc.from_utc_datetime(&n))
}

/// serde adapter for optional backend timestamps, also accepting epoch milliseconds
pub mod opt_time {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::{parse_time, Time, BACKEND_FORMAT};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(i64),
    }

    pub fn serialize<S: Serializer>(t: &Option<Time>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_some(&t.format(BACKEND_FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Time>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(None),
            Some(Raw::Text(s)) => parse_time(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp {s:?}"))),
            Some(Raw::Millis(ms)) => chrono::TimeZone::timestamp_millis_opt(&chrono::Utc, ms)
                .single()
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range {ms}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(parse_time("2024-03-09 14:05:00"), Some(expected));
        assert_eq!(parse_time("2024-03-09T14:05:00"), Some(expected));
        assert_eq!(parse_time("2024-03-09T14:05:00.000"), Some(expected));
        assert_eq!(parse_time("2024-03-09T15:05:00+01:00"), Some(expected));
        assert_eq!(parse_time("yesterday"), None);
    }

    #[derive(serde::Deserialize)]
    struct Holder {
        #[serde(default, with = "opt_time")]
        at: Option<Time>,
    }

    #[test]
    fn opt_time_accepts_millis_and_missing() {
        let h: Holder = serde_json::from_str(r#"{"at": 0}"#).unwrap();
        assert_eq!(h.at, Some(Utc.timestamp_millis_opt(0).unwrap()));
        let h: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(h.at, None);
        let h: Holder = serde_json::from_str(r#"{"at": null}"#).unwrap();
        assert_eq!(h.at, None);
        assert!(serde_json::from_str::<Holder>(r#"{"at": "soon"}"#).is_err());
    }
}
