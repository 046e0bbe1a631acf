//! Column converters between rich domain values and flat SQLite scalars.
//!
//! Every converter is total: `None` maps to `None`, and malformed stored
//! values decode to `None` (or an empty list) instead of failing the read.

/// Instants stored as nanoseconds since the Unix epoch.
pub mod timestamp {
    use chrono::{DateTime, Utc};

    const NANOS_PER_SEC: i64 = 1_000_000_000;

    /// Instants outside 1677-09-21..2262-04-11 cannot be represented and
    /// encode to `None`.  Records refuse such instants when built from a
    /// domain value, so `None` here only ever means "no value".
    pub fn encode(value: Option<&DateTime<Utc>>) -> Option<i64> {
        let ts = value?;
        ts.timestamp()
            .checked_mul(NANOS_PER_SEC)?
            .checked_add(i64::from(ts.timestamp_subsec_nanos()))
    }

    pub fn decode(value: Option<i64>) -> Option<DateTime<Utc>> {
        let nanos = value?;
        let secs = nanos.div_euclid(NANOS_PER_SEC);
        let subsec = nanos.rem_euclid(NANOS_PER_SEC) as u32;
        DateTime::from_timestamp(secs, subsec)
    }
}

/// Locations stored as `name|latitude|longitude`.
pub mod location {
    use swissdorm_shared::Location;

    const SEPARATOR: char = '|';

    /// A name that itself contains `|` produces a string that decodes to
    /// `None`.
    pub fn encode(value: Option<&Location>) -> Option<String> {
        value.map(|loc| {
            format!(
                "{}{SEPARATOR}{}{SEPARATOR}{}",
                loc.name, loc.latitude, loc.longitude
            )
        })
    }

    pub fn decode(value: Option<&str>) -> Option<Location> {
        let raw = value?;
        if raw.is_empty() {
            return None;
        }

        let parts: Vec<&str> = raw.split(SEPARATOR).collect();
        let [name, lat, lon] = parts.as_slice() else {
            return None;
        };

        let latitude = lat.parse::<f64>().ok().filter(|v| v.is_finite())?;
        let longitude = lon.parse::<f64>().ok().filter(|v| v.is_finite())?;

        Some(Location {
            name: (*name).to_string(),
            latitude,
            longitude,
        })
    }
}

/// String lists stored comma-joined.
///
/// `[]` encodes to `""` and `None` to `None`; both decode to `[]`. Elements
/// must not contain commas.
pub mod string_list {
    const SEPARATOR: &str = ",";

    pub fn encode<S: AsRef<str>>(value: Option<&[S]>) -> Option<String> {
        value.map(|items| {
            items
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<&str>>()
                .join(SEPARATOR)
        })
    }

    pub fn decode(value: Option<&str>) -> Vec<String> {
        match value {
            None | Some("") => Vec::new(),
            Some(raw) => raw.split(SEPARATOR).map(str::to_string).collect(),
        }
    }
}
