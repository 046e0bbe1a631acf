//! Flat, row-shaped projections of the domain aggregates.
//!
//! A record holds exactly what its table stores: enums as canonical names,
//! lists and locations as encoded strings, instants as integers. Conversion
//! to and from the domain side never fails; unreadable columns fall back to
//! documented defaults.

mod listing;
mod profile;
mod review;

pub use listing::RentalListingRecord;
pub use profile::ProfileRecord;
pub use review::ReviewRecord;

use chrono::{DateTime, Utc};

use crate::converters::timestamp;
use crate::error::{Result, StoreError};

/// Resolve a stored enum name, substituting `T::default()` for unknown or
/// missing values.
pub(crate) fn decode_enum<T: Default>(
    stored: Option<&str>,
    parse: fn(&str) -> Option<T>,
    column: &'static str,
) -> T {
    let Some(name) = stored else {
        return T::default();
    };
    parse(name).unwrap_or_else(|| {
        tracing::warn!(column, value = name, "unknown enum name in cache, using default");
        T::default()
    })
}

/// Instants that do not fit the column are refused instead of being stored
/// as something else.
pub(crate) fn encode_instant(value: &DateTime<Utc>, column: &'static str) -> Result<i64> {
    timestamp::encode(Some(value)).ok_or(StoreError::TimestampOutOfRange {
        column,
        value: *value,
    })
}

/// Stored instants that cannot be decoded (only possible for rows written
/// outside this crate) come back as the Unix epoch.
pub(crate) fn decode_instant(stored: Option<i64>, column: &'static str) -> DateTime<Utc> {
    timestamp::decode(stored).unwrap_or_else(|| {
        if stored.is_some() {
            tracing::warn!(column, "unreadable timestamp in cache, using epoch");
        }
        DateTime::<Utc>::default()
    })
}
