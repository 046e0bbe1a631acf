//! # swissdorm-store
//!
//! Local SQLite cache mirroring the documents fetched from the remote store:
//! the signed-in user's profile, reviews and rental listings.
//!
//! The cache is write-through and read-oriented.  Domain aggregates are
//! flattened into row-shaped records by [`records`] using the column
//! [`converters`]; [`Database`] carries the synchronous CRUD helpers and
//! [`LocalCache`] exposes them asynchronously as per-table DAO handles.

pub mod cache;
pub mod converters;
pub mod database;
pub mod listings;
pub mod migrations;
pub mod profiles;
pub mod records;
pub mod reviews;

mod error;

pub use cache::{LocalCache, ProfileDao, RentalListingDao, ReviewDao};
pub use database::Database;
pub use error::{Result, StoreError};
pub use records::{ProfileRecord, RentalListingRecord, ReviewRecord};
