//! # swissdorm-shared
//!
//! Domain aggregates shared by the local cache and the client layer:
//! profiles, reviews, rental listings and the photos attached to them.

pub mod error;
pub mod models;
pub mod types;

pub use error::DomainError;
pub use models::*;
pub use types::{Language, ListingStatus, Location, RoomType};
