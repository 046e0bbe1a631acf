//! Domain aggregates as the remote document store and the UI layer see them.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can cross the
//! remote-store boundary and be handed to view-models unchanged.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::types::{Language, ListingStatus, Location, RoomType};

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A user's profile: personal information plus application settings.
///
/// Exactly one profile (the signed-in user's) is cached locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub owner_id: String,
    pub user_info: UserInfo,
    pub user_settings: UserSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub university_name: Option<String>,
    pub location: Option<Location>,
    pub residency_name: Option<String>,
    /// Filename of the profile picture in photo storage.
    pub profile_picture: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_size: Option<i32>,
    pub max_size: Option<i32>,
    /// Ordered, duplicate-free.
    pub preferred_room_types: Vec<RoomType>,
    pub bookmarked_listing_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub language: Language,
    pub is_public: bool,
    pub is_push_notified: bool,
    /// `None` follows the system theme.
    pub dark_mode: Option<bool>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            is_public: false,
            is_push_notified: true,
            dark_mode: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// A review of a residency, written by a (possibly anonymous) user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub uid: String,
    pub owner_id: String,
    pub posted_at: DateTime<Utc>,
    pub title: String,
    pub review_text: String,
    /// 0.0 to 5.0 by convention; not enforced.
    pub grade: f64,
    pub residency_name: String,
    pub room_type: RoomType,
    pub price_per_month: f64,
    pub area_in_m2: i32,
    /// Photo filenames, in display order.
    pub image_urls: Vec<String>,
    pub upvoted_by: BTreeSet<String>,
    pub downvoted_by: BTreeSet<String>,
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vote {
    Up,
    Down,
    None,
}

impl Review {
    /// Net score: upvotes minus downvotes.
    pub fn score(&self) -> i64 {
        self.upvoted_by.len() as i64 - self.downvoted_by.len() as i64
    }

    pub fn vote_of(&self, user_id: &str) -> Vote {
        if self.upvoted_by.contains(user_id) {
            Vote::Up
        } else if self.downvoted_by.contains(user_id) {
            Vote::Down
        } else {
            Vote::None
        }
    }

    /// Set `user_id`'s vote, replacing any previous one. A user is never in
    /// both voter sets.
    pub fn apply_vote(&mut self, user_id: &str, vote: Vote) {
        self.upvoted_by.remove(user_id);
        self.downvoted_by.remove(user_id);
        match vote {
            Vote::Up => {
                self.upvoted_by.insert(user_id.to_string());
            }
            Vote::Down => {
                self.downvoted_by.insert(user_id.to_string());
            }
            Vote::None => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Rental listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RentalListing {
    pub uid: String,
    pub owner_id: String,
    pub posted_at: DateTime<Utc>,
    pub residency_name: String,
    pub title: String,
    pub room_type: RoomType,
    pub price_per_month: f64,
    pub area_in_m2: i32,
    pub start_date: DateTime<Utc>,
    pub description: String,
    pub image_urls: Vec<String>,
    pub status: ListingStatus,
    pub location: Location,
}

// ---------------------------------------------------------------------------
// Photo
// ---------------------------------------------------------------------------

/// An image attached to a form: where its bytes can be read from (`uri`) and
/// the filename it is stored under in photo storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub uri: String,
    pub file_name: String,
}

impl Photo {
    /// Build a photo, rejecting filenames that could escape a storage
    /// directory.
    pub fn new(uri: impl Into<String>, file_name: impl Into<String>) -> Result<Self, DomainError> {
        let file_name = file_name.into();
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name == "."
            || file_name == ".."
        {
            return Err(DomainError::InvalidPhoto(file_name));
        }
        Ok(Self {
            uri: uri.into(),
            file_name,
        })
    }

    /// A freshly picked image gets a random filename, keeping its extension.
    pub fn picked(uri: impl Into<String>, extension: &str) -> Self {
        let ext = extension.trim_start_matches('.');
        let file_name = if ext.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            format!("{}.{}", Uuid::new_v4(), ext)
        };
        Self {
            uri: uri.into(),
            file_name,
        }
    }
}
