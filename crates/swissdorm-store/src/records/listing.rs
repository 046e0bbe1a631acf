use serde::{Deserialize, Serialize};
use swissdorm_shared::{ListingStatus, Location, RentalListing, RoomType};

use super::{decode_enum, decode_instant, encode_instant};
use crate::converters::{location, string_list};
use crate::error::{Result, StoreError};

/// Row of the `rental_listing` table, keyed by `uid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalListingRecord {
    pub uid: String,
    pub owner_id: String,
    pub posted_at: Option<i64>,
    pub residency_name: String,
    pub title: String,
    pub room_type: String,
    pub price_per_month: f64,
    pub area_in_m2: i32,
    pub start_date: Option<i64>,
    pub description: String,
    pub image_urls: Option<String>,
    pub status: String,
    pub location: Option<String>,
}

impl RentalListingRecord {
    /// Fails only for a `posted_at` or `start_date` outside the storable
    /// range.
    pub fn try_from_domain(listing: &RentalListing) -> Result<Self> {
        Ok(Self {
            uid: listing.uid.clone(),
            owner_id: listing.owner_id.clone(),
            posted_at: Some(encode_instant(&listing.posted_at, "rental_listing.posted_at")?),
            residency_name: listing.residency_name.clone(),
            title: listing.title.clone(),
            room_type: listing.room_type.name().to_string(),
            price_per_month: listing.price_per_month,
            area_in_m2: listing.area_in_m2,
            start_date: Some(encode_instant(
                &listing.start_date,
                "rental_listing.start_date",
            )?),
            description: listing.description.clone(),
            image_urls: string_list::encode(Some(listing.image_urls.as_slice())),
            status: listing.status.name().to_string(),
            location: location::encode(Some(&listing.location)),
        })
    }

    /// An unreadable location becomes an unnamed point at (0, 0).
    pub fn to_domain(&self) -> RentalListing {
        let location = location::decode(self.location.as_deref()).unwrap_or_else(|| {
            if self.location.is_some() {
                tracing::warn!(uid = %self.uid, "unreadable listing location in cache");
            }
            Location::new("", 0.0, 0.0)
        });

        RentalListing {
            uid: self.uid.clone(),
            owner_id: self.owner_id.clone(),
            posted_at: decode_instant(self.posted_at, "rental_listing.posted_at"),
            residency_name: self.residency_name.clone(),
            title: self.title.clone(),
            room_type: decode_enum(
                Some(self.room_type.as_str()),
                RoomType::from_name,
                "rental_listing.room_type",
            ),
            price_per_month: self.price_per_month,
            area_in_m2: self.area_in_m2,
            start_date: decode_instant(self.start_date, "rental_listing.start_date"),
            description: self.description.clone(),
            image_urls: string_list::decode(self.image_urls.as_deref()),
            status: decode_enum(
                Some(self.status.as_str()),
                ListingStatus::from_name,
                "rental_listing.status",
            ),
            location,
        }
    }
}

impl TryFrom<&RentalListing> for RentalListingRecord {
    type Error = StoreError;

    fn try_from(listing: &RentalListing) -> Result<Self> {
        Self::try_from_domain(listing)
    }
}

impl From<&RentalListingRecord> for RentalListing {
    fn from(record: &RentalListingRecord) -> Self {
        record.to_domain()
    }
}
