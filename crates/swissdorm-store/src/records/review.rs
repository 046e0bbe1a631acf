use serde::{Deserialize, Serialize};
use swissdorm_shared::{Review, RoomType};

use super::{decode_enum, decode_instant, encode_instant};
use crate::converters::string_list;
use crate::error::{Result, StoreError};

/// Row of the `review` table, keyed by `uid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub uid: String,
    pub owner_id: String,
    /// Nanoseconds since the Unix epoch.
    pub posted_at: Option<i64>,
    pub title: String,
    pub review_text: String,
    pub grade: f64,
    pub residency_name: String,
    pub room_type: String,
    pub price_per_month: f64,
    pub area_in_m2: i32,
    pub image_urls: Option<String>,
    pub upvoted_by: Option<String>,
    pub downvoted_by: Option<String>,
    pub is_anonymous: bool,
}

impl ReviewRecord {
    /// Fails only for a `posted_at` outside the storable range.
    pub fn try_from_domain(review: &Review) -> Result<Self> {
        let upvoted: Vec<&String> = review.upvoted_by.iter().collect();
        let downvoted: Vec<&String> = review.downvoted_by.iter().collect();

        Ok(Self {
            uid: review.uid.clone(),
            owner_id: review.owner_id.clone(),
            posted_at: Some(encode_instant(&review.posted_at, "review.posted_at")?),
            title: review.title.clone(),
            review_text: review.review_text.clone(),
            grade: review.grade,
            residency_name: review.residency_name.clone(),
            room_type: review.room_type.name().to_string(),
            price_per_month: review.price_per_month,
            area_in_m2: review.area_in_m2,
            image_urls: string_list::encode(Some(review.image_urls.as_slice())),
            upvoted_by: string_list::encode(Some(upvoted.as_slice())),
            downvoted_by: string_list::encode(Some(downvoted.as_slice())),
            is_anonymous: review.is_anonymous,
        })
    }

    pub fn to_domain(&self) -> Review {
        Review {
            uid: self.uid.clone(),
            owner_id: self.owner_id.clone(),
            posted_at: decode_instant(self.posted_at, "review.posted_at"),
            title: self.title.clone(),
            review_text: self.review_text.clone(),
            grade: self.grade,
            residency_name: self.residency_name.clone(),
            room_type: decode_enum(
                Some(self.room_type.as_str()),
                RoomType::from_name,
                "review.room_type",
            ),
            price_per_month: self.price_per_month,
            area_in_m2: self.area_in_m2,
            image_urls: string_list::decode(self.image_urls.as_deref()),
            upvoted_by: string_list::decode(self.upvoted_by.as_deref())
                .into_iter()
                .collect(),
            downvoted_by: string_list::decode(self.downvoted_by.as_deref())
                .into_iter()
                .collect(),
            is_anonymous: self.is_anonymous,
        }
    }
}

impl TryFrom<&Review> for ReviewRecord {
    type Error = StoreError;

    fn try_from(review: &Review) -> Result<Self> {
        Self::try_from_domain(review)
    }
}

impl From<&ReviewRecord> for Review {
    fn from(record: &ReviewRecord) -> Self {
        record.to_domain()
    }
}
