use serde::{Deserialize, Serialize};
use swissdorm_shared::{Language, Profile, RoomType, UserInfo, UserSettings};

use super::decode_enum;
use crate::converters::{location, string_list};

/// Row of the `profile` table. Keyed by `owner_id`; the cache holds at most
/// one (the signed-in user's).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub owner_id: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub university_name: Option<String>,
    /// `name|latitude|longitude`.
    pub location: Option<String>,
    pub residency_name: Option<String>,
    pub profile_picture: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_size: Option<i32>,
    pub max_size: Option<i32>,
    /// Comma-joined room type names.
    pub preferred_room_types: Option<String>,
    /// Comma-joined listing ids.
    pub bookmarked_listing_ids: Option<String>,
    pub language: String,
    pub is_public: bool,
    pub is_push_notified: bool,
    pub dark_mode: Option<bool>,
}

impl ProfileRecord {
    pub fn from_domain(profile: &Profile) -> Self {
        let info = &profile.user_info;
        let settings = &profile.user_settings;

        let room_type_names: Vec<&str> = info
            .preferred_room_types
            .iter()
            .map(RoomType::name)
            .collect();

        Self {
            owner_id: profile.owner_id.clone(),
            name: info.name.clone(),
            last_name: info.last_name.clone(),
            email: info.email.clone(),
            phone_number: info.phone_number.clone(),
            university_name: info.university_name.clone(),
            location: location::encode(info.location.as_ref()),
            residency_name: info.residency_name.clone(),
            profile_picture: info.profile_picture.clone(),
            min_price: info.min_price,
            max_price: info.max_price,
            min_size: info.min_size,
            max_size: info.max_size,
            preferred_room_types: string_list::encode(Some(room_type_names.as_slice())),
            bookmarked_listing_ids: string_list::encode(Some(
                info.bookmarked_listing_ids.as_slice(),
            )),
            language: settings.language.name().to_string(),
            is_public: settings.is_public,
            is_push_notified: settings.is_push_notified,
            dark_mode: settings.dark_mode,
        }
    }

    pub fn to_domain(&self) -> Profile {
        // Unknown names are dropped; duplicates keep their first position.
        let mut preferred_room_types = Vec::new();
        for name in string_list::decode(self.preferred_room_types.as_deref()) {
            match RoomType::from_name(&name) {
                Some(rt) if !preferred_room_types.contains(&rt) => preferred_room_types.push(rt),
                Some(_) => {}
                None => {
                    tracing::warn!(
                        owner_id = %self.owner_id,
                        value = %name,
                        "dropping unknown preferred room type"
                    );
                }
            }
        }

        Profile {
            owner_id: self.owner_id.clone(),
            user_info: UserInfo {
                name: self.name.clone(),
                last_name: self.last_name.clone(),
                email: self.email.clone(),
                phone_number: self.phone_number.clone(),
                university_name: self.university_name.clone(),
                location: location::decode(self.location.as_deref()),
                residency_name: self.residency_name.clone(),
                profile_picture: self.profile_picture.clone(),
                min_price: self.min_price,
                max_price: self.max_price,
                min_size: self.min_size,
                max_size: self.max_size,
                preferred_room_types,
                bookmarked_listing_ids: string_list::decode(
                    self.bookmarked_listing_ids.as_deref(),
                ),
            },
            user_settings: UserSettings {
                language: decode_enum(
                    Some(self.language.as_str()),
                    Language::from_name,
                    "profile.language",
                ),
                is_public: self.is_public,
                is_push_notified: self.is_push_notified,
                dark_mode: self.dark_mode,
            },
        }
    }
}

impl From<&Profile> for ProfileRecord {
    fn from(profile: &Profile) -> Self {
        Self::from_domain(profile)
    }
}

impl From<&ProfileRecord> for Profile {
    fn from(record: &ProfileRecord) -> Self {
        record.to_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swissdorm_shared::Location;

    fn full_profile() -> Profile {
        Profile {
            owner_id: "user-1".into(),
            user_info: UserInfo {
                name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@epfl.ch".into(),
                phone_number: "+41 79 000 00 00".into(),
                university_name: Some("EPFL".into()),
                location: Some(Location::new("Lausanne", 46.5197, 6.6323)),
                residency_name: Some("Vortex".into()),
                profile_picture: Some("avatar.jpg".into()),
                min_price: Some(500.0),
                max_price: Some(1200.5),
                min_size: Some(12),
                max_size: Some(40),
                preferred_room_types: vec![RoomType::Colocation, RoomType::Studio],
                bookmarked_listing_ids: vec!["l-2".into(), "l-1".into()],
            },
            user_settings: UserSettings {
                language: Language::French,
                is_public: true,
                is_push_notified: false,
                dark_mode: Some(true),
            },
        }
    }

    #[test]
    fn round_trip_is_exact() {
        let profile = full_profile();
        let record = ProfileRecord::from_domain(&profile);
        assert_eq!(record.language, "FRENCH");
        assert_eq!(record.preferred_room_types.as_deref(), Some("COLOCATION,STUDIO"));
        assert_eq!(record.to_domain(), profile);
    }

    #[test]
    fn minimal_profile_round_trip() {
        let profile = Profile {
            owner_id: "user-2".into(),
            user_info: UserInfo::default(),
            user_settings: UserSettings::default(),
        };
        let record = ProfileRecord::from(&profile);
        assert_eq!(record.bookmarked_listing_ids.as_deref(), Some(""));
        assert_eq!(Profile::from(&record), profile);
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let mut record = ProfileRecord::from_domain(&full_profile());
        record.language = "KLINGON".into();
        assert_eq!(record.to_domain().user_settings.language, Language::English);
    }

    #[test]
    fn preferred_room_types_drop_unknown_and_duplicates() {
        let mut record = ProfileRecord::from_domain(&full_profile());
        record.preferred_room_types = Some("APARTMENT,INVALID_TYPE,APARTMENT,STUDIO".into());
        assert_eq!(
            record.to_domain().user_info.preferred_room_types,
            vec![RoomType::Apartment, RoomType::Studio]
        );
    }

    #[test]
    fn malformed_location_is_absent() {
        let mut record = ProfileRecord::from_domain(&full_profile());
        record.location = Some("Lausanne|invalid|6.6323".into());
        assert_eq!(record.to_domain().user_info.location, None);
    }
}
