use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use swissdorm_shared::{
    Language, ListingStatus, Location, Profile, RentalListing, Review, RoomType, UserInfo,
    UserSettings,
};
use swissdorm_store::converters::string_list;
use swissdorm_store::{LocalCache, ProfileRecord, RentalListingRecord, ReviewRecord};

fn review(uid: &str, owner: &str) -> Review {
    Review {
        uid: uid.into(),
        owner_id: owner.into(),
        posted_at: Utc.timestamp_opt(1_700_000_000, 999_999_999).unwrap(),
        title: format!("Review {uid}"),
        review_text: "Thin walls but great view".into(),
        grade: 3.0,
        residency_name: "Vortex".into(),
        room_type: RoomType::Colocation,
        price_per_month: 780.0,
        area_in_m2: 16,
        image_urls: vec!["x.jpg".into(), "y.jpg".into()],
        upvoted_by: BTreeSet::new(),
        downvoted_by: BTreeSet::new(),
        is_anonymous: false,
    }
}

fn listing(uid: &str, owner: &str) -> RentalListing {
    RentalListing {
        uid: uid.into(),
        owner_id: owner.into(),
        posted_at: Utc.timestamp_opt(1_700_000_500, 1).unwrap(),
        residency_name: "Atrium".into(),
        title: format!("Listing {uid}"),
        room_type: RoomType::Apartment,
        price_per_month: 1450.0,
        area_in_m2: 45,
        start_date: Utc.timestamp_opt(1_704_067_200, 0).unwrap(),
        description: "Two rooms, balcony".into(),
        image_urls: vec![],
        status: ListingStatus::Active,
        location: Location::new("Renens", 46.5399, 6.5881),
    }
}

fn profile(owner: &str) -> Profile {
    Profile {
        owner_id: owner.into(),
        user_info: UserInfo {
            name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@unil.ch".into(),
            phone_number: "+41 21 000 00 00".into(),
            university_name: Some("UNIL".into()),
            preferred_room_types: vec![RoomType::Studio],
            bookmarked_listing_ids: vec!["listing-1".into()],
            ..UserInfo::default()
        },
        user_settings: UserSettings {
            language: Language::German,
            ..UserSettings::default()
        },
    }
}

#[tokio::test]
async fn get_all_by_owner_returns_exactly_that_owners_rows() {
    let cache = LocalCache::open_in_memory().unwrap();
    let reviews = cache.reviews();
    let listings = cache.listings();

    let owners = ["user-1", "user-2", "user-1", "user-3", "user-1"];
    let seeded: Vec<ReviewRecord> = owners
        .iter()
        .enumerate()
        .map(|(i, owner)| {
            ReviewRecord::try_from_domain(&review(&format!("r{i}"), owner)).unwrap()
        })
        .collect();
    reviews.insert_many(seeded).await.unwrap();

    for (i, owner) in owners.iter().enumerate() {
        let record = RentalListingRecord::try_from(&listing(&format!("l{i}"), owner)).unwrap();
        listings.insert(record).await.unwrap();
    }

    let mine = reviews.get_all_by_owner("user-1").await.unwrap();
    let mut uids: Vec<_> = mine.iter().map(|r| r.uid.as_str()).collect();
    uids.sort_unstable();
    assert_eq!(uids, ["r0", "r2", "r4"]);

    let mine = listings.get_all_by_owner("user-1").await.unwrap();
    assert_eq!(mine.len(), 3);
    assert!(mine.iter().all(|l| l.owner_id == "user-1"));

    assert!(reviews.get_all_by_owner("nobody").await.unwrap().is_empty());
    assert_eq!(reviews.get_all().await.unwrap().len(), owners.len());
}

#[tokio::test]
async fn insert_with_same_key_keeps_the_second_record() {
    let cache = LocalCache::open_in_memory().unwrap();
    let reviews = cache.reviews();

    let first = ReviewRecord::try_from_domain(&review("r1", "user-1")).unwrap();
    let mut second = ReviewRecord::try_from_domain(&review("r1", "user-2")).unwrap();
    second.title = "Edited".into();
    second.image_urls = None;

    reviews.insert(first).await.unwrap();
    reviews.insert(second.clone()).await.unwrap();

    let all = reviews.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(reviews.get_by_id("r1").await.unwrap(), Some(second));
}

#[tokio::test]
async fn domain_values_round_trip_through_the_database() {
    let cache = LocalCache::open_in_memory().unwrap();

    let r = review("r1", "user-1");
    let record = ReviewRecord::try_from(&r).unwrap();
    cache.reviews().insert(record).await.unwrap();
    let stored = cache.reviews().get_by_id("r1").await.unwrap().unwrap();
    assert_eq!(stored.to_domain(), r);

    let l = listing("l1", "user-1");
    let record = RentalListingRecord::try_from(&l).unwrap();
    cache.listings().insert(record).await.unwrap();
    let stored = cache.listings().get_by_id("l1").await.unwrap().unwrap();
    assert_eq!(stored.to_domain(), l);

    let p = profile("user-1");
    cache.profiles().insert(ProfileRecord::from(&p)).await.unwrap();
    let stored = cache.profiles().get_by_id("user-1").await.unwrap().unwrap();
    assert_eq!(stored.to_domain(), p);
}

#[tokio::test]
async fn voter_lists_keep_set_semantics_end_to_end() {
    let cache = LocalCache::open_in_memory().unwrap();
    let reviews = cache.reviews();

    let mut seeded = ReviewRecord::try_from_domain(&review("r1", "user-1")).unwrap();
    seeded.upvoted_by = Some("user-2,user-3".into());
    seeded.downvoted_by = Some("user-4".into());
    reviews.insert(seeded).await.unwrap();

    let domain = reviews.get_by_id("r1").await.unwrap().unwrap().to_domain();
    assert_eq!(
        domain.upvoted_by,
        BTreeSet::from(["user-2".to_string(), "user-3".to_string()])
    );
    reviews
        .update(ReviewRecord::try_from_domain(&domain).unwrap())
        .await
        .unwrap();

    let stored = reviews.get_by_id("r1").await.unwrap().unwrap();
    let mut voters = string_list::decode(stored.upvoted_by.as_deref());
    voters.extend(string_list::decode(stored.downvoted_by.as_deref()));
    voters.sort();
    assert_eq!(voters, ["user-2", "user-3", "user-4"]);
}

#[tokio::test]
async fn unknown_enum_in_a_stored_row_reads_as_default() {
    let cache = LocalCache::open_in_memory().unwrap();
    let mut record = ReviewRecord::try_from_domain(&review("r1", "user-1")).unwrap();
    record.room_type = "INVALID_TYPE".into();
    cache.reviews().insert(record).await.unwrap();

    let domain = cache.reviews().get_by_id("r1").await.unwrap().unwrap().to_domain();
    assert_eq!(domain.room_type, RoomType::Studio);
}

#[tokio::test]
async fn missing_ids_are_absent_not_errors() {
    let cache = LocalCache::open_in_memory().unwrap();
    assert!(cache.profiles().get_by_id("x").await.unwrap().is_none());
    assert!(cache.reviews().get_by_id("x").await.unwrap().is_none());
    assert!(cache.listings().get_by_id("x").await.unwrap().is_none());
    assert!(!cache.listings().delete_by_id("x").await.unwrap());
}

#[tokio::test]
async fn session_switch_requires_clearing_the_profile() {
    let cache = LocalCache::open_in_memory().unwrap();
    let profiles = cache.profiles();

    profiles.insert(ProfileRecord::from(&profile("user-1"))).await.unwrap();
    profiles.insert(ProfileRecord::from(&profile("user-2"))).await.unwrap();
    assert_eq!(profiles.get_all().await.unwrap().len(), 2);

    assert_eq!(profiles.delete_all().await.unwrap(), 2);
    profiles.replace(ProfileRecord::from(&profile("user-3"))).await.unwrap();

    let all = profiles.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].owner_id, "user-3");
}

#[tokio::test]
async fn file_backed_cache_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    let cache = LocalCache::open_at(&path).await.unwrap();
    cache
        .listings()
        .insert(RentalListingRecord::try_from(&listing("l1", "user-1")).unwrap())
        .await
        .unwrap();
    cache.close().await.unwrap();

    let reopened = LocalCache::open_at(&path).await.unwrap();
    let stored = reopened.listings().get_by_id("l1").await.unwrap();
    assert_eq!(stored.map(|l| l.to_domain()), Some(listing("l1", "user-1")));
}
