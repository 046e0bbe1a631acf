//! v001 -- Initial schema creation.
//!
//! Creates the three cache tables: `profile`, `review` and `rental_listing`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Profile (one row per signed-in session)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS profile (
    owner_id               TEXT PRIMARY KEY NOT NULL,
    name                   TEXT NOT NULL,
    last_name              TEXT NOT NULL,
    email                  TEXT NOT NULL,
    phone_number           TEXT NOT NULL,
    university_name        TEXT,
    location               TEXT,                 -- name|lat|lon
    residency_name         TEXT,
    profile_picture        TEXT,                 -- photo filename
    min_price              REAL,
    max_price              REAL,
    min_size               INTEGER,
    max_size               INTEGER,
    preferred_room_types   TEXT,                 -- comma-joined enum names
    bookmarked_listing_ids TEXT,                 -- comma-joined ids
    language               TEXT NOT NULL,
    is_public              INTEGER NOT NULL,     -- boolean 0/1
    is_push_notified       INTEGER NOT NULL,     -- boolean 0/1
    dark_mode              INTEGER               -- nullable boolean
);

-- ----------------------------------------------------------------
-- Reviews
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS review (
    uid             TEXT PRIMARY KEY NOT NULL,
    owner_id        TEXT NOT NULL,
    posted_at       INTEGER,                      -- ns since epoch
    title           TEXT NOT NULL,
    review_text     TEXT NOT NULL,
    grade           REAL NOT NULL,
    residency_name  TEXT NOT NULL,
    room_type       TEXT NOT NULL,
    price_per_month REAL NOT NULL,
    area_in_m2      INTEGER NOT NULL,
    image_urls      TEXT,
    upvoted_by      TEXT,
    downvoted_by    TEXT,
    is_anonymous    INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_review_owner ON review(owner_id);
CREATE INDEX IF NOT EXISTS idx_review_residency ON review(residency_name);

-- ----------------------------------------------------------------
-- Rental listings
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS rental_listing (
    uid             TEXT PRIMARY KEY NOT NULL,
    owner_id        TEXT NOT NULL,
    posted_at       INTEGER,
    residency_name  TEXT NOT NULL,
    title           TEXT NOT NULL,
    room_type       TEXT NOT NULL,
    price_per_month REAL NOT NULL,
    area_in_m2      INTEGER NOT NULL,
    start_date      INTEGER,
    description     TEXT NOT NULL,
    image_urls      TEXT,
    status          TEXT NOT NULL,
    location        TEXT
);

CREATE INDEX IF NOT EXISTS idx_rental_listing_owner ON rental_listing(owner_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
