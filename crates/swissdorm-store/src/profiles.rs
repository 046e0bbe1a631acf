//! CRUD operations for the [`ProfileRecord`] row.
//!
//! The table holds the signed-in user's profile only.  Upserting a profile
//! for another owner does not evict the previous one, so session changes go
//! through [`Database::replace_profile`] or [`Database::delete_all_profiles`].

use rusqlite::{named_params, params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::records::ProfileRecord;

const SELECT_PROFILE: &str = "SELECT owner_id, name, last_name, email, phone_number,
            university_name, location, residency_name, profile_picture,
            min_price, max_price, min_size, max_size, preferred_room_types,
            bookmarked_listing_ids, language, is_public, is_push_notified, dark_mode
     FROM profile";

const UPSERT_PROFILE: &str = "INSERT OR REPLACE INTO profile (
        owner_id, name, last_name, email, phone_number, university_name,
        location, residency_name, profile_picture, min_price, max_price,
        min_size, max_size, preferred_room_types, bookmarked_listing_ids,
        language, is_public, is_push_notified, dark_mode)
     VALUES (:owner_id, :name, :last_name, :email, :phone_number, :university_name,
        :location, :residency_name, :profile_picture, :min_price, :max_price,
        :min_size, :max_size, :preferred_room_types, :bookmarked_listing_ids,
        :language, :is_public, :is_push_notified, :dark_mode)";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a profile, replacing any row with the same `owner_id`.
    pub fn insert_profile(&self, profile: &ProfileRecord) -> Result<()> {
        write_profile(self.conn(), UPSERT_PROFILE, profile)?;
        tracing::debug!(owner_id = %profile.owner_id, "cached profile");
        Ok(())
    }

    /// Insert many profiles in one transaction.
    pub fn insert_profiles(&self, profiles: &[ProfileRecord]) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;
        for profile in profiles {
            write_profile(&tx, UPSERT_PROFILE, profile)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Make `profile` the only cached profile, atomically.
    pub fn replace_profile(&self, profile: &ProfileRecord) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;
        tx.execute("DELETE FROM profile", [])?;
        write_profile(&tx, UPSERT_PROFILE, profile)?;
        tx.commit()?;
        tracing::debug!(owner_id = %profile.owner_id, "replaced cached profile");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Look up the profile of `owner_id`.
    pub fn get_profile(&self, owner_id: &str) -> Result<Option<ProfileRecord>> {
        let profile = self
            .conn()
            .query_row(
                &format!("{SELECT_PROFILE} WHERE owner_id = ?1"),
                params![owner_id],
                row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    /// Every cached profile.  Normally at most one.
    pub fn list_profiles(&self) -> Result<Vec<ProfileRecord>> {
        let mut stmt = self.conn().prepare(SELECT_PROFILE)?;
        let rows = stmt.query_map([], row_to_profile)?;

        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?);
        }
        Ok(profiles)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Overwrite an existing profile.  Returns `false` if no row has that
    /// `owner_id`.
    pub fn update_profile(&self, profile: &ProfileRecord) -> Result<bool> {
        let affected = write_profile(
            self.conn(),
            "UPDATE profile SET
                name = :name, last_name = :last_name, email = :email,
                phone_number = :phone_number, university_name = :university_name,
                location = :location, residency_name = :residency_name,
                profile_picture = :profile_picture, min_price = :min_price,
                max_price = :max_price, min_size = :min_size, max_size = :max_size,
                preferred_room_types = :preferred_room_types,
                bookmarked_listing_ids = :bookmarked_listing_ids,
                language = :language, is_public = :is_public,
                is_push_notified = :is_push_notified, dark_mode = :dark_mode
             WHERE owner_id = :owner_id",
            profile,
        )?;
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete the profile of `owner_id`.  Returns `true` if a row was deleted.
    pub fn delete_profile(&self, owner_id: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM profile WHERE owner_id = ?1", params![owner_id])?;
        Ok(affected > 0)
    }

    /// Drop every cached profile (session end).  Returns the number removed.
    pub fn delete_all_profiles(&self) -> Result<usize> {
        let affected = self.conn().execute("DELETE FROM profile", [])?;
        tracing::debug!(count = affected, "cleared cached profiles");
        Ok(affected)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_profile(
    conn: &rusqlite::Connection,
    sql: &str,
    profile: &ProfileRecord,
) -> rusqlite::Result<usize> {
    conn.execute(
        sql,
        named_params! {
            ":owner_id": profile.owner_id,
            ":name": profile.name,
            ":last_name": profile.last_name,
            ":email": profile.email,
            ":phone_number": profile.phone_number,
            ":university_name": profile.university_name,
            ":location": profile.location,
            ":residency_name": profile.residency_name,
            ":profile_picture": profile.profile_picture,
            ":min_price": profile.min_price,
            ":max_price": profile.max_price,
            ":min_size": profile.min_size,
            ":max_size": profile.max_size,
            ":preferred_room_types": profile.preferred_room_types,
            ":bookmarked_listing_ids": profile.bookmarked_listing_ids,
            ":language": profile.language,
            ":is_public": profile.is_public,
            ":is_push_notified": profile.is_push_notified,
            ":dark_mode": profile.dark_mode,
        },
    )
}

/// Map a `rusqlite::Row` to a [`ProfileRecord`].
fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProfileRecord> {
    Ok(ProfileRecord {
        owner_id: row.get(0)?,
        name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone_number: row.get(4)?,
        university_name: row.get(5)?,
        location: row.get(6)?,
        residency_name: row.get(7)?,
        profile_picture: row.get(8)?,
        min_price: row.get(9)?,
        max_price: row.get(10)?,
        min_size: row.get(11)?,
        max_size: row.get(12)?,
        preferred_room_types: row.get(13)?,
        bookmarked_listing_ids: row.get(14)?,
        language: row.get(15)?,
        is_public: row.get(16)?,
        is_push_notified: row.get(17)?,
        dark_mode: row.get(18)?,
    })
}
