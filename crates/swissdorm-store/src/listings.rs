//! CRUD operations for [`RentalListingRecord`] rows.

use rusqlite::{named_params, params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::records::RentalListingRecord;

const SELECT_LISTING: &str = "SELECT uid, owner_id, posted_at, residency_name, title, room_type,
            price_per_month, area_in_m2, start_date, description, image_urls,
            status, location
     FROM rental_listing";

const UPSERT_LISTING: &str = "INSERT OR REPLACE INTO rental_listing (
        uid, owner_id, posted_at, residency_name, title, room_type,
        price_per_month, area_in_m2, start_date, description, image_urls,
        status, location)
     VALUES (:uid, :owner_id, :posted_at, :residency_name, :title, :room_type,
        :price_per_month, :area_in_m2, :start_date, :description, :image_urls,
        :status, :location)";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a listing, replacing any row with the same `uid`.
    pub fn insert_listing(&self, listing: &RentalListingRecord) -> Result<()> {
        write_listing(self.conn(), UPSERT_LISTING, listing)?;
        tracing::debug!(uid = %listing.uid, "cached rental listing");
        Ok(())
    }

    /// Insert many listings in one transaction.
    pub fn insert_listings(&self, listings: &[RentalListingRecord]) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;
        for listing in listings {
            write_listing(&tx, UPSERT_LISTING, listing)?;
        }
        tx.commit()?;
        tracing::debug!(count = listings.len(), "cached rental listings");
        Ok(())
    }

    /// Make `listings` the exact contents of the table, atomically.
    pub fn replace_listings(&self, listings: &[RentalListingRecord]) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM rental_listing", [])?;
        for listing in listings {
            write_listing(&tx, UPSERT_LISTING, listing)?;
        }
        tx.commit()?;
        tracing::debug!(
            removed,
            count = listings.len(),
            "replaced cached rental listings"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Look up a listing by `uid`.
    pub fn get_listing(&self, uid: &str) -> Result<Option<RentalListingRecord>> {
        let listing = self
            .conn()
            .query_row(
                &format!("{SELECT_LISTING} WHERE uid = ?1"),
                params![uid],
                row_to_listing,
            )
            .optional()?;
        Ok(listing)
    }

    /// Every cached listing, newest first.
    pub fn list_listings(&self) -> Result<Vec<RentalListingRecord>> {
        self.query_listings(&format!("{SELECT_LISTING} ORDER BY posted_at DESC"), &[])
    }

    /// Listings posted by `owner_id`, newest first.
    pub fn list_listings_by_owner(&self, owner_id: &str) -> Result<Vec<RentalListingRecord>> {
        self.query_listings(
            &format!("{SELECT_LISTING} WHERE owner_id = ?1 ORDER BY posted_at DESC"),
            &[owner_id],
        )
    }

    fn query_listings(&self, sql: &str, args: &[&str]) -> Result<Vec<RentalListingRecord>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), row_to_listing)?;

        let mut listings = Vec::new();
        for row in rows {
            listings.push(row?);
        }
        Ok(listings)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Overwrite an existing listing.  Returns `false` if no row has that `uid`.
    pub fn update_listing(&self, listing: &RentalListingRecord) -> Result<bool> {
        let affected = write_listing(
            self.conn(),
            "UPDATE rental_listing SET
                owner_id = :owner_id, posted_at = :posted_at,
                residency_name = :residency_name, title = :title,
                room_type = :room_type, price_per_month = :price_per_month,
                area_in_m2 = :area_in_m2, start_date = :start_date,
                description = :description, image_urls = :image_urls,
                status = :status, location = :location
             WHERE uid = :uid",
            listing,
        )?;
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a listing by `uid`.  Returns `true` if a row was deleted.
    pub fn delete_listing(&self, uid: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM rental_listing WHERE uid = ?1", params![uid])?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_listing(
    conn: &rusqlite::Connection,
    sql: &str,
    listing: &RentalListingRecord,
) -> rusqlite::Result<usize> {
    conn.execute(
        sql,
        named_params! {
            ":uid": listing.uid,
            ":owner_id": listing.owner_id,
            ":posted_at": listing.posted_at,
            ":residency_name": listing.residency_name,
            ":title": listing.title,
            ":room_type": listing.room_type,
            ":price_per_month": listing.price_per_month,
            ":area_in_m2": listing.area_in_m2,
            ":start_date": listing.start_date,
            ":description": listing.description,
            ":image_urls": listing.image_urls,
            ":status": listing.status,
            ":location": listing.location,
        },
    )
}

/// Map a `rusqlite::Row` to a [`RentalListingRecord`].
fn row_to_listing(row: &rusqlite::Row<'_>) -> rusqlite::Result<RentalListingRecord> {
    Ok(RentalListingRecord {
        uid: row.get(0)?,
        owner_id: row.get(1)?,
        posted_at: row.get(2)?,
        residency_name: row.get(3)?,
        title: row.get(4)?,
        room_type: row.get(5)?,
        price_per_month: row.get(6)?,
        area_in_m2: row.get(7)?,
        start_date: row.get(8)?,
        description: row.get(9)?,
        image_urls: row.get(10)?,
        status: row.get(11)?,
        location: row.get(12)?,
    })
}
