//! CRUD operations for [`ReviewRecord`] rows.

use rusqlite::{named_params, params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::records::ReviewRecord;

const SELECT_REVIEW: &str = "SELECT uid, owner_id, posted_at, title, review_text, grade,
            residency_name, room_type, price_per_month, area_in_m2,
            image_urls, upvoted_by, downvoted_by, is_anonymous
     FROM review";

// Replace-by-primary-key: a conflicting row is overwritten, never merged.
const UPSERT_REVIEW: &str = "INSERT OR REPLACE INTO review (
        uid, owner_id, posted_at, title, review_text, grade, residency_name,
        room_type, price_per_month, area_in_m2, image_urls, upvoted_by,
        downvoted_by, is_anonymous)
     VALUES (:uid, :owner_id, :posted_at, :title, :review_text, :grade, :residency_name,
        :room_type, :price_per_month, :area_in_m2, :image_urls, :upvoted_by,
        :downvoted_by, :is_anonymous)";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a review, replacing any row with the same `uid`.
    pub fn insert_review(&self, review: &ReviewRecord) -> Result<()> {
        write_review(self.conn(), UPSERT_REVIEW, review)?;
        tracing::debug!(uid = %review.uid, "cached review");
        Ok(())
    }

    /// Insert many reviews in one transaction.
    pub fn insert_reviews(&self, reviews: &[ReviewRecord]) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;
        for review in reviews {
            write_review(&tx, UPSERT_REVIEW, review)?;
        }
        tx.commit()?;
        tracing::debug!(count = reviews.len(), "cached reviews");
        Ok(())
    }

    /// Make `reviews` the exact contents of the table, atomically.
    pub fn replace_reviews(&self, reviews: &[ReviewRecord]) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM review", [])?;
        for review in reviews {
            write_review(&tx, UPSERT_REVIEW, review)?;
        }
        tx.commit()?;
        tracing::debug!(removed, count = reviews.len(), "replaced cached reviews");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Look up a review by `uid`.
    pub fn get_review(&self, uid: &str) -> Result<Option<ReviewRecord>> {
        let review = self
            .conn()
            .query_row(
                &format!("{SELECT_REVIEW} WHERE uid = ?1"),
                params![uid],
                row_to_review,
            )
            .optional()?;
        Ok(review)
    }

    /// Every cached review, newest first.
    pub fn list_reviews(&self) -> Result<Vec<ReviewRecord>> {
        self.query_reviews(&format!("{SELECT_REVIEW} ORDER BY posted_at DESC"), &[])
    }

    /// Reviews written by `owner_id`, newest first.
    pub fn list_reviews_by_owner(&self, owner_id: &str) -> Result<Vec<ReviewRecord>> {
        self.query_reviews(
            &format!("{SELECT_REVIEW} WHERE owner_id = ?1 ORDER BY posted_at DESC"),
            &[owner_id],
        )
    }

    /// Reviews of one residency, newest first.
    pub fn list_reviews_by_residency(&self, residency_name: &str) -> Result<Vec<ReviewRecord>> {
        self.query_reviews(
            &format!("{SELECT_REVIEW} WHERE residency_name = ?1 ORDER BY posted_at DESC"),
            &[residency_name],
        )
    }

    fn query_reviews(&self, sql: &str, args: &[&str]) -> Result<Vec<ReviewRecord>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), row_to_review)?;

        let mut reviews = Vec::new();
        for row in rows {
            reviews.push(row?);
        }
        Ok(reviews)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Overwrite an existing review.  Returns `false` if no row has that `uid`.
    pub fn update_review(&self, review: &ReviewRecord) -> Result<bool> {
        let affected = write_review(
            self.conn(),
            "UPDATE review SET
                owner_id = :owner_id, posted_at = :posted_at, title = :title,
                review_text = :review_text, grade = :grade,
                residency_name = :residency_name, room_type = :room_type,
                price_per_month = :price_per_month, area_in_m2 = :area_in_m2,
                image_urls = :image_urls, upvoted_by = :upvoted_by,
                downvoted_by = :downvoted_by, is_anonymous = :is_anonymous
             WHERE uid = :uid",
            review,
        )?;
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a review by `uid`.  Returns `true` if a row was deleted.
    pub fn delete_review(&self, uid: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM review WHERE uid = ?1", params![uid])?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_review(
    conn: &rusqlite::Connection,
    sql: &str,
    review: &ReviewRecord,
) -> rusqlite::Result<usize> {
    conn.execute(
        sql,
        named_params! {
            ":uid": review.uid,
            ":owner_id": review.owner_id,
            ":posted_at": review.posted_at,
            ":title": review.title,
            ":review_text": review.review_text,
            ":grade": review.grade,
            ":residency_name": review.residency_name,
            ":room_type": review.room_type,
            ":price_per_month": review.price_per_month,
            ":area_in_m2": review.area_in_m2,
            ":image_urls": review.image_urls,
            ":upvoted_by": review.upvoted_by,
            ":downvoted_by": review.downvoted_by,
            ":is_anonymous": review.is_anonymous,
        },
    )
}

/// Map a `rusqlite::Row` to a [`ReviewRecord`].
fn row_to_review(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReviewRecord> {
    Ok(ReviewRecord {
        uid: row.get(0)?,
        owner_id: row.get(1)?,
        posted_at: row.get(2)?,
        title: row.get(3)?,
        review_text: row.get(4)?,
        grade: row.get(5)?,
        residency_name: row.get(6)?,
        room_type: row.get(7)?,
        price_per_month: row.get(8)?,
        area_in_m2: row.get(9)?,
        image_urls: row.get(10)?,
        upvoted_by: row.get(11)?,
        downvoted_by: row.get(12)?,
        is_anonymous: row.get(13)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(uid: &str, owner: &str, residency: &str) -> ReviewRecord {
        ReviewRecord {
            uid: uid.into(),
            owner_id: owner.into(),
            posted_at: Some(1_000),
            title: format!("review {uid}"),
            review_text: "ok".into(),
            grade: 3.5,
            residency_name: residency.into(),
            room_type: "STUDIO".into(),
            price_per_month: 700.0,
            area_in_m2: 15,
            image_urls: Some(String::new()),
            upvoted_by: None,
            downvoted_by: Some("user-9".into()),
            is_anonymous: false,
        }
    }

    #[test]
    fn get_missing_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_review("nope").unwrap().is_none());
    }

    #[test]
    fn insert_then_get_preserves_nulls() {
        let db = Database::open_in_memory().unwrap();
        let r = record("r1", "user-1", "Vortex");
        db.insert_review(&r).unwrap();
        assert_eq!(db.get_review("r1").unwrap(), Some(r));
    }

    #[test]
    fn update_and_delete_report_matches() {
        let db = Database::open_in_memory().unwrap();
        let mut r = record("r1", "user-1", "Vortex");
        assert!(!db.update_review(&r).unwrap());

        db.insert_review(&r).unwrap();
        r.grade = 1.0;
        assert!(db.update_review(&r).unwrap());
        assert_eq!(db.get_review("r1").unwrap().unwrap().grade, 1.0);

        assert!(db.delete_review("r1").unwrap());
        assert!(!db.delete_review("r1").unwrap());
    }

    #[test]
    fn by_residency_filters() {
        let db = Database::open_in_memory().unwrap();
        db.insert_reviews(&[
            record("r1", "user-1", "Vortex"),
            record("r2", "user-2", "Atrium"),
            record("r3", "user-1", "Vortex"),
        ])
        .unwrap();

        let vortex = db.list_reviews_by_residency("Vortex").unwrap();
        assert_eq!(vortex.len(), 2);
        assert!(vortex.iter().all(|r| r.residency_name == "Vortex"));
        assert_eq!(db.list_reviews().unwrap().len(), 3);
    }

    #[test]
    fn replace_evicts_reviews_gone_from_the_new_set() {
        let db = Database::open_in_memory().unwrap();
        db.insert_reviews(&[
            record("r1", "user-1", "Vortex"),
            record("r2", "user-1", "Vortex"),
        ])
        .unwrap();

        db.replace_reviews(&[record("r2", "user-1", "Vortex")])
            .unwrap();

        let mine = db.list_reviews_by_owner("user-1").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].uid, "r2");
    }
}
