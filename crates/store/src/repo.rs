//! Repository for favorite records.
//!
//! Every favorite is a single row. Un-favoriting flags the row instead of
//! removing it so a bulk removal can be restored; only [`Repository::delete`]
//! and [`Repository::delete_all`] remove rows for good.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::model::{FavoriteRecord, PhotoId, SortOrder};
use crate::models::FavoriteRow;
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::instrument;

/// Repository for managing favorite records in the favorites database.
///
/// Cheap to clone. Every successful write bumps the change feed shared by all
/// repositories created from the same [`Database`], which is what keeps
/// [`watch_favorites`](Self::watch_favorites) streams up to date.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    changes: Arc<watch::Sender<u64>>,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
            changes: Arc::clone(db.changes()),
        }
    }
}
impl Repository {
    fn notify_changed(&self) {
        // `send_modify` updates the value even while nobody is watching.
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Insert a favorite record, replacing any existing row for the same photo.
    ///
    /// Re-favoriting a soft-deleted photo revives its row with the new
    /// `date_added`.
    pub async fn insert(&self, record: &FavoriteRecord) -> Result<()> {
        let row = FavoriteRow::try_from(record)?;
        sqlx::query(include_str!("../queries/upsert.sql"))
            .bind(row.photo_id)
            .bind(row.source)
            .bind(row.author)
            .bind(row.thumbnail_url)
            .bind(row.url)
            .bind(row.marked_as_deleted)
            .bind(row.date_added)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        self.notify_changed();
        Ok(())
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    /// Get the active (not soft-deleted) record for a photo.
    pub async fn get_by_id(&self, id: &PhotoId) -> Result<Option<FavoriteRecord>> {
        let row: Option<FavoriteRow> = sqlx::query_as(include_str!("../queries/get_by_id.sql"))
            .bind(id.as_ref())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(FavoriteRecord::try_from).transpose()
    }

    /// Count every row, soft-deleted ones included.
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("row count"))
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// List active favorites ordered by the date they were added.
    pub async fn list_favorites(&self, sort: SortOrder) -> Result<Vec<FavoriteRecord>> {
        // ORDER BY direction can't be bound as a parameter.
        let query = match sort {
            SortOrder::DateAddedNewest => include_str!("../queries/list_favorites_newest.sql"),
            SortOrder::DateAddedOldest => include_str!("../queries/list_favorites_oldest.sql"),
        };
        let rows: Vec<FavoriteRow> = sqlx::query_as(query)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(FavoriteRecord::try_from).collect()
    }

    /// Live view over [`list_favorites`](Self::list_favorites).
    ///
    /// Yields the current list straight away, then a fresh list after every
    /// write made through any repository sharing this database. Changes that
    /// land while a query is running trigger one more refresh rather than
    /// being lost; bursts of writes may be coalesced into a single refresh.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use futures::TryStreamExt;
    /// use photos_store::{Database, Repository, SortOrder};
    /// # async fn example() -> photos_store::error::Result<()> {
    /// let db = Database::connect_in_memory().await?;
    /// let repo = Repository::from(&db);
    /// let mut favorites = Box::pin(repo.watch_favorites(SortOrder::DateAddedNewest));
    /// while let Some(list) = favorites.try_next().await? {
    ///     println!("{} favorites", list.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn watch_favorites(&self, sort: SortOrder) -> impl Stream<Item = Result<Vec<FavoriteRecord>>> + Send + 'static {
        let repo = self.clone();
        let mut changes = self.changes.subscribe();
        stream! {
            loop {
                // Mark the current version as seen *before* querying.
                changes.borrow_and_update();
                yield repo.list_favorites(sort).await;
                if changes.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Soft-delete a single favorite. Returns `true` if a row was flagged.
    pub async fn soft_delete(&self, id: &PhotoId) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/soft_delete.sql"))
            .bind(id.as_ref())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        self.notify_changed();
        Ok(result.rows_affected() > 0)
    }

    /// Remove a single favorite row for good. Returns `true` if a row was removed.
    pub async fn delete(&self, id: &PhotoId) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/delete.sql"))
            .bind(id.as_ref())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        self.notify_changed();
        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete every favorite. Returns the number of rows touched.
    #[instrument(skip(self), level = "debug")]
    pub async fn mark_all_as_deleted(&self) -> Result<u64> {
        let result = sqlx::query(include_str!("../queries/mark_all_as_deleted.sql"))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        self.notify_changed();
        Ok(result.rows_affected())
    }

    /// Restore every soft-deleted favorite. Returns the number of rows touched.
    #[instrument(skip(self), level = "debug")]
    pub async fn unmark_all_as_deleted(&self) -> Result<u64> {
        let result = sqlx::query(include_str!("../queries/unmark_all_as_deleted.sql"))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        self.notify_changed();
        Ok(result.rows_affected())
    }

    /// Remove every row, soft-deleted or not. Returns the number of rows removed.
    #[instrument(skip(self), level = "debug")]
    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query(include_str!("../queries/delete_all.sql"))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        self.notify_changed();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Photo, PhotoSource};
    use futures::StreamExt;
    use std::time::Duration;
    use time::UtcDateTime;

    fn make_photo(id: &str) -> Photo {
        Photo::new(id, PhotoSource::Unsplash, format!("https://images.unsplash.com/{id}"))
    }

    fn make_record(id: &str, added_at: i64) -> FavoriteRecord {
        FavoriteRecord::from_photo(&make_photo(id), UtcDateTime::from_unix_timestamp(added_at).unwrap())
    }

    async fn repo() -> Repository {
        let db = Database::connect_in_memory().await.unwrap();
        Repository::from(&db)
    }

    fn ids(records: &[FavoriteRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.to_string()).collect()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repo().await;
        let record = make_record("a", 1_700_000_000);
        repo.insert(&record).await.unwrap();
        let retrieved = repo.get_by_id(&PhotoId::from("a")).await.unwrap();
        assert_eq!(retrieved, Some(record));
        assert!(repo.get_by_id(&PhotoId::from("b")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sort_orders() {
        let repo = repo().await;
        repo.insert(&make_record("middle", 1_700_000_100)).await.unwrap();
        repo.insert(&make_record("oldest", 1_700_000_000)).await.unwrap();
        repo.insert(&make_record("newest", 1_700_000_200)).await.unwrap();
        let newest = repo.list_favorites(SortOrder::DateAddedNewest).await.unwrap();
        assert_eq!(ids(&newest), ["newest", "middle", "oldest"]);
        let oldest = repo.list_favorites(SortOrder::DateAddedOldest).await.unwrap();
        assert_eq!(ids(&oldest), ["oldest", "middle", "newest"]);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_but_keeps_row() {
        let repo = repo().await;
        repo.insert(&make_record("a", 1_700_000_000)).await.unwrap();
        repo.insert(&make_record("b", 1_700_000_001)).await.unwrap();
        assert!(repo.soft_delete(&PhotoId::from("a")).await.unwrap());
        assert!(repo.get_by_id(&PhotoId::from("a")).await.unwrap().is_none());
        assert_eq!(ids(&repo.list_favorites(SortOrder::default()).await.unwrap()), ["b"]);
        assert_eq!(repo.count().await.unwrap(), 2);
        assert!(!repo.soft_delete(&PhotoId::from("missing")).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_revives_soft_deleted_row() {
        let repo = repo().await;
        repo.insert(&make_record("a", 1_700_000_000)).await.unwrap();
        repo.insert(&make_record("b", 1_700_000_050)).await.unwrap();
        repo.soft_delete(&PhotoId::from("a")).await.unwrap();
        repo.insert(&make_record("a", 1_700_000_100)).await.unwrap();
        let list = repo.list_favorites(SortOrder::DateAddedNewest).await.unwrap();
        assert_eq!(ids(&list), ["a", "b"]);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_hard_delete() {
        let repo = repo().await;
        repo.insert(&make_record("a", 1_700_000_000)).await.unwrap();
        assert!(repo.delete(&PhotoId::from("a")).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(!repo.delete(&PhotoId::from("a")).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_and_unmark_all() {
        let repo = repo().await;
        repo.insert(&make_record("a", 1_700_000_000)).await.unwrap();
        repo.insert(&make_record("b", 1_700_000_001)).await.unwrap();
        assert_eq!(repo.mark_all_as_deleted().await.unwrap(), 2);
        assert!(repo.list_favorites(SortOrder::default()).await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.unmark_all_as_deleted().await.unwrap(), 2);
        assert_eq!(ids(&repo.list_favorites(SortOrder::DateAddedOldest).await.unwrap()), ["a", "b"]);
    }

    #[tokio::test]
    async fn test_unmark_all_on_empty_store_is_harmless() {
        let repo = repo().await;
        assert_eq!(repo.unmark_all_as_deleted().await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_all() {
        let repo = repo().await;
        repo.insert(&make_record("a", 1_700_000_000)).await.unwrap();
        repo.insert(&make_record("b", 1_700_000_001)).await.unwrap();
        repo.soft_delete(&PhotoId::from("b")).await.unwrap();
        assert_eq!(repo.delete_all().await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_watch_favorites_follows_writes() {
        let repo = repo().await;
        let mut live = Box::pin(repo.watch_favorites(SortOrder::DateAddedNewest));
        let initial = live.next().await.unwrap().unwrap();
        assert!(initial.is_empty());

        let writer = repo.clone();
        writer.insert(&make_record("a", 1_700_000_000)).await.unwrap();
        let next = tokio::time::timeout(Duration::from_secs(5), live.next()).await.unwrap().unwrap().unwrap();
        assert_eq!(ids(&next), ["a"]);

        writer.soft_delete(&PhotoId::from("a")).await.unwrap();
        let next = tokio::time::timeout(Duration::from_secs(5), live.next()).await.unwrap().unwrap().unwrap();
        assert!(next.is_empty());
    }
}
