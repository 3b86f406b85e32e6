use crate::error::{Error, ErrorKind};
use crate::model::{FavoriteRecord, PhotoId, PhotoSource};
use exn::ResultExt;
use time::UtcDateTime;

const NANOS_PER_MILLI: i128 = 1_000_000;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FavoriteRow {
    pub(crate) photo_id: String,
    pub(crate) source: String,
    #[sqlx(default)]
    pub(crate) author: Option<String>,
    pub(crate) thumbnail_url: String,
    pub(crate) url: String,
    pub(crate) marked_as_deleted: bool,
    pub(crate) date_added: i64,
}
impl TryFrom<&FavoriteRecord> for FavoriteRow {
    type Error = Error;
    fn try_from(record: &FavoriteRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            photo_id: record.id.to_string(),
            source: record.source.to_string(),
            author: record.author.clone(),
            thumbnail_url: record.thumbnail_url.clone(),
            url: record.url.clone(),
            marked_as_deleted: record.marked_as_deleted,
            date_added: i64::try_from(record.date_added.unix_timestamp_nanos() / NANOS_PER_MILLI)
                .or_raise(|| ErrorKind::InvalidData("date added"))?,
        })
    }
}
impl TryFrom<FavoriteRow> for FavoriteRecord {
    type Error = Error;
    fn try_from(row: FavoriteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PhotoId::from(row.photo_id),
            source: row.source.parse::<PhotoSource>().or_raise(|| ErrorKind::InvalidData("photo source"))?,
            author: row.author,
            thumbnail_url: row.thumbnail_url,
            url: row.url,
            marked_as_deleted: row.marked_as_deleted,
            date_added: UtcDateTime::from_unix_timestamp_nanos(i128::from(row.date_added) * NANOS_PER_MILLI)
                .or_raise(|| ErrorKind::InvalidData("date added"))?,
        })
    }
}
