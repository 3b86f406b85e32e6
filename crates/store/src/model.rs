//! Photo and favorite record models.
//!
//! [`Photo`] is what the fetch layer hands out and the UI reads; its
//! `favorite` flag is only the last-known persisted status. [`FavoriteRecord`]
//! is the persisted counterpart of a favorited photo.

use crate::error::{Error, ErrorKind};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use time::UtcDateTime;

/// Stable identifier of a photo, unique across sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
pub struct PhotoId(String);
impl From<&str> for PhotoId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
impl AsRef<str> for PhotoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Remote API a photo was fetched from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum PhotoSource {
    #[default]
    #[display("unsplash")]
    Unsplash,
    #[display("pexels")]
    Pexels,
    #[display("pixabay")]
    Pixabay,
}
impl FromStr for PhotoSource {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unsplash" => Ok(Self::Unsplash),
            "pexels" => Ok(Self::Pexels),
            "pixabay" => Ok(Self::Pixabay),
            _ => exn::bail!(ErrorKind::Unrecognised(s.to_string())),
        }
    }
}

/// Ordering of the favorites list by the date each photo was favorited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[display("newest")]
    #[serde(rename = "newest", alias = "date_added_newest")]
    DateAddedNewest,
    #[display("oldest")]
    #[serde(rename = "oldest", alias = "date_added_oldest")]
    DateAddedOldest,
}
impl FromStr for SortOrder {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" | "date_added_newest" => Ok(Self::DateAddedNewest),
            "oldest" | "date_added_oldest" => Ok(Self::DateAddedOldest),
            _ => exn::bail!(ErrorKind::Unrecognised(s.to_string())),
        }
    }
}

/// A photo as handed out by the fetch layer.
///
/// Two photos are the same photo when their identifiers match; the remaining
/// fields (including `favorite`) do not take part in equality or hashing.
#[derive(Debug, Clone)]
pub struct Photo {
    pub id: PhotoId,
    pub source: PhotoSource,
    pub author: Option<String>,
    pub thumbnail_url: String,
    pub url: String,
    /// Last-known persisted favorite status.
    pub favorite: bool,
}
impl Photo {
    pub fn new(id: impl Into<PhotoId>, source: PhotoSource, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: id.into(),
            source,
            author: None,
            thumbnail_url: url.clone(),
            url,
            favorite: false,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_thumbnail_url(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = thumbnail_url.into();
        self
    }

    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }
}
impl PartialEq for Photo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Photo {}
impl Hash for Photo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Persisted counterpart of a favorited photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRecord {
    pub id: PhotoId,
    pub source: PhotoSource,
    pub author: Option<String>,
    pub thumbnail_url: String,
    pub url: String,
    /// Soft-delete marker; flagged rows are hidden from every favorites query.
    pub marked_as_deleted: bool,
    pub date_added: UtcDateTime,
}
impl FavoriteRecord {
    /// Build an active record for `photo`, added at `date_added`.
    pub fn from_photo(photo: &Photo, date_added: UtcDateTime) -> Self {
        Self {
            id: photo.id.clone(),
            source: photo.source,
            author: photo.author.clone(),
            thumbnail_url: photo.thumbnail_url.clone(),
            url: photo.url.clone(),
            marked_as_deleted: false,
            date_added,
        }
    }
}
impl From<FavoriteRecord> for Photo {
    fn from(record: FavoriteRecord) -> Self {
        Self {
            id: record.id,
            source: record.source,
            author: record.author,
            thumbnail_url: record.thumbnail_url,
            url: record.url,
            favorite: !record.marked_as_deleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case("newest", SortOrder::DateAddedNewest)]
    #[case("NEWEST", SortOrder::DateAddedNewest)]
    #[case("date_added_newest", SortOrder::DateAddedNewest)]
    #[case("oldest", SortOrder::DateAddedOldest)]
    #[case("DATE_ADDED_OLDEST", SortOrder::DateAddedOldest)]
    fn test_sort_order_from_str(#[case] test: &str, #[case] expected: SortOrder) {
        assert_eq!(test.parse::<SortOrder>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("random")]
    #[case("newest ")]
    fn test_sort_order_from_str_invalid(#[case] test: &str) {
        assert!(test.parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_order_default_is_newest() {
        assert_eq!(SortOrder::default(), SortOrder::DateAddedNewest);
    }

    #[rstest]
    #[case(PhotoSource::Unsplash)]
    #[case(PhotoSource::Pexels)]
    #[case(PhotoSource::Pixabay)]
    fn test_photo_source_display_parses_back(#[case] source: PhotoSource) {
        assert_eq!(source.to_string().parse::<PhotoSource>().unwrap(), source);
    }

    #[test]
    fn test_photo_identity_ignores_favorite_flag() {
        let a = Photo::new("abc", PhotoSource::Unsplash, "https://example.com/a.jpg");
        let b = a.clone().with_favorite(true).with_author("someone");
        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_record_to_photo_carries_active_state() {
        let photo = Photo::new("abc", PhotoSource::Pexels, "https://example.com/a.jpg");
        let mut record = FavoriteRecord::from_photo(&photo, UtcDateTime::now());
        assert!(Photo::from(record.clone()).favorite);
        record.marked_as_deleted = true;
        assert!(!Photo::from(record).favorite);
    }
}
