//! SQLite record store for favorited photos.
//!
//! This crate is the authoritative source of favorite status. It knows nothing
//! about in-process caching: whatever the favorites coordinator shows the user
//! before a write lands is its own business.
//!
//! # Architecture
//! - **FavoriteRecord**: one row per favorited photo, keyed by photo id, with
//!   a soft-delete flag and the date it was added. Un-favoriting and bulk
//!   removal flag rows; only an explicit hard delete removes them.
//! - **Change feed**: every write through a [`Repository`] bumps a counter
//!   shared by all repositories of the same [`Database`], which drives the
//!   live [`Repository::watch_favorites`] view.

mod db;
pub mod error;
mod model;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::model::{FavoriteRecord, Photo, PhotoId, PhotoSource, SortOrder};
pub use crate::repo::Repository;
