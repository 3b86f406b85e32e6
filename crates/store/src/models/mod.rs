mod favorite;

pub(crate) use self::favorite::FavoriteRow;
