use clap::{Args, Parser, Subcommand, ValueEnum};
use photos_favorites::{PhotoSource, SortOrder};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "photos", version, about = "Manage favorite photos")]
pub struct Cli {
    /// Config file (.toml, .yaml or .json). Defaults to photos.* in the platform config directory.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging; repeat for trace output. RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List favorite photos
    List {
        /// Sort order; defaults to the configured one
        #[arg(long, value_enum)]
        sort: Option<Sort>,
        /// Keep printing the list every time it changes, until Ctrl+C
        #[arg(short, long)]
        follow: bool,
    },
    /// Flip the favorite status of a photo
    Toggle(PhotoArgs),
    /// Show whether a photo is stored as a favorite
    Check {
        /// Photo identifier
        id: String,
    },
    /// Soft-delete every favorite (restorable)
    RemoveAll,
    /// Restore every soft-deleted favorite
    Restore,
    /// Permanently delete every favorite
    Purge,
}

#[derive(Args, Debug)]
pub struct PhotoArgs {
    /// Photo identifier
    pub id: String,
    /// Full-size image URL
    #[arg(long)]
    pub url: String,
    /// API the photo came from
    #[arg(long, value_enum, default_value = "unsplash")]
    pub source: Source,
    #[arg(long)]
    pub author: Option<String>,
    /// Thumbnail URL; defaults to the full-size URL
    #[arg(long)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sort {
    Newest,
    Oldest,
}

impl From<Sort> for SortOrder {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::Newest => SortOrder::DateAddedNewest,
            Sort::Oldest => SortOrder::DateAddedOldest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    Unsplash,
    Pexels,
    Pixabay,
}

impl From<Source> for PhotoSource {
    fn from(source: Source) -> Self {
        match source {
            Source::Unsplash => PhotoSource::Unsplash,
            Source::Pexels => PhotoSource::Pexels,
            Source::Pixabay => PhotoSource::Pixabay,
        }
    }
}
