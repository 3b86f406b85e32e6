//! photos: command-line front end for the favorites store.
//!
//! Every command goes through the favorites coordinator, so a toggle is
//! visible (and printed) before its background write lands; the command then
//! waits for the write before exiting.

mod cli;

use std::fmt::Debug;
use std::pin::pin;

use clap::Parser;
use futures::StreamExt;
use miette::{IntoDiagnostic, WrapErr, miette};
use photos_config::Config;
use photos_favorites::{Favorites, Photo, PhotoId, PendingWrite, SortOrder};
use photos_store::{Database, Repository};
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, PhotoArgs};

/// Errors from the library crates carry an `exn` tree; its debug rendering
/// shows every frame with its location.
fn report(err: impl Debug) -> miette::Report {
    miette!("{err:?}")
}

fn log_filter(config: &Config, verbose: u8) -> &str {
    match verbose {
        0 => config.log.as_str(),
        1 => "debug",
        _ => "trace",
    }
}

fn print_photo(photo: &Photo) {
    println!(
        "{}\t{}\t{}\t{}",
        photo.id,
        photo.source,
        photo.author.as_deref().unwrap_or("-"),
        photo.url
    );
}

fn print_list(photos: &[Photo]) {
    if photos.is_empty() {
        println!("No favorites");
    }
    photos.iter().for_each(print_photo);
}

async fn wait_for(write: PendingWrite, what: &str) -> miette::Result<()> {
    if write.wait().await {
        Ok(())
    } else {
        Err(miette!("Failed to {what}; see the log for details"))
    }
}

async fn run_list(favorites: &Favorites, sort: SortOrder, follow: bool) -> miette::Result<()> {
    let mut updates = pin!(favorites.query_favorites(sort));
    if !follow {
        if let Some(photos) = updates.next().await {
            print_list(&photos.map_err(report)?);
        }
        return Ok(());
    }

    let mut interrupt = pin!(tokio::signal::ctrl_c());
    loop {
        tokio::select! {
            _ = &mut interrupt => {
                tracing::debug!("Interrupted, no longer following favorites");
                return Ok(());
            }
            next = updates.next() => match next {
                Some(photos) => {
                    println!("--- {sort} ---");
                    print_list(&photos.map_err(report)?);
                }
                None => return Ok(()),
            },
        }
    }
}

async fn run_toggle(favorites: &Favorites, args: PhotoArgs) -> miette::Result<()> {
    let mut photo = Photo::new(args.id, args.source.into(), args.url);
    if let Some(author) = args.author {
        photo = photo.with_author(author);
    }
    if let Some(thumbnail) = args.thumbnail {
        photo = photo.with_thumbnail_url(thumbnail);
    }
    let photo = favorites.populate_favorite(photo).await.map_err(report)?;
    let write = favorites.toggle_favorite(&photo);
    let favorite = favorites.is_favorite(&photo);
    wait_for(write, "save favorite status").await?;
    println!("{}: {}", photo.id, if favorite { "favorite" } else { "not favorite" });
    Ok(())
}

/// Reads the record itself rather than going through
/// `Favorites::is_favorite_from_store` so it can print `date_added`; both read
/// only active rows and ignore the overlay.
async fn run_check(store: &Repository, id: String) -> miette::Result<()> {
    let id = PhotoId::from(id);
    match store.get_by_id(&id).await.map_err(report)? {
        Some(record) => {
            let added = record.date_added.format(&Rfc3339).into_diagnostic()?;
            println!("{id}: favorite since {added}");
        },
        None => println!("{id}: not favorite"),
    }
    Ok(())
}

async fn run(command: Command, config: &Config, store: &Repository, favorites: &Favorites) -> miette::Result<()> {
    match command {
        Command::List { sort, follow } => {
            let sort = sort.map(SortOrder::from).unwrap_or(config.sort);
            run_list(favorites, sort, follow).await
        },
        Command::Toggle(args) => run_toggle(favorites, args).await,
        Command::Check { id } => run_check(store, id).await,
        Command::RemoveAll => {
            if favorites.mark_all_as_removed().await.map_err(report)? {
                println!("Removed all favorites (undo with `photos restore`)");
            } else {
                println!("Nothing to remove");
            }
            Ok(())
        },
        Command::Restore => {
            wait_for(favorites.unmark_all_as_removed(), "restore favorites").await?;
            println!("Restored removed favorites");
            Ok(())
        },
        Command::Purge => {
            wait_for(favorites.remove_all_favorites(), "delete favorites").await?;
            println!("Deleted all favorites");
            Ok(())
        },
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).map_err(report)?;

    let filter = log_filter(&config, cli.verbose);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    if let Some(parent) = config.database.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not create {}", parent.display()))?;
    }
    tracing::debug!(database = %config.database.display(), "Opening favorites database");
    let db = Database::connect(&config.database).await.map_err(report)?;
    let store = Repository::from(&db);
    let favorites = Favorites::new(store.clone());

    let result = run(cli.command, &config, &store, &favorites).await;
    favorites.shutdown().await;
    db.close().await;
    result
}
