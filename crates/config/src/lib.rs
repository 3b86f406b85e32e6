//! Layered configuration for the photos command line.
//!
//! Layers, later ones winning:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. a config file (`photos.toml`, `photos.yaml`/`.yml` or `photos.json` in
//!    the platform config directory, or an explicit path),
//! 3. `PHOTOS_*` environment variables (`PHOTOS_DATABASE`, `PHOTOS_SORT`,
//!    `PHOTOS_LOG`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use photos_store::SortOrder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "PHOTOS_";
const FILE_STEM: &str = "photos";
const FILE_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];
const DATABASE_FILE: &str = "favorites.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path of the SQLite favorites database.
    pub database: PathBuf,
    /// Order used by `list` when none is given on the command line.
    pub sort: SortOrder,
    /// Default log filter directive. `RUST_LOG` takes precedence.
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        let database = project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE));
        Self {
            database,
            sort: SortOrder::default(),
            log: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from every layer.
    ///
    /// An explicit `path` must exist. Without one, the first config file found
    /// in the platform config directory is used, if any.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let discovered;
        let path = match path {
            Some(path) => Some(path),
            None => {
                discovered = Self::default_file();
                discovered.as_deref()
            },
        };
        Self::from_figment(&Self::figment(path)?)
    }

    /// Build the layered figment, reading `path` as the file layer.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                exn::bail!(ErrorKind::Invalid("config file does not exist"));
            }
            tracing::debug!(path = %path.display(), "Loading config file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file_exact(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
                Some("json") => figment.merge(Json::file_exact(path)),
                _ => exn::bail!(ErrorKind::Invalid("config file must be .toml, .yaml, .yml or .json")),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extract and validate a configuration from an already layered figment.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("database path is empty"));
        }
        Ok(())
    }

    /// First existing `photos.{toml,yaml,yml,json}` in the platform config directory.
    pub fn default_file() -> Option<PathBuf> {
        let dir = project_dirs()?.config_dir().to_path_buf();
        FILE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{FILE_STEM}.{ext}")))
            .find(|path| path.is_file())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", FILE_STEM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sort, SortOrder::DateAddedNewest);
        assert_eq!(config.log, "info");
        assert!(config.database.ends_with(DATABASE_FILE));
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case("photos.toml", "database = \"/data/favs.db\"\nsort = \"oldest\"\n")]
    #[case("photos.yaml", "database: /data/favs.db\nsort: oldest\n")]
    #[case("photos.yml", "database: /data/favs.db\nsort: date_added_oldest\n")]
    #[case("photos.json", r#"{"database": "/data/favs.db", "sort": "oldest"}"#)]
    fn test_file_layer(#[case] name: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(name, contents)?;
            let config = Config::load(Some(Path::new(name))).unwrap();
            assert_eq!(config.database, PathBuf::from("/data/favs.db"));
            assert_eq!(config.sort, SortOrder::DateAddedOldest);
            assert_eq!(config.log, "info");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("photos.toml", "database = \"from-file.db\"\nlog = \"debug\"\n")?;
            jail.set_env("PHOTOS_DATABASE", "from-env.db");
            let config = Config::load(Some(Path::new("photos.toml"))).unwrap();
            assert_eq!(config.database, PathBuf::from("from-env.db"));
            assert_eq!(config.log, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_env_sort() {
        Jail::expect_with(|jail| {
            jail.set_env("PHOTOS_SORT", "oldest");
            let config = Config::from_figment(&Config::figment(None).unwrap()).unwrap();
            assert_eq!(config.sort, SortOrder::DateAddedOldest);
            Ok(())
        });
    }

    #[test]
    fn test_empty_database_is_invalid() {
        Jail::expect_with(|jail| {
            jail.create_file("photos.toml", "database = \"\"\n")?;
            let err = Config::load(Some(Path::new("photos.toml"))).unwrap_err();
            assert_eq!(*err, ErrorKind::Invalid("database path is empty"));
            Ok(())
        });
    }

    #[test]
    fn test_unknown_sort_fails_to_load() {
        Jail::expect_with(|jail| {
            jail.create_file("photos.toml", "sort = \"sideways\"\n")?;
            let err = Config::load(Some(Path::new("photos.toml"))).unwrap_err();
            assert_eq!(*err, ErrorKind::Load);
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_extension() {
        Jail::expect_with(|jail| {
            jail.create_file("photos.ini", "database = x\n")?;
            let err = Config::load(Some(Path::new("photos.ini"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|_jail| {
            let err = Config::load(Some(Path::new("missing.toml"))).unwrap_err();
            assert_eq!(*err, ErrorKind::Invalid("config file does not exist"));
            Ok(())
        });
    }
}
