//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the client starts with zero configuration.

use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "SWISSDORM_DB_PATH";
pub const PHOTO_DIR_VAR: &str = "SWISSDORM_PHOTO_DIR";
pub const LOG_VAR: &str = "SWISSDORM_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Cache database file.
    /// Env: `SWISSDORM_DB_PATH`
    /// Default: `None` (platform data directory, see `Database::new`).
    pub database_path: Option<PathBuf>,

    /// Directory staging picked photos before they are committed.
    /// Env: `SWISSDORM_PHOTO_DIR`
    /// Default: `./photos`
    pub photo_dir: PathBuf,

    /// `tracing` filter directives.  `RUST_LOG` still wins when set.
    /// Env: `SWISSDORM_LOG`
    pub log_filter: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            photo_dir: PathBuf::from("./photos"),
            log_filter: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup.  Empty values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = non_empty(lookup(DB_PATH_VAR), DB_PATH_VAR) {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(dir) = non_empty(lookup(PHOTO_DIR_VAR), PHOTO_DIR_VAR) {
            config.photo_dir = PathBuf::from(dir);
        }

        config.log_filter = non_empty(lookup(LOG_VAR), LOG_VAR);

        config
    }
}

fn non_empty(value: Option<String>, key: &str) -> Option<String> {
    match value {
        Some(v) if v.trim().is_empty() => {
            tracing::warn!(key, "empty value, using default");
            None
        }
        other => other,
    }
}
