//! Storage location and display configuration.
//!
//! # Responsibility
//! - Resolve where the app-private and widget-shared databases live.
//! - Carry the shared namespace and widget display width.
//!
//! # Invariants
//! - The primary and shared databases are different files; the app never
//!   treats the shared copy as its source of truth.

use crate::model::snapshot::DEFAULT_SHARED_NAMESPACE;
use std::path::{Path, PathBuf};

/// Directory holding the app-private database.
pub const ENV_DATA_DIR: &str = "TEXTWIDGET_DATA_DIR";
/// Directory holding the widget-visible shared database (app-group container).
pub const ENV_SHARED_DIR: &str = "TEXTWIDGET_SHARED_DIR";
/// Overrides the shared namespace.
pub const ENV_SHARED_NAMESPACE: &str = "TEXTWIDGET_SHARED_NAMESPACE";

pub const PRIMARY_DB_FILE_NAME: &str = "textwidget_app.sqlite3";
pub const SHARED_DB_FILE_NAME: &str = "textwidget_shared.sqlite3";
/// Namespace of the app-private area inside the primary database.
pub const PRIMARY_NAMESPACE: &str = "app.local";
/// Default cap for one rendered widget line, in characters.
pub const DEFAULT_LINE_WIDTH: usize = 40;

/// Resolved storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub primary_db_path: PathBuf,
    pub shared_db_path: PathBuf,
    pub shared_namespace: String,
    pub line_width: usize,
}

impl StorageConfig {
    /// Builds a config from explicit directories with default file names.
    pub fn in_dirs(data_dir: impl AsRef<Path>, shared_dir: impl AsRef<Path>) -> Self {
        Self {
            primary_db_path: data_dir.as_ref().join(PRIMARY_DB_FILE_NAME),
            shared_db_path: shared_dir.as_ref().join(SHARED_DB_FILE_NAME),
            shared_namespace: DEFAULT_SHARED_NAMESPACE.to_string(),
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    /// Resolves config from environment, falling back to the temp dir.
    ///
    /// Blank variables are treated as unset. When only the data dir is set,
    /// the shared database lives next to the primary one.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_dir = read(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        let shared_dir = read(ENV_SHARED_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.clone());

        let mut config = Self::in_dirs(&data_dir, &shared_dir);
        if let Some(namespace) = read(ENV_SHARED_NAMESPACE) {
            config.shared_namespace = namespace;
        }
        config
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.shared_namespace = namespace.into();
        self
    }

    pub fn with_line_width(mut self, width: usize) -> Self {
        self.line_width = width.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{StorageConfig, ENV_DATA_DIR, ENV_SHARED_DIR, ENV_SHARED_NAMESPACE};
    use crate::model::snapshot::DEFAULT_SHARED_NAMESPACE;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn shared_dir_defaults_to_data_dir() {
        let config = StorageConfig::from_lookup(lookup(&[(ENV_DATA_DIR, "/data/app")]));
        assert_eq!(
            config.primary_db_path,
            PathBuf::from("/data/app/textwidget_app.sqlite3")
        );
        assert_eq!(
            config.shared_db_path,
            PathBuf::from("/data/app/textwidget_shared.sqlite3")
        );
        assert_eq!(config.shared_namespace, DEFAULT_SHARED_NAMESPACE);
    }

    #[test]
    fn blank_variables_are_ignored() {
        let config = StorageConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/data/app"),
            (ENV_SHARED_DIR, "   "),
            (ENV_SHARED_NAMESPACE, "group.example.shared"),
        ]));
        assert_eq!(
            config.shared_db_path,
            PathBuf::from("/data/app/textwidget_shared.sqlite3")
        );
        assert_eq!(config.shared_namespace, "group.example.shared");
    }

    #[test]
    fn line_width_is_at_least_one() {
        let config = StorageConfig::in_dirs("/a", "/b").with_line_width(0);
        assert_eq!(config.line_width, 1);
    }
}
