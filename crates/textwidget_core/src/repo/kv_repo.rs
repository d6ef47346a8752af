//! Namespaced key/value storage contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the get/set/remove surface both the app-private area and the
//!   widget-visible shared area are built on.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every read/write is scoped to exactly one namespace.
//! - `set` is last-write-wins; no history is kept.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Key/value persistence error.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    InvalidNamespace(String),
    InvalidKey(String),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidNamespace(value) => write!(f, "invalid storage namespace `{value}`"),
            Self::InvalidKey(value) => write!(f, "invalid storage key `{value}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidNamespace(_) | Self::InvalidKey(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String key/value area, the shape of AsyncStorage, SharedPreferences and
/// app-group UserDefaults alike.
pub trait KeyValueStore {
    /// Namespace this store reads and writes.
    fn namespace(&self) -> &str;
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Removes a key. Returns whether a value existed.
    fn remove(&self, key: &str) -> StoreResult<bool>;
}

/// SQLite-backed key/value area.
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
    namespace: String,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    /// Binds a migrated connection to one namespace.
    pub fn try_new(conn: &'conn Connection, namespace: impl Into<String>) -> StoreResult<Self> {
        let namespace = namespace.into();
        let trimmed = namespace.trim();
        if trimmed.is_empty() || trimmed.len() != namespace.len() {
            return Err(StoreError::InvalidNamespace(namespace));
        }
        Ok(Self { conn, namespace })
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        ensure_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE namespace = ?1 AND key = ?2;",
                params![self.namespace, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        ensure_key(key)?;
        self.conn.execute(
            "INSERT INTO kv_entries (namespace, key, value, updated_at)
             VALUES (?1, ?2, ?3, (strftime('%s', 'now') * 1000))
             ON CONFLICT (namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.namespace, key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        ensure_key(key)?;
        let changed = self.conn.execute(
            "DELETE FROM kv_entries WHERE namespace = ?1 AND key = ?2;",
            params![self.namespace, key],
        )?;
        Ok(changed > 0)
    }
}

fn ensure_key(key: &str) -> StoreResult<()> {
    if key.trim().is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
