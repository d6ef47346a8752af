//! Widget instance and refresh request persistence.
//!
//! Both tables live in the shared database so the app process can see which
//! widgets the OS attached and the widget process can drain refresh
//! requests the app queued.

use crate::repo::kv_repo::{StoreError, StoreResult};
use rusqlite::{params, Connection};

/// Platform widget instance identifier (Android `appWidgetId` shape).
pub type WidgetId = i64;

/// One queued refresh request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub id: i64,
    pub widget_ids: Vec<WidgetId>,
    pub requested_at_ms: i64,
}

/// SQLite repository for widget host bookkeeping in one namespace.
pub struct SqliteWidgetRepository<'conn> {
    conn: &'conn Connection,
    namespace: String,
}

impl<'conn> SqliteWidgetRepository<'conn> {
    pub fn new(conn: &'conn Connection, namespace: impl Into<String>) -> Self {
        Self {
            conn,
            namespace: namespace.into(),
        }
    }

    /// Records an attached widget instance. Re-attaching is a no-op.
    pub fn attach(&self, widget_id: WidgetId) -> StoreResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO widget_instances (namespace, widget_id) VALUES (?1, ?2);",
            params![self.namespace, widget_id],
        )?;
        Ok(())
    }

    /// Forgets a widget instance. Returns whether it was attached.
    pub fn detach(&self, widget_id: WidgetId) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM widget_instances WHERE namespace = ?1 AND widget_id = ?2;",
            params![self.namespace, widget_id],
        )?;
        Ok(changed > 0)
    }

    /// Lists attached widget ids in ascending order.
    pub fn widget_ids(&self) -> StoreResult<Vec<WidgetId>> {
        let mut stmt = self.conn.prepare(
            "SELECT widget_id FROM widget_instances WHERE namespace = ?1 ORDER BY widget_id ASC;",
        )?;
        let mut rows = stmt.query([self.namespace.as_str()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    pub fn enqueue_refresh(&self, widget_ids: &[WidgetId], requested_at_ms: i64) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO refresh_requests (namespace, widget_ids, requested_at)
             VALUES (?1, ?2, ?3);",
            params![self.namespace, join_widget_ids(widget_ids), requested_at_ms],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Returns pending requests oldest-first and deletes them.
    pub fn drain_refresh(&self) -> StoreResult<Vec<RefreshRequest>> {
        let mut requests = Vec::new();
        {
            let mut stmt = self.conn.prepare(
                "SELECT id, widget_ids, requested_at
                 FROM refresh_requests
                 WHERE namespace = ?1
                 ORDER BY id ASC;",
            )?;
            let mut rows = stmt.query([self.namespace.as_str()])?;
            while let Some(row) = rows.next()? {
                let raw_ids: String = row.get(1)?;
                requests.push(RefreshRequest {
                    id: row.get(0)?,
                    widget_ids: parse_widget_ids(&raw_ids)?,
                    requested_at_ms: row.get(2)?,
                });
            }
        }

        if let Some(last) = requests.last() {
            self.conn.execute(
                "DELETE FROM refresh_requests WHERE namespace = ?1 AND id <= ?2;",
                params![self.namespace, last.id],
            )?;
        }
        Ok(requests)
    }

    pub fn pending_refresh_count(&self) -> StoreResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM refresh_requests WHERE namespace = ?1;",
            [self.namespace.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Joins ids the way the platform diagnostics print them (`"1, 2, 3"`).
pub fn join_widget_ids(ids: &[WidgetId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_widget_ids(raw: &str) -> StoreResult<Vec<WidgetId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<WidgetId>().map_err(|_| {
                StoreError::InvalidData(format!("refresh_requests.widget_ids contains `{part}`"))
            })
        })
        .collect()
}
