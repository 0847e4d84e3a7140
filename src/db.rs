use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

pub const DB_FILE: &str = "classroom.sqlite3";

/// String-keyed durable slots, one per collection.
pub trait SlotStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    /// Short label for health output.
    fn mode(&self) -> &'static str;
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS slots(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub struct SqliteSlots {
    conn: Connection,
}

impl SqliteSlots {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            conn: open_db(workspace)?,
        })
    }

    pub fn updated_at(&self, key: &str) -> anyhow::Result<Option<String>> {
        let v = self
            .conn
            .query_row("SELECT updated_at FROM slots WHERE key = ?", [key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(v)
    }
}

impl SlotStore for SqliteSlots {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let v = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?", [key], |r| r.get(0))
            .optional()?;
        Ok(v)
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO slots(key, value, updated_at) VALUES(?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value, &now),
        )?;
        tracing::debug!(key, bytes = value.len(), "slot written");
        Ok(())
    }

    fn mode(&self) -> &'static str {
        "sqlite"
    }
}

/// Session-only slots. Used before a workspace is selected and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySlots {
    slots: BTreeMap<String, String>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, key: &str, value: &str) -> Self {
        self.slots.insert(key.to_string(), value.to_string());
        self
    }
}

impl SlotStore for MemorySlots {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn mode(&self) -> &'static str {
        "memory"
    }
}
