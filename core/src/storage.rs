use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::{
  history::HistoryLog,
  models::{HistoryEntry, Theme},
};

pub const HISTORY_KEY: &str = "api-playground-history-v2";
pub const THEME_KEY: &str = "api-playground-theme";

/// Opaque key-value store the engine persists history and theme through.
///
/// Errors are plain strings; the engine wraps them in `CoreError::Storage`.
pub trait KvStore: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<String>, String>;
  fn set(&self, key: &str, value: &str) -> Result<(), String>;
  fn remove(&self, key: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Default)]
pub struct StorageOptions {
  /// Path to SQLite file. If None, defaults to ~/.api-playground/storage.sqlite (or %USERPROFILE% on Windows).
  pub sqlite_path: Option<PathBuf>,
}

/// SQLite-backed store: one `settings` table of text values.
#[derive(Debug, Clone)]
pub struct Storage {
  path: PathBuf,
}

impl Storage {
  pub fn new(opts: StorageOptions) -> Result<Self, String> {
    let path = opts.sqlite_path.unwrap_or_else(default_sqlite_path);

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let conn = Connection::open(&path).map_err(|e| e.to_string())?;
    migrate(&conn).map_err(|e| e.to_string())?;
    Ok(Self { path })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn open(&self) -> Result<Connection, String> {
    Connection::open(&self.path).map_err(|e| e.to_string())
  }
}

impl KvStore for Storage {
  fn get(&self, key: &str) -> Result<Option<String>, String> {
    let conn = self.open()?;
    conn
      .query_row(
        "SELECT value FROM settings WHERE key=?1",
        params![key],
        |row| row.get::<_, String>(0),
      )
      .optional()
      .map_err(|e| e.to_string())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), String> {
    let conn = self.open()?;
    conn
      .execute(
        r#"
INSERT INTO settings(key, value)
VALUES(?1, ?2)
ON CONFLICT(key) DO UPDATE SET value=excluded.value
        "#,
        params![key, value],
      )
      .map_err(|e| e.to_string())?;
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), String> {
    let conn = self.open()?;
    conn
      .execute("DELETE FROM settings WHERE key=?1", params![key])
      .map_err(|e| e.to_string())?;
    Ok(())
  }
}

/// In-process store for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
  values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl KvStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>, String> {
    Ok(self.values.lock().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), String> {
    self.values.lock().insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), String> {
    self.values.lock().remove(key);
    Ok(())
  }
}

/// Load the history log. A missing, unreadable or corrupt blob yields an empty log.
pub(crate) fn load_history(store: &dyn KvStore, limit: usize) -> HistoryLog {
  let raw = match store.get(HISTORY_KEY) {
    Ok(Some(raw)) => raw,
    Ok(None) => return HistoryLog::new(limit),
    Err(e) => {
      tracing::warn!(error = %e, "failed to read history; starting empty");
      return HistoryLog::new(limit);
    }
  };
  match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
    Ok(entries) => HistoryLog::from_entries(entries, limit),
    Err(e) => {
      tracing::warn!(error = %e, "stored history is not valid; starting empty");
      HistoryLog::new(limit)
    }
  }
}

pub(crate) fn save_history(store: &dyn KvStore, log: &HistoryLog) -> Result<(), String> {
  let json = serde_json::to_string(log.entries()).map_err(|e| e.to_string())?;
  store.set(HISTORY_KEY, &json)
}

pub(crate) fn load_theme(store: &dyn KvStore) -> Theme {
  match store.get(THEME_KEY) {
    Ok(raw) => Theme::parse_or_default(raw.as_deref()),
    Err(e) => {
      tracing::warn!(error = %e, "failed to read theme; using default");
      Theme::default()
    }
  }
}

pub(crate) fn save_theme(store: &dyn KvStore, theme: Theme) -> Result<(), String> {
  store.set(THEME_KEY, theme.as_str())
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
  conn.execute_batch(
    r#"
CREATE TABLE IF NOT EXISTS settings(
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL
);
    "#,
  )?;
  Ok(())
}

fn default_sqlite_path() -> PathBuf {
  // - macOS/Linux: $HOME/.api-playground/storage.sqlite
  // - Windows: %USERPROFILE%\.api-playground\storage.sqlite
  let base = std::env::var_os("HOME")
    .or_else(|| std::env::var_os("USERPROFILE"))
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("."));
  base.join(".api-playground").join("storage.sqlite")
}
