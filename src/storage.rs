//! Persisted client-side preferences.
//!
//! A single JSON object file maps string keys to arbitrary JSON values.
//! Nothing here is allowed to fail the caller: read problems become misses,
//! write problems become no-ops, and both are logged at `warn`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Preference key for the display currency code.
pub const CURRENCY_KEY: &str = "currency";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("storage file is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

type Entries = Map<String, Value>;

/// File-backed key-value store.
pub struct Storage {
    path: PathBuf,
    // Serializes writers inside this process; the file lock covers others.
    write_lock: Mutex<()>,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read storage");
                return None;
            }
        };
        let value = entries.get(key)?.clone();
        match serde_json::from_value(value) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Stored value has an unexpected shape");
                None
            }
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to serialize value for storage");
                return;
            }
        };
        self.modify("set", |entries| {
            entries.insert(key.to_string(), value);
        });
    }

    pub fn remove(&self, key: &str) {
        self.modify("remove", |entries| {
            entries.remove(key);
        });
    }

    pub fn clear(&self) {
        self.modify("clear", Entries::clear);
    }

    /// Stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        match self.read_entries() {
            Ok(entries) => {
                let mut keys: Vec<String> = entries.keys().cloned().collect();
                keys.sort();
                keys
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read storage");
                Vec::new()
            }
        }
    }

    fn modify<F>(&self, operation: &'static str, f: F)
    where
        F: FnOnce(&mut Entries),
    {
        let _guard = self.write_lock.lock();
        if let Err(e) = self.rewrite(f) {
            tracing::warn!(
                path = %self.path.display(),
                operation,
                error = %e,
                "Failed to write storage"
            );
        }
    }

    fn read_entries(&self) -> Result<Entries, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };
        parse(&content)
    }

    fn rewrite<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Entries),
    {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        file.lock_exclusive()?;
        let result = rewrite_locked(&mut file, f);
        let unlocked = FileExt::unlock(&file);
        result?;
        unlocked?;
        Ok(())
    }
}

fn rewrite_locked<F>(file: &mut File, f: F) -> Result<(), StorageError>
where
    F: FnOnce(&mut Entries),
{
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    // A corrupt file is replaced rather than blocking every later write.
    let mut entries = parse(&content).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Discarding unreadable storage contents");
        Entries::new()
    });

    f(&mut entries);

    let serialized = serde_json::to_vec_pretty(&entries)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&serialized)?;
    file.sync_data()?;
    Ok(())
}

fn parse(content: &str) -> Result<Entries, StorageError> {
    if content.trim().is_empty() {
        return Ok(Entries::new());
    }
    Ok(serde_json::from_str(content)?)
}
