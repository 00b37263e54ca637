//! On-disk persistence of the value table, high scores and run history.
//!
//! All three artifacts are pretty-printed JSON files living in one data
//! directory:
//!
//! ```text
//! qtable.json      {"energy,need,distance": [up, down, left, right, stay], ...}
//! highscores.json  {"max_steps": u64, "max_births": u64, "max_q": f64}
//! history.json     [{"steps": u64, "births": u64, "max_q": f64}, ...]
//! ```
//!
//! Missing files are never an error: loaders substitute an empty table, zeroed
//! high scores or an empty history. Unparsable content is logged and treated
//! the same way; it is overwritten by the next save.

mod history;
mod scores;
mod table;

use std::io;
use std::path::{Path, PathBuf};

pub use history::{append_history, load_history, read_history};
pub use scores::{load_high_scores, save_high_scores};
pub use table::{load_value_table, save_value_table};

/// File name of the persisted value table.
pub const VALUE_TABLE_FILE: &str = "qtable.json";
/// File name of the persisted high scores.
pub const HIGH_SCORE_FILE: &str = "highscores.json";
/// File name of the per-run history log.
pub const HISTORY_FILE: &str = "history.json";

/// Errors writing (or unexpectedly failing to read) persisted files.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Paths of the three persisted artifacts.
#[derive(Debug, Clone)]
pub struct Storage {
    pub value_table: PathBuf,
    pub high_scores: PathBuf,
    pub history: PathBuf,
}

impl Storage {
    /// Standard file names inside `dir`, creating the directory if needed.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        Ok(Self {
            value_table: dir.join(VALUE_TABLE_FILE),
            high_scores: dir.join(HIGH_SCORE_FILE),
            history: dir.join(HISTORY_FILE),
        })
    }
}

/// Read a file, mapping "not found" to `None`.
fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::io(path, e)),
    }
}

/// Serialize `value` as pretty JSON and replace the file with it.
fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| StorageError::json(path, e))?;
    std::fs::write(path, json).map_err(|e| StorageError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_in_dir_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("runs").join("colony");
        let storage = Storage::in_dir(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.history, nested.join("history.json"));
    }

    #[test]
    fn test_read_optional_missing() {
        let dir = tempdir().unwrap();
        assert!(read_optional(&dir.path().join("nope.json")).unwrap().is_none());
    }
}
