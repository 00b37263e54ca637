//! Per-run history log.

use std::path::Path;

use super::{StorageError, read_optional, write_json};
use crate::schema::RunRecord;

/// Strictly read the history: `Ok(None)` if missing, `Err` if unparsable.
///
/// Used by readers that want to retry on partial writes rather than treat
/// them as empty.
pub fn read_history(path: &Path) -> Result<Option<Vec<RunRecord>>, StorageError> {
    let Some(content) = read_optional(path)? else {
        return Ok(None);
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StorageError::Json {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Load the history; missing or unparsable files give an empty list.
pub fn load_history(path: &Path) -> Result<Vec<RunRecord>, StorageError> {
    match read_history(path) {
        Ok(history) => Ok(history.unwrap_or_default()),
        Err(StorageError::Json { source, .. }) => {
            log::warn!("Ignoring unreadable history {}: {}", path.display(), source);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Append one record, rewriting the whole file. Returns the new length.
pub fn append_history(path: &Path, record: RunRecord) -> Result<usize, StorageError> {
    let mut history = load_history(path)?;
    history.push(record);
    write_json(path, &history)?;
    Ok(history.len())
}
