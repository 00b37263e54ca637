//! High score file.

use std::path::Path;

use super::{StorageError, read_optional, write_json};
use crate::schema::HighScores;

/// Load the high scores; missing or unparsable files give zeros.
pub fn load_high_scores(path: &Path) -> Result<HighScores, StorageError> {
    let Some(content) = read_optional(path)? else {
        return Ok(HighScores::default());
    };
    Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable high scores {}: {}", path.display(), e);
        HighScores::default()
    }))
}

pub fn save_high_scores(path: &Path, scores: &HighScores) -> Result<(), StorageError> {
    write_json(path, scores)
}
