//! Value table file.

use std::collections::BTreeMap;
use std::path::Path;

use super::{StorageError, read_optional, write_json};
use crate::compute::ValueTable;

/// Load the value table.
///
/// A missing file yields an empty table which is written back immediately.
/// Unparsable content yields an empty table and is left for the next save to
/// overwrite. Individual malformed rows are skipped.
pub fn load_value_table(path: &Path) -> Result<ValueTable, StorageError> {
    let Some(content) = read_optional(path)? else {
        let table = ValueTable::new();
        save_value_table(path, &table)?;
        return Ok(table);
    };

    let rows: BTreeMap<String, Vec<f64>> = match serde_json::from_str(&content) {
        Ok(rows) => rows,
        Err(e) => {
            log::warn!("Ignoring unreadable value table {}: {}", path.display(), e);
            return Ok(ValueTable::new());
        }
    };

    let (table, rejected) = ValueTable::from_text_rows(rows);
    if !rejected.is_empty() {
        log::warn!(
            "Skipped {} malformed value table rows in {}: {:?}",
            rejected.len(),
            path.display(),
            rejected
        );
    }
    Ok(table)
}

/// Rewrite the value table file in full.
pub fn save_value_table(path: &Path, table: &ValueTable) -> Result<(), StorageError> {
    write_json(path, &table.to_text_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{Action, StateKey};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_created_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("qtable.json");

        let table = load_value_table(&path).unwrap();
        assert!(table.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "{}");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("qtable.json");
        let key = StateKey {
            energy: 7,
            need: 1,
            distance: 2,
        };
        let mut table = ValueTable::new();
        table.update(key, Action::Stay, 10.0, key, 0.6, 0.9);

        save_value_table(&path, &table).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"7,1,2\""));

        let loaded = load_value_table(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!((loaded.get(&key).unwrap()[4] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_corrupt_file_gives_empty_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("qtable.json");
        std::fs::write(&path, "{\"1,1,1\": [0.0, ").unwrap();

        let table = load_value_table(&path).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_reads_original_string_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("qtable.json");
        std::fs::write(
            &path,
            r#"{"9,0,0": [1.5, 0.0, 0.0, 0.0, 2.5], "3,4,5": [0, 0, 0, -1, 0], "x": [0]}"#,
        )
        .unwrap();

        let table = load_value_table(&path).unwrap();
        assert_eq!(table.len(), 2);
    }
}
