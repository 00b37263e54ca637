//! Launching the decoupled history viewer next to the running binary.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

/// File stem of the history viewer binary.
pub const HISTORY_VIEWER: &str = "colony-history";

/// Path of a binary named `name` in the same directory as `exe`.
pub fn sibling_binary(exe: &Path, name: &str) -> PathBuf {
    exe.with_file_name(format!("{}{}", name, std::env::consts::EXE_SUFFIX))
}

/// Start `viewer` on `history` without waiting for it.
pub fn spawn_viewer(viewer: &Path, history: &Path) -> io::Result<Child> {
    Command::new(viewer).arg(history).spawn()
}

/// Start the history viewer installed beside the current executable.
pub fn launch_history_viewer(history: &Path) -> io::Result<Child> {
    let viewer = sibling_binary(&std::env::current_exe()?, HISTORY_VIEWER);
    log::debug!("Launching {}", viewer.display());
    spawn_viewer(&viewer, history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sibling_binary_shares_directory() {
        let exe = Path::new("target").join("release").join("colony-rl");
        let viewer = sibling_binary(&exe, HISTORY_VIEWER);
        assert_eq!(viewer.parent(), exe.parent());
        assert_eq!(
            viewer.file_name().and_then(|n| n.to_str()),
            Some(format!("colony-history{}", std::env::consts::EXE_SUFFIX).as_str())
        );
    }

    #[test]
    fn test_missing_viewer_is_an_error() {
        let dir = tempdir().unwrap();
        let viewer = sibling_binary(&dir.path().join("colony-rl"), HISTORY_VIEWER);
        let result = spawn_viewer(&viewer, &dir.path().join("history.json"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
