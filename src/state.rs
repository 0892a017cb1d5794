//! Persisted terminal state: one scalar per plain text file.

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::Result;

/// Default directory for state files and the bookmark database.
pub const DEFAULT_STATE_DIR: &str = "./DBTerminal";

/// The scalar values persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKey {
    /// Last executed, semicolon-terminated statement
    LastSql,
    /// Working database used when `-db` is omitted
    DefaultPath,
}

impl StateKey {
    pub fn file_name(self) -> &'static str {
        match self {
            StateKey::LastSql => "lastSql.txt",
            StateKey::DefaultPath => "defaultPath.txt",
        }
    }
}

/// Flat key-value store backed by one text file per key.
#[derive(Debug, Clone)]
pub struct StateFiles {
    dir: PathBuf,
}

impl StateFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, key: StateKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Read a value; `Ok(None)` when it was never written.
    pub fn read(&self, key: StateKey) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Overwrite a value.
    pub fn write(&self, key: StateKey, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)?;
        debug!(file = key.file_name(), bytes = value.len(), "state written");
        Ok(())
    }

    /// Last executed SQL, empty when nothing has run yet.
    pub fn last_sql(&self) -> Result<String> {
        Ok(self.read(StateKey::LastSql)?.unwrap_or_default())
    }

    pub fn set_last_sql(&self, sql: &str) -> Result<()> {
        self.write(StateKey::LastSql, sql)
    }

    /// Persisted default working database, if any. Blank files count as unset.
    pub fn default_path(&self) -> Result<Option<PathBuf>> {
        Ok(self
            .read(StateKey::DefaultPath)?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from))
    }

    pub fn set_default_path(&self, path: &Path) -> Result<()> {
        self.write(StateKey::DefaultPath, &path.to_string_lossy())
    }
}

impl Default for StateFiles {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_files_read_as_unset() {
        let dir = tempdir().unwrap();
        let state = StateFiles::new(dir.path());
        assert_eq!(state.last_sql().unwrap(), "");
        assert_eq!(state.default_path().unwrap(), None);
    }

    #[test]
    fn writes_overwrite_instead_of_appending() {
        let dir = tempdir().unwrap();
        let state = StateFiles::new(dir.path().join("nested"));
        state.set_last_sql("SELECT 1;").unwrap();
        state.set_last_sql("SELECT 2;").unwrap();
        assert_eq!(state.last_sql().unwrap(), "SELECT 2;");
        let raw = std::fs::read_to_string(state.path(StateKey::LastSql)).unwrap();
        assert_eq!(raw, "SELECT 2;");
    }

    #[test]
    fn default_path_is_trimmed_and_blank_is_unset() {
        let dir = tempdir().unwrap();
        let state = StateFiles::new(dir.path());
        std::fs::write(state.path(StateKey::DefaultPath), "  \n").unwrap();
        assert_eq!(state.default_path().unwrap(), None);

        std::fs::write(state.path(StateKey::DefaultPath), "/tmp/work.db\n").unwrap();
        assert_eq!(state.default_path().unwrap(), Some(PathBuf::from("/tmp/work.db")));
    }
}
