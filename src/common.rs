use anyhow::Context;
use async_trait::async_trait;
use std::{
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

use crate::table::Table;

/// The per-record logic plugged into the map and reduce workers.
pub trait MapReduceApp: Send + Sync {
    /// Key to count for one input line, or `None` to skip the line.
    fn map(&self, line: &str) -> Option<String>;
    /// Numeric prefix deciding which reducer owns `key`.
    fn partition_key(&self, key: &str) -> i64;
    /// Size of the numeric domain split between reducers.
    fn key_space(&self) -> usize;
}

#[async_trait]
pub trait MapReduce {
    /// Runs both phases and returns the final tables, one per reducer.
    async fn run(self) -> anyhow::Result<Vec<Table>>;
}

pub enum Task {
    /// output artifact, input files
    Map(PathBuf, Vec<PathBuf>),
    /// intermediate dir, output artifact, key range
    Reduce(PathBuf, PathBuf, Range<i64>),
}

impl Task {
    pub fn output(&self) -> &Path {
        match self {
            Task::Map(output, _) => output.as_path(),
            Task::Reduce(_, output, _) => output.as_path(),
        }
    }
}

/// Every entry of `input_dir`, sorted by path.
pub fn read_files_from_dir(input_dir: impl AsRef<Path>) -> anyhow::Result<Vec<PathBuf>> {
    let input_dir = input_dir.as_ref();
    let mut input: Vec<_> = Vec::new();
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to open directory {}", input_dir.display()))?;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to list directory {}", input_dir.display()))?;
        input.push(entry.path());
    }
    input.sort();
    Ok(input)
}

/// Removes whatever is at `dir` and creates it empty.
pub fn fresh_dir(dir: impl AsRef<Path>) -> anyhow::Result<()> {
    let dir = dir.as_ref();
    if dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("failed to clear {}", dir.display()))?;
    }
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_entries_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["c.log", "a.log", "b.log"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let files = read_files_from_dir(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.log", "b.log", "c.log"]);
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_files_from_dir(dir.path().join("missing")).is_err());
    }

    #[test]
    fn fresh_dir_drops_stale_files() {
        let dir = TempDir::new().unwrap();
        let staging = dir.path().join("intermediate");
        fs::create_dir(&staging).unwrap();
        fs::write(staging.join("7"), "stale").unwrap();

        fresh_dir(&staging).unwrap();
        assert!(staging.is_dir());
        assert_eq!(fs::read_dir(&staging).unwrap().count(), 0);
    }
}
