//! Input file discovery

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use graft_config::InputConfig;

/// Finds record files by extension, directly in a directory or below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDiscovery {
    extension: String,
    recursive: bool,
}

impl InputDiscovery {
    pub fn new(extension: impl Into<String>, recursive: bool) -> Self {
        let extension = extension.into();
        Self {
            extension: extension.trim_start_matches('.').to_string(),
            recursive,
        }
    }

    pub fn from_config(config: &InputConfig) -> Self {
        Self::new(config.extension.clone(), config.recursive)
    }

    /// Matching files sorted by path. A missing directory yields no files.
    pub fn discover(&self, dir: &Path) -> Vec<PathBuf> {
        if dir.is_file() {
            return if self.matches(dir) {
                vec![dir.to_path_buf()]
            } else {
                Vec::new()
            };
        }
        if !dir.is_dir() {
            warn!("Input directory {} does not exist", dir.display());
            return Vec::new();
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(false)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && self.matches(e.path()))
            .map(|e| e.into_path())
            .collect();

        files.sort();
        debug!(
            "Found {} .{} files in {}",
            files.len(),
            self.extension,
            dir.display()
        );
        files
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}

impl Default for InputDiscovery {
    fn default() -> Self {
        Self::from_config(&InputConfig::default())
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.jsonl"), "{}\n").unwrap();
        fs::write(dir.path().join("a.jsonl"), "{}\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        fs::write(dir.path().join("nested/c.jsonl"), "{}\n").unwrap();
        fs::write(dir.path().join("nested/deeper/d.JSONL"), "{}\n").unwrap();
        fs::create_dir(dir.path().join(".cache")).unwrap();
        fs::write(dir.path().join(".cache/e.jsonl"), "{}\n").unwrap();
        dir
    }

    fn names(dir: &Path, files: Vec<PathBuf>) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(dir).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn flat_discovery_ignores_subdirectories() {
        let dir = tree();
        let files = InputDiscovery::new("jsonl", false).discover(dir.path());
        assert_eq!(names(dir.path(), files), vec!["a.jsonl", "b.jsonl"]);
    }

    #[test]
    fn recursive_discovery_is_sorted() {
        let dir = tree();
        let files = InputDiscovery::new(".jsonl", true).discover(dir.path());
        assert_eq!(
            names(dir.path(), files),
            vec!["a.jsonl", "b.jsonl", "nested/c.jsonl", "nested/deeper/d.JSONL"]
        );
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let files = InputDiscovery::default().discover(&dir.path().join("absent"));
        assert!(files.is_empty());
    }

    #[test]
    fn single_file_is_accepted() {
        let dir = tree();
        let file = dir.path().join("a.jsonl");
        assert_eq!(InputDiscovery::default().discover(&file), vec![file]);
    }
}
