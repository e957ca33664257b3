//! Filesystem discovery seam.
//!
//! All directory enumeration goes through [`FileDiscovery`] so that the
//! parser and resolver stay pure functions of the reported directory
//! contents. Tests substitute an in-memory listing.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Lists candidate files under a search root.
///
/// Selection downstream is first-match-wins, so implementations must
/// return entries in a stable order for identical directory contents.
pub trait FileDiscovery: Send + Sync {
    /// All files under `root` (recursive) whose extension matches one of
    /// `extensions` (ASCII case-insensitive), in a stable order.
    fn list(&self, root: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>>;

    /// Whether `path` exists as a regular file.
    fn exists(&self, path: &Path) -> bool;
}

/// Production discovery backed by `walkdir`. Entries are sorted lexically
/// by full path, which fixes the resolution tie-break order regardless of
/// the directory iteration order the OS happens to return.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkdirDiscovery;

impl FileDiscovery for WalkdirDiscovery {
    fn list(&self, root: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .map(|e| e.path().to_path_buf())
            .filter(|p| has_extension(p, extensions))
            .collect();

        paths.sort();
        Ok(paths)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}
