//! Directory expansion using walkdir.

use super::filter::{is_hidden, ImageFilter};
use crate::error::InputError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration for input resolution
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Descend into subdirectories of directory arguments
    pub recursive: bool,
    /// Descend into symlinked directories while recursing.
    ///
    /// Symlinked image files are always included.
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
}

/// Collect supported images below `root`, sorted by path.
///
/// Entries that cannot be read are returned alongside the images instead of
/// stopping the walk.
pub(super) fn walk_directory(
    root: &Path,
    config: &ScanConfig,
    filter: &ImageFilter,
) -> (Vec<PathBuf>, Vec<InputError>) {
    let mut walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name();

    if !config.recursive {
        walker = walker.max_depth(1);
    }

    let mut images = Vec::new();
    let mut errors = Vec::new();
    let entries = walker.into_iter().filter_entry(|entry| {
        entry.depth() == 0 || config.include_hidden || !is_hidden(entry.path())
    });

    for entry_result in entries {
        match entry_result {
            Ok(entry) => {
                // `Path::is_file` follows links, `DirEntry::file_type` does not
                let path = entry.path();
                if path.is_file() && filter.should_include(path) {
                    images.push(entry.into_path());
                }
            }
            Err(e) => errors.push(InputError::ReadDirectory {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                reason: e.to_string(),
            }),
        }
    }

    images.sort();
    (images, errors)
}
