//! # Scanner Module
//!
//! Resolves command-line arguments into the ordered list of images to sort.
//!
//! File arguments are checked strictly: they must exist, be regular files and
//! carry a supported extension, otherwise the run is rejected before any work
//! starts. Directory arguments expand to the supported images they contain,
//! sorted by path.
//!
//! With [`InputResolver::ignore_errors`] set, bad arguments and unreadable
//! directory entries are returned in [`ResolvedInputs::rejected`] instead.
//!
//! ## Example
//! ```rust,ignore
//! use histogram_sorter::core::scanner::{InputResolver, ScanConfig};
//!
//! let resolver = InputResolver::new(ScanConfig::default());
//! let inputs = resolver.resolve(&["shots/".into(), "cover.png".into()])?;
//! ```

mod filter;
mod walker;

pub use filter::{ImageFilter, SUPPORTED_EXTENSIONS};
pub use walker::ScanConfig;

use crate::error::InputError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Images found for a run, plus anything that was left out
#[derive(Debug, Default)]
pub struct ResolvedInputs {
    /// Absolute image paths in argument order
    pub images: Vec<PathBuf>,
    /// Arguments or directory entries that could not be used
    pub rejected: Vec<InputError>,
}

/// Turns user-supplied paths into absolute image paths
pub struct InputResolver {
    config: ScanConfig,
    filter: ImageFilter,
    ignore_errors: bool,
}

impl InputResolver {
    /// Create a new resolver with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let filter = ImageFilter::new().with_hidden(config.include_hidden);
        Self {
            config,
            filter,
            ignore_errors: false,
        }
    }

    /// Collect bad inputs instead of failing on the first one
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    /// Resolve every argument, keeping argument order.
    ///
    /// Duplicate arguments are kept; each occurrence becomes its own item.
    /// Fails with [`InputError::NoInputs`] when nothing was given or found.
    pub fn resolve(&self, paths: &[PathBuf]) -> Result<ResolvedInputs, InputError> {
        if paths.is_empty() {
            return Err(InputError::NoInputs);
        }

        let mut resolved = ResolvedInputs::default();
        for path in paths {
            let path = match absolute(path) {
                Ok(path) => path,
                Err(e) => {
                    self.reject(&mut resolved, e)?;
                    continue;
                }
            };

            if path.is_dir() {
                let (found, errors) = walker::walk_directory(&path, &self.config, &self.filter);
                debug!(dir = %path.display(), count = found.len(), "expanded directory");
                for error in errors {
                    self.reject(&mut resolved, error)?;
                }
                resolved.images.extend(found);
            } else {
                match self.check_file(&path) {
                    Ok(()) => resolved.images.push(path),
                    Err(e) => self.reject(&mut resolved, e)?,
                }
            }
        }

        if resolved.images.is_empty() && resolved.rejected.is_empty() {
            return Err(InputError::NoInputs);
        }

        Ok(resolved)
    }

    fn reject(&self, resolved: &mut ResolvedInputs, error: InputError) -> Result<(), InputError> {
        if !self.ignore_errors {
            return Err(error);
        }
        warn!(error = %error, "skipping input");
        resolved.rejected.push(error);
        Ok(())
    }

    fn check_file(&self, path: &Path) -> Result<(), InputError> {
        if !path.exists() {
            return Err(InputError::NotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(InputError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        if !self.filter.is_supported(path) {
            return Err(InputError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}

impl Default for InputResolver {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

fn absolute(path: &Path) -> Result<PathBuf, InputError> {
    std::path::absolute(path).map_err(|_| InputError::NotFound {
        path: path.to_path_buf(),
    })
}
