//! Destination naming for the sorted sequence.

use super::types::{OutputPlan, PlannedFile};
use std::path::{Path, PathBuf};

/// Plans destination names for an ordered list of images.
///
/// Files are named `{position}_{original name}`, with the 1-based position
/// zero-padded to the width of the total count so that a plain
/// lexicographic listing shows the sequence order.
pub struct OutputPlanner;

impl OutputPlanner {
    pub fn plan(ordered: &[PathBuf], destination_dir: &Path) -> OutputPlan {
        let width = ordinal_width(ordered.len());

        let files = ordered
            .iter()
            .enumerate()
            .map(|(i, source)| {
                let position = i + 1;
                let name = format!("{:0width$}_{}", position, file_name(source), width = width);
                PlannedFile {
                    position,
                    source: source.clone(),
                    destination: destination_dir.join(name),
                }
            })
            .collect();

        OutputPlan {
            destination_dir: destination_dir.to_path_buf(),
            files,
        }
    }
}

/// Digits needed to print `count`
fn ordinal_width(count: usize) -> usize {
    count.max(1).to_string().len()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}
