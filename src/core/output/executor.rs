//! Executor for output plans.

use super::types::*;
use crate::error::OutputError;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::warn;

/// Writes a planned sequence to disk
pub struct OutputExecutor;

impl OutputExecutor {
    /// Execute a plan with a progress callback.
    ///
    /// Failing to create the destination directory aborts. Failures on single
    /// files are collected in the result and the remaining files still get
    /// written.
    ///
    /// An existing destination is reused as-is: files from earlier runs stay,
    /// and same-named ones are overwritten. Leftovers are counted in
    /// [`OutputResult::existing_entries`] and logged, since a listing of the
    /// folder would then interleave two sequences.
    pub fn execute<F>(
        plan: &OutputPlan,
        operation: OperationMode,
        mut on_progress: F,
    ) -> Result<OutputResult, OutputError>
    where
        F: FnMut(usize, usize, &str),
    {
        let start = Instant::now();
        let mut last_progress = Instant::now();
        const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

        fs::create_dir_all(&plan.destination_dir).map_err(|e| OutputError::CreateDirectory {
            path: plan.destination_dir.clone(),
            source: e,
        })?;

        let total = plan.len();
        let mut result = OutputResult {
            existing_entries: count_entries(&plan.destination_dir),
            ..OutputResult::default()
        };
        if result.existing_entries > 0 {
            warn!(
                dir = %plan.destination_dir.display(),
                entries = result.existing_entries,
                "output directory is not empty; earlier files are kept"
            );
        }

        for (i, file) in plan.files.iter().enumerate() {
            let now = Instant::now();
            if now.duration_since(last_progress) >= PROGRESS_INTERVAL {
                let name = file
                    .destination
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                on_progress(i + 1, total, &name);
                last_progress = now;
            }

            let outcome = match operation {
                OperationMode::Copy => fs::copy(&file.source, &file.destination),
                OperationMode::Move => move_file(&file.source, &file.destination),
            };

            match outcome {
                Ok(bytes) => {
                    result.total_size_bytes += bytes;
                    result.written.push(file.destination.clone());
                }
                Err(e) => {
                    warn!(source = %file.source.display(), error = %e, "failed to write file");
                    result.failures.push(OutputFailure {
                        source: file.source.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        on_progress(total, total, "");
        result.duration_ms = start.elapsed().as_millis() as u64;

        Ok(result)
    }
}

fn count_entries(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

/// Rename, falling back to copy + verify + delete across filesystems.
fn move_file(source: &Path, destination: &Path) -> std::io::Result<u64> {
    let source_size = fs::metadata(source)?.len();
    if fs::rename(source, destination).is_ok() {
        return Ok(source_size);
    }

    fs::copy(source, destination)?;

    let dest_size = fs::metadata(destination)?.len();
    if dest_size != source_size {
        let _ = fs::remove_file(destination);
        return Err(std::io::Error::other(format!(
            "Copy verification failed: source {} bytes, dest {} bytes",
            source_size, dest_size
        )));
    }

    fs::remove_file(source)?;
    Ok(source_size)
}
