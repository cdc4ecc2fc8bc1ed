//! # imgsort CLI
//!
//! Command-line interface for the histogram sorter.
//!
//! ## Usage
//! ```bash
//! imgsort holiday/*.jpg --path sorted --bins 16 --threads 4
//! imgsort shots/ --ignore-errors --dry-run --output json
//! ```

mod cli;

use histogram_sorter::Result;

fn main() -> Result<()> {
    cli::run()
}
