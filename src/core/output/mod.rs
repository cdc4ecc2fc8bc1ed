//! Output module.
//!
//! Writes the sorted images into the destination folder, numbered in
//! sequence order.

mod executor;
mod planner;
mod types;

pub use executor::OutputExecutor;
pub use planner::OutputPlanner;
pub use types::*;
