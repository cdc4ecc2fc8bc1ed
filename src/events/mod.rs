//! # Events Module
//!
//! Progress reporting through channels, so the CLI (or any other front end)
//! can follow a run without the core knowing about it.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Extract(ExtractEvent::Progress(p)) = event {
//!             println!("Read {}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! sorter.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
