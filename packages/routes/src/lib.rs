//! Route discovery for routefs.
//!
//! Scans a routes directory for files with a given extension and turns each
//! one into a store entry keyed by its path relative to the directory, with
//! the extension stripped (`blog/post-1.ripple` becomes `/blog/post-1`).
//! [`RescanState`] tracks the previously seen file set so that file-system
//! events can be turned into store updates.

mod config;
mod error;
mod rescan;
mod scan;

pub use config::RouteScanConfig;
pub use error::ScanError;
pub use rescan::{apply_changes, RescanState, RouteChanges, WatchEvent, WatchEventKind};
pub use scan::{discover, load_text, route_key, seed_store, RouteFile};
