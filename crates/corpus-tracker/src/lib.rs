//! # corpus-tracker
//!
//! Watch-event filtering and the persisted tracked-file list.
//!
//! The watch service reports raw create/modify events; `FileTracker` filters
//! them (directories, unsupported types, temp/hidden names), deduplicates by
//! canonical path, and appends accepted files to `visited_files.json`. The
//! `drain_events` worker is the channel consumer that feeds it.

pub mod event;
pub mod tracker;
pub mod worker;

pub use event::{EventKind, WatchEvent};
pub use tracker::{FileTracker, TrackerStats, SUPPORTED_EXTENSIONS, VISITED_FILES_FILE};
pub use worker::drain_events;
