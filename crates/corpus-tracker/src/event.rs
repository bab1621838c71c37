//! Watch-service events.

use std::path::PathBuf;

/// What the watch service observed about a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Modified,
}

/// One filesystem event delivered by the watch service.
///
/// Both kinds flow through the same tracker path: a modified event for an
/// already-tracked file is a dedup no-op here, and the content change is
/// picked up by the pipeline's hash check instead.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: EventKind,
}

impl WatchEvent {
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EventKind::Created,
        }
    }

    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EventKind::Modified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let created = WatchEvent::created("/docs/a.txt");
        assert_eq!(created.kind, EventKind::Created);
        assert_eq!(created.path, PathBuf::from("/docs/a.txt"));

        let modified = WatchEvent::modified("/docs/a.txt");
        assert_eq!(modified.kind, EventKind::Modified);
    }
}
