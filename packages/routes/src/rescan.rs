use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use routefs_store::{Store, StorePath};

use crate::scan::{discover, route_key, RouteFile};
use crate::{RouteScanConfig, ScanError};

/// What happened to a watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Add,
    Change,
    Unlink,
}

/// A file-system notification for a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub path: PathBuf,
}

impl WatchEvent {
    pub fn new(kind: WatchEventKind, path: impl Into<PathBuf>) -> Self {
        WatchEvent {
            kind,
            path: path.into(),
        }
    }
}

/// The route files that appeared, disappeared or changed since the last scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteChanges {
    pub added: Vec<RouteFile>,
    pub removed: Vec<RouteFile>,
    pub changed: Vec<RouteFile>,
}

impl RouteChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// The file set seen by the previous scan.
///
/// Owned by whoever drives the rescans; each watcher keeps its own.
#[derive(Debug, Clone, Default)]
pub struct RescanState {
    previous: BTreeSet<PathBuf>,
}

impl RescanState {
    /// Start with no known files, so the first relevant event reports every
    /// route file as added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing scan, e.g. the one used to seed the store.
    pub fn from_files(files: &[RouteFile]) -> Self {
        RescanState {
            previous: files.iter().map(|r| r.file.clone()).collect(),
        }
    }

    pub fn previous(&self) -> impl Iterator<Item = &Path> {
        self.previous.iter().map(PathBuf::as_path)
    }

    /// Rescan after `event` and report what changed.
    ///
    /// Events for files without the configured extension are ignored.
    /// Returns `None` when nothing changed; the remembered file set is only
    /// updated when something did.
    pub fn observe(
        &mut self,
        config: &RouteScanConfig,
        event: &WatchEvent,
    ) -> Result<Option<RouteChanges>, ScanError> {
        if !config.matches(&event.path) {
            return Ok(None);
        }

        let current = discover(config)?;
        let current_files: BTreeSet<PathBuf> = current.iter().map(|r| r.file.clone()).collect();

        let added: Vec<RouteFile> = current
            .iter()
            .filter(|r| !self.previous.contains(&r.file))
            .cloned()
            .collect();
        let removed: Vec<RouteFile> = self
            .previous
            .difference(&current_files)
            .filter_map(|file| to_route_file(config, file))
            .collect();
        let changed: Vec<RouteFile> = match event.kind {
            WatchEventKind::Change => to_route_file(config, &event.path).into_iter().collect(),
            WatchEventKind::Add | WatchEventKind::Unlink => Vec::new(),
        };

        let changes = RouteChanges {
            added,
            removed,
            changed,
        };
        if changes.is_empty() {
            return Ok(None);
        }

        tracing::info!(
            added = changes.added.len(),
            removed = changes.removed.len(),
            changed = changes.changed.len(),
            "route files changed"
        );
        self.previous = current_files;
        Ok(Some(changes))
    }
}

fn to_route_file(config: &RouteScanConfig, file: &Path) -> Option<RouteFile> {
    let key = route_key(&config.root, file, &config.extension)?;
    Some(RouteFile {
        key,
        file: file.to_path_buf(),
    })
}

/// Bring `store` in line with `changes`.
///
/// Every added or changed file is loaded before the store is touched, so a
/// loader failure leaves the store as it was.
pub fn apply_changes<T, S, F>(
    store: &S,
    changes: &RouteChanges,
    mut loader: F,
) -> Result<(), ScanError>
where
    S: Store<T> + ?Sized,
    F: FnMut(&RouteFile) -> Result<T, ScanError>,
{
    let mut updates = Vec::with_capacity(changes.added.len() + changes.changed.len());
    for route in changes.added.iter().chain(&changes.changed) {
        updates.push((route.key.clone(), loader(route)?));
    }

    let removed: Vec<StorePath> = changes
        .removed
        .iter()
        .map(|r| StorePath::normalize(&r.key))
        .collect();
    if !removed.is_empty() {
        store.remove_entries(&removed);
    }
    if !updates.is_empty() {
        store.add_entries(updates);
    }
    Ok(())
}
