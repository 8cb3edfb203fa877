use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use serde::Deserialize;
use serde::Serialize;

use crate::path::{MountPrefix, StorePath};
use crate::scoped::ScopedView;
use crate::tree::{self, Directory};
use crate::Error;

/// A shared handle to any store, root or scoped.
///
/// Handles only ever point toward the root: a scoped view holds a handle to
/// its parent, and no store holds handles to its children.
pub type StoreHandle<T> = Rc<dyn Store<T>>;

/// A normalized path paired with an opaque value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<T> {
    pub path: StorePath,
    pub value: T,
}

impl<T> Entry<T> {
    pub fn new(path: &str, value: T) -> Self {
        Entry {
            path: StorePath::normalize(path),
            value,
        }
    }

    /// Split into the `(path, value)` form accepted by `Store::set_entries`.
    pub fn into_pair(self) -> (String, T) {
        (self.path.into_string(), self.value)
    }
}

/// The read/write surface shared by root stores and scoped views.
///
/// Every write is a full replacement of the store's entries; the
/// `add_*`/`remove_*` helpers read the current entries, edit the copy and
/// write it back.
///
/// # Object Safety
///
/// This trait is object-safe: see [`StoreHandle`].
pub trait Store<T> {
    /// An independent snapshot of this store's entries, in insertion order.
    ///
    /// Later writes never show up in a snapshot that was already taken.
    fn entries(&self) -> Vec<Entry<T>>;

    /// Replace this store's entries.
    ///
    /// Paths are normalized. When two incoming entries share a path the later
    /// one wins and takes the later position.
    fn set_entries(&self, entries: Vec<(String, T)>);

    /// A shared handle to this store, suitable as a scoped view's parent.
    fn handle(&self) -> StoreHandle<T>;

    /// The absolute path, in root terms, that this store represents.
    fn mount_path(&self) -> StorePath;

    fn add_entry(&self, path: &str, value: T) {
        self.add_entries(vec![(path.to_string(), value)]);
    }

    fn add_entries(&self, entries: Vec<(String, T)>) {
        let mut current: Vec<(String, T)> =
            self.entries().into_iter().map(Entry::into_pair).collect();
        current.extend(entries);
        self.set_entries(current);
    }

    /// Remove the entry at `path`, returning its value if there was one.
    fn remove_entry(&self, path: &str) -> Option<T> {
        let target = StorePath::normalize(path);
        let (removed, kept): (Vec<_>, Vec<_>) =
            self.entries().into_iter().partition(|e| e.path == target);
        let removed = removed.into_iter().next()?;
        self.set_entries(kept.into_iter().map(Entry::into_pair).collect());
        Some(removed.value)
    }

    /// Remove every entry whose path is in `paths`. Returns how many were
    /// removed.
    fn remove_entries(&self, paths: &[StorePath]) -> usize {
        let current = self.entries();
        let before = current.len();
        let kept: Vec<(String, T)> = current
            .into_iter()
            .filter(|e| !paths.contains(&e.path))
            .map(Entry::into_pair)
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.set_entries(kept);
        }
        removed
    }

    /// The distinct top-level names: `/name` for files, `/name/` for
    /// directories.
    fn paths(&self) -> BTreeSet<String> {
        self.entries()
            .iter()
            .map(|e| e.path.top_level_name())
            .collect()
    }

    /// Every path currently stored.
    fn full_paths(&self) -> BTreeSet<StorePath> {
        self.entries().into_iter().map(|e| e.path).collect()
    }

    /// Exact-match lookup. The query is normalized first.
    fn get_element(&self, path: &str) -> Option<T> {
        let target = StorePath::normalize(path);
        self.entries()
            .into_iter()
            .find(|e| e.path == target)
            .map(|e| e.value)
    }

    /// Materialize the entries into a nested tree.
    fn tree(&self) -> Result<Directory<T>, Error>
    where
        T: Clone + 'static,
    {
        tree::materialize(self)
    }

    /// A scoped view of this store rooted at `prefix`.
    fn mount(&self, prefix: &str) -> ScopedView<T>
    where
        T: Clone + 'static,
    {
        ScopedView::new(self.handle(), MountPrefix::new(prefix))
    }

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Append `entry`, first dropping any entry already at the same path.
pub(crate) fn push_replacing<T>(list: &mut Vec<Entry<T>>, entry: Entry<T>) {
    if let Some(index) = list.iter().position(|e| e.path == entry.path) {
        list.remove(index);
    }
    list.push(entry);
}

/// The root store: owns the single authoritative list of entries.
///
/// `PathStore` is a cheap handle; clones share the same entries. It is meant
/// to be driven from a single thread.
///
/// # Example
///
/// ```rust
/// use routefs_store::{PathStore, Store};
///
/// let root = PathStore::new(vec![
///     ("home".to_string(), "H"),
///     ("/blog/post-1".to_string(), "P1"),
/// ]);
///
/// assert_eq!(root.get_element("/home"), Some("H"));
/// assert!(root.paths().contains("/blog/"));
/// ```
#[derive(Clone, Debug)]
pub struct PathStore<T> {
    entries: Rc<RefCell<Vec<Entry<T>>>>,
}

impl<T: Clone + 'static> PathStore<T> {
    /// Create a root store seeded with `initial`.
    pub fn new(initial: Vec<(String, T)>) -> Self {
        let store = Self::empty();
        store.set_entries(initial);
        store
    }

    pub fn empty() -> Self {
        PathStore {
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// True when both handles share the same entries.
    pub fn ptr_eq(&self, other: &PathStore<T>) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl<T: Clone + 'static> Default for PathStore<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Clone + 'static> Store<T> for PathStore<T> {
    fn entries(&self) -> Vec<Entry<T>> {
        self.entries.borrow().clone()
    }

    fn set_entries(&self, entries: Vec<(String, T)>) {
        let mut normalized = Vec::with_capacity(entries.len());
        for (path, value) in entries {
            push_replacing(&mut normalized, Entry::new(&path, value));
        }
        tracing::debug!(count = normalized.len(), "replacing root entries");
        *self.entries.borrow_mut() = normalized;
    }

    fn handle(&self) -> StoreHandle<T> {
        Rc::new(self.clone())
    }

    fn mount_path(&self) -> StorePath {
        StorePath::root()
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// How to construct a store.
pub enum StoreConfig<T> {
    /// A root store owning `initial` as its entries.
    Root { initial: Vec<(String, T)> },
    /// A view of `parent` rooted at `mount_prefix`.
    Scoped {
        parent: StoreHandle<T>,
        mount_prefix: MountPrefix,
    },
}

/// Build a store from its configuration.
pub fn open<T: Clone + 'static>(config: StoreConfig<T>) -> StoreHandle<T> {
    match config {
        StoreConfig::Root { initial } => Rc::new(PathStore::new(initial)),
        StoreConfig::Scoped {
            parent,
            mount_prefix,
        } => Rc::new(ScopedView::new(parent, mount_prefix)),
    }
}
