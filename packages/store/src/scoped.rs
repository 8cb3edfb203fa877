//! Scoped views: stores with no entries of their own that expose a subtree of
//! a parent store.

use std::fmt;
use std::rc::Rc;

use crate::path::{MountPrefix, StorePath};
use crate::store::{push_replacing, Entry, Store, StoreHandle};

/// Views the part of a parent store under a mount prefix.
///
/// Reads see the parent's entries under the prefix with the prefix stripped
/// (`/blog/post-1` appears as `/post-1` through a view mounted at `/blog/`).
/// Writes rewrite paths back to the parent's terms and replace the parent's
/// in-scope entries, which recurses until it reaches the root store.
///
/// # Example
///
/// ```rust
/// use routefs_store::{PathStore, Store};
///
/// let root = PathStore::new(vec![
///     ("/home".to_string(), "H"),
///     ("/blog/post-1".to_string(), "P1"),
/// ]);
/// let blog = root.mount("/blog/");
///
/// assert_eq!(blog.get_element("/post-1"), Some("P1"));
///
/// blog.add_entry("/post-2", "P2");
/// assert_eq!(root.get_element("/blog/post-2"), Some("P2"));
/// assert_eq!(root.get_element("/home"), Some("H"));
/// ```
#[derive(Clone)]
pub struct ScopedView<T> {
    parent: StoreHandle<T>,
    prefix: MountPrefix,
}

impl<T: Clone + 'static> ScopedView<T> {
    pub fn new(parent: StoreHandle<T>, prefix: MountPrefix) -> Self {
        ScopedView { parent, prefix }
    }

    pub fn parent(&self) -> &StoreHandle<T> {
        &self.parent
    }

    /// The prefix, in the parent's terms, this view is mounted at.
    pub fn prefix(&self) -> &MountPrefix {
        &self.prefix
    }
}

impl<T: Clone + 'static> Store<T> for ScopedView<T> {
    fn entries(&self) -> Vec<Entry<T>> {
        self.parent
            .entries()
            .into_iter()
            .filter_map(|entry| {
                let path = self.prefix.relativize(&entry.path)?;
                Some(Entry {
                    path,
                    value: entry.value,
                })
            })
            .collect()
    }

    fn set_entries(&self, entries: Vec<(String, T)>) {
        let mut merged: Vec<Entry<T>> = self
            .parent
            .entries()
            .into_iter()
            .filter(|entry| !self.prefix.contains(&entry.path))
            .collect();

        for (path, value) in entries {
            let absolute = self.prefix.absolutize(&path);
            tracing::trace!(prefix = %self.prefix, path = %absolute, "scoped write");
            push_replacing(
                &mut merged,
                Entry {
                    path: absolute,
                    value,
                },
            );
        }

        self.parent
            .set_entries(merged.into_iter().map(Entry::into_pair).collect());
    }

    fn handle(&self) -> StoreHandle<T> {
        Rc::new(self.clone())
    }

    fn mount_path(&self) -> StorePath {
        let parent = MountPrefix::new(self.parent.mount_path().as_str());
        parent.join(&self.prefix).as_path().clone()
    }
}

impl<T> fmt::Debug for ScopedView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedView")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
