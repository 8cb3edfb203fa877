//! Materialize a store's flat entries into a nested leaf/directory tree.
//!
//! Trees are built on demand and never cached: every call walks the store's
//! current entries. Each directory keeps a handle to the scoped view that
//! reproduces its contents, so any subtree can be rebuilt fresh with
//! [`Directory::refresh`], and writes through that handle land in the same
//! root store.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use std::rc::Rc;

use crate::error::{ConflictKind, Error};
use crate::path::{MountPrefix, StorePath};
use crate::scoped::ScopedView;
use crate::store::{Entry, Store, StoreHandle};

/// A node in a materialized tree.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeNode<T> {
    Leaf(T),
    Directory(Directory<T>),
}

impl<T> TreeNode<T> {
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            TreeNode::Leaf(value) => Some(value),
            TreeNode::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&Directory<T>> {
        match self {
            TreeNode::Leaf(_) => None,
            TreeNode::Directory(dir) => Some(dir),
        }
    }

    pub fn into_leaf(self) -> Option<T> {
        match self {
            TreeNode::Leaf(value) => Some(value),
            TreeNode::Directory(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, TreeNode::Directory(_))
    }
}

/// A directory node.
///
/// Children are keyed by a single segment: `/name` for a leaf, `/name/` for a
/// subdirectory, and `/` for an entry whose path ends at this directory.
#[derive(Clone)]
pub struct Directory<T> {
    children: BTreeMap<String, TreeNode<T>>,
    store: StoreHandle<T>,
}

impl<T> Directory<T> {
    fn new(store: StoreHandle<T>) -> Self {
        Directory {
            children: BTreeMap::new(),
            store,
        }
    }

    /// The store whose entries this directory was built from.
    pub fn store(&self) -> &StoreHandle<T> {
        &self.store
    }

    pub fn get(&self, key: &str) -> Option<&TreeNode<T>> {
        self.children.get(key)
    }

    /// The value stored under `key`, if `key` names a leaf.
    pub fn leaf(&self, key: &str) -> Option<&T> {
        self.get(key)?.as_leaf()
    }

    /// The subdirectory under `key`, if `key` names a directory.
    pub fn directory(&self, key: &str) -> Option<&Directory<T>> {
        self.get(key)?.as_directory()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.children.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, TreeNode<T>> {
        self.children.iter()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<T: Clone + 'static> Directory<T> {
    /// Rebuild this directory from the current contents of its store.
    pub fn refresh(&self) -> Result<Directory<T>, Error> {
        materialize(self.store.as_ref())
    }

    /// Every leaf below this directory, keyed by its path relative to the
    /// directory's store.
    pub fn flatten(&self) -> BTreeMap<String, T> {
        let mut out = BTreeMap::new();
        self.collect_leaves("", &mut out);
        out
    }

    fn collect_leaves(&self, base: &str, out: &mut BTreeMap<String, T>) {
        for (key, node) in &self.children {
            match node {
                TreeNode::Leaf(value) => {
                    out.insert(format!("{}{}", base, key), value.clone());
                }
                TreeNode::Directory(dir) => {
                    let nested = format!("{}{}", base, key.trim_end_matches('/'));
                    dir.collect_leaves(&nested, out);
                }
            }
        }
    }
}

impl<T: PartialEq> PartialEq for Directory<T> {
    /// Structural equality; the backing stores are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl<T: fmt::Debug> fmt::Debug for Directory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directory")
            .field("mount", &self.store.mount_path())
            .field("children", &self.children)
            .finish()
    }
}

impl<T> Index<&str> for Directory<T> {
    type Output = TreeNode<T>;

    fn index(&self, key: &str) -> &Self::Output {
        match self.children.get(key) {
            Some(node) => node,
            None => panic!("no tree node at key '{}'", key),
        }
    }
}

impl<T> Index<&str> for TreeNode<T> {
    type Output = TreeNode<T>;

    fn index(&self, key: &str) -> &Self::Output {
        match self {
            TreeNode::Directory(dir) => &dir[key],
            TreeNode::Leaf(_) => panic!("cannot index into a leaf with key '{}'", key),
        }
    }
}

/// Build a tree from `store`'s current entries.
///
/// Fails with [`Error::StructuralConflict`] when a path is needed both as a
/// leaf and as a directory. The store is only read, so a failed build leaves
/// it untouched.
pub fn materialize<T, S>(store: &S) -> Result<Directory<T>, Error>
where
    T: Clone + 'static,
    S: Store<T> + ?Sized,
{
    let entries = store.entries();
    tracing::debug!(
        mount = %store.mount_path(),
        count = entries.len(),
        "materializing tree"
    );

    let mut root = Directory::new(store.handle());
    for entry in entries {
        if let Err(e) = insert(&mut root, entry) {
            tracing::warn!(error = %e, "tree materialization aborted");
            return Err(e);
        }
    }
    Ok(root)
}

fn insert<T: Clone + 'static>(root: &mut Directory<T>, entry: Entry<T>) -> Result<(), Error> {
    if entry.path.is_root() {
        root.children
            .insert("/".to_string(), TreeNode::Leaf(entry.value));
        return Ok(());
    }

    let segments: Vec<&str> = entry.path.segments().collect();
    let Some((leaf, dirs)) = segments.split_last() else {
        return Ok(());
    };

    let mut current = root;
    for (depth, segment) in dirs.iter().enumerate() {
        let conflict = || Error::StructuralConflict {
            path: StorePath::normalize(&dirs[..=depth].join("/")),
            kind: ConflictKind::DirectoryOverLeaf,
        };

        if let Some(TreeNode::Leaf(_)) = current.children.get(&format!("/{}", segment)) {
            return Err(conflict());
        }

        let parent = current.store.clone();
        let node = current
            .children
            .entry(format!("/{}/", segment))
            .or_insert_with(|| {
                let view = ScopedView::new(parent, MountPrefix::new(segment));
                TreeNode::Directory(Directory::new(Rc::new(view)))
            });
        current = match node {
            TreeNode::Directory(dir) => dir,
            TreeNode::Leaf(_) => return Err(conflict()),
        };
    }

    let key = format!("/{}", leaf);
    if !leaf.is_empty() {
        if let Some(TreeNode::Directory(_)) = current.children.get(&format!("{}/", key)) {
            return Err(Error::StructuralConflict {
                path: entry.path.clone(),
                kind: ConflictKind::LeafOverDirectory,
            });
        }
    }
    tracing::trace!(path = %entry.path, "tree leaf");
    current.children.insert(key, TreeNode::Leaf(entry.value));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathStore;

    fn pairs(list: &[(&str, i32)]) -> Vec<(String, i32)> {
        list.iter().map(|(p, v)| (p.to_string(), *v)).collect()
    }

    #[test]
    fn builds_nested_directories() {
        let store = PathStore::new(pairs(&[("/home", 1), ("/blog/post-1", 2), ("/blog/post-2", 3)]));
        let tree = store.tree().unwrap();

        assert_eq!(tree.leaf("/home"), Some(&1));
        assert_eq!(tree["/blog/"]["/post-1"].as_leaf(), Some(&2));
        assert_eq!(tree["/blog/"]["/post-2"].as_leaf(), Some(&3));
        assert_eq!(tree.len(), 2);
        assert!(tree["/blog/"].is_directory());
    }

    #[test]
    fn root_entry_is_stored_under_slash() {
        let store = PathStore::new(pairs(&[("/", 1), ("/a", 2)]));
        let tree = store.tree().unwrap();
        assert_eq!(tree.leaf("/"), Some(&1));
        assert_eq!(tree.leaf("/a"), Some(&2));
    }

    #[test]
    fn trailing_slash_entry_is_directory_index() {
        let store = PathStore::new(pairs(&[("/docs/", 1), ("/docs/intro", 2)]));
        let tree = store.tree().unwrap();
        let docs = tree.directory("/docs/").unwrap();
        assert_eq!(docs.leaf("/"), Some(&1));
        assert_eq!(docs.leaf("/intro"), Some(&2));
    }

    #[test]
    fn directory_over_leaf_conflicts() {
        let store = PathStore::new(pairs(&[("/a", 1), ("/a/b", 2)]));
        let err = store.tree().unwrap_err();
        assert_eq!(
            err,
            Error::StructuralConflict {
                path: StorePath::normalize("/a"),
                kind: ConflictKind::DirectoryOverLeaf,
            }
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn leaf_over_directory_conflicts() {
        let store = PathStore::new(pairs(&[("/a/b", 2), ("/a", 1)]));
        let err = store.tree().unwrap_err();
        assert_eq!(
            err,
            Error::StructuralConflict {
                path: StorePath::normalize("/a"),
                kind: ConflictKind::LeafOverDirectory,
            }
        );
    }

    #[test]
    fn deep_conflict_names_intermediate_path() {
        let store = PathStore::new(pairs(&[("/a/b", 1), ("/a/b/c/d", 2)]));
        let err = store.tree().unwrap_err();
        assert_eq!(err.path(), "/a/b");
    }

    #[test]
    fn failed_build_does_not_touch_store() {
        let store = PathStore::new(pairs(&[("/x/y", 1), ("/x", 2), ("/z", 3)]));
        let before = store.entries();
        assert!(store.tree().is_err());
        assert_eq!(store.entries(), before);
    }

    #[test]
    fn directories_carry_scoped_stores() {
        let store = PathStore::new(pairs(&[("/blog/2024/post", 1)]));
        let tree = store.tree().unwrap();

        assert_eq!(tree.store().mount_path(), "/");
        let blog = tree.directory("/blog/").unwrap();
        assert_eq!(blog.store().mount_path(), "/blog/");
        let year = blog.directory("/2024/").unwrap();
        assert_eq!(year.store().mount_path(), "/blog/2024/");
        assert_eq!(year.store().get_element("/post"), Some(1));
    }

    #[test]
    fn writes_through_subtree_store_reach_root() {
        let store = PathStore::new(pairs(&[("/blog/post-1", 1)]));
        let tree = store.tree().unwrap();
        let blog = tree.directory("/blog/").unwrap();

        blog.store().add_entry("/post-2", 2);
        assert_eq!(store.get_element("/blog/post-2"), Some(2));

        // the old tree is a snapshot; refreshing picks up the write
        assert_eq!(blog.leaf("/post-2"), None);
        let fresh = blog.refresh().unwrap();
        assert_eq!(fresh.leaf("/post-2"), Some(&2));
    }

    #[test]
    fn materializing_twice_is_structurally_equal() {
        let store = PathStore::new(pairs(&[("/a", 1), ("/b/c", 2), ("/b/d/e", 3)]));
        let first = store.tree().unwrap();
        let second = store.tree().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.flatten(), second.flatten());
        assert!(!Rc::ptr_eq(
            first.directory("/b/").unwrap().store(),
            second.directory("/b/").unwrap().store()
        ));
    }

    #[test]
    fn flatten_reproduces_paths() {
        let store = PathStore::new(pairs(&[("/", 0), ("/a", 1), ("/b/c", 2), ("/b/", 3)]));
        let flat = store.tree().unwrap().flatten();
        let expected: BTreeMap<String, i32> = store
            .entries()
            .into_iter()
            .map(Entry::into_pair)
            .collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn tree_of_scoped_view_is_relative() {
        let store = PathStore::new(pairs(&[("/blog/a/b", 1), ("/home", 2)]));
        let blog = store.mount("/blog/");
        let tree = blog.tree().unwrap();

        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["/a/"]);
        assert_eq!(tree.store().mount_path(), "/blog/");
        let a = tree.directory("/a/").unwrap();
        assert_eq!(a.store().mount_path(), "/blog/a/");
    }

    #[test]
    fn empty_store_gives_empty_tree() {
        let store: PathStore<i32> = PathStore::empty();
        let tree = store.tree().unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    #[should_panic(expected = "no tree node")]
    fn index_missing_key_panics() {
        let store = PathStore::new(pairs(&[("/a", 1)]));
        let tree = store.tree().unwrap();
        let _ = &tree["/missing"];
    }
}
