//! routefs: a virtual, path-keyed store with scoped views.
//!
//! - `StorePath`: normalized absolute paths (`.`/`..`/`//` resolved)
//! - `PathStore`: the root store owning the authoritative flat entry list
//! - `ScopedView`: a store with no entries of its own, mounted on a parent at
//!   a prefix; reads and writes are translated to the parent
//! - `Directory`/`TreeNode`: the flat entries materialized as a nested tree
//!
//! # Example
//!
//! ```rust
//! use routefs_store::{PathStore, Store};
//!
//! let root = PathStore::new(vec![
//!     ("/home".to_string(), "H"),
//!     ("/blog/post-1".to_string(), "P1"),
//!     ("/blog/post-2".to_string(), "P2"),
//! ]);
//!
//! let tree = root.tree().unwrap();
//! assert_eq!(tree["/blog/"]["/post-1"].as_leaf(), Some(&"P1"));
//!
//! let blog = root.mount("/blog/");
//! blog.add_entry("/post-3", "P3");
//! assert_eq!(root.get_element("/blog/post-3"), Some("P3"));
//! ```

mod error;
mod path;
mod scoped;
mod store;
pub mod tree;

pub use error::{ConflictKind, Error};
pub use path::{MountPrefix, StorePath};
pub use scoped::ScopedView;
pub use store::{open, Entry, PathStore, Store, StoreConfig, StoreHandle};
pub use tree::{Directory, TreeNode};
