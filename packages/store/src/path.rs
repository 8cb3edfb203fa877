//! Normalized absolute paths and mount prefixes.

use std::borrow::Borrow;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// An absolute, `/`-separated path with `.`, `..` and empty segments resolved.
///
/// Any string can be turned into a `StorePath`; normalization never fails.
/// Paths that are not absolute are treated as if they were rooted at `/`, and
/// `..` segments that would climb above the root collapse onto it.
///
/// A trailing separator is significant and preserved, as it is when resolving
/// a relative reference against a URL: `a/b/` normalizes to `/a/b/`, and a
/// trailing `.` or `..` segment also leaves the result ending in `/`.
///
/// # Examples
///
/// ```rust
/// use routefs_store::StorePath;
///
/// assert_eq!(StorePath::normalize("blog/post-1").as_str(), "/blog/post-1");
/// assert_eq!(StorePath::normalize("/a//b/./c/../d").as_str(), "/a/b/d");
/// assert_eq!(StorePath::normalize("../../etc").as_str(), "/etc");
/// assert_eq!(StorePath::normalize("/blog/").as_str(), "/blog/");
/// ```
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StorePath(String);

impl StorePath {
    /// The root path, `/`.
    pub fn root() -> Self {
        StorePath("/".to_string())
    }

    /// Canonicalize an arbitrary path string.
    pub fn normalize(raw: &str) -> Self {
        let mut segments: Vec<&str> = Vec::new();
        let mut trailing_slash = false;

        for segment in raw.split('/') {
            trailing_slash = false;
            match segment {
                "" | "." => trailing_slash = true,
                ".." => {
                    segments.pop();
                    trailing_slash = true;
                }
                other => segments.push(other),
            }
        }

        let mut normalized = String::with_capacity(raw.len() + 1);
        normalized.push('/');
        normalized.push_str(&segments.join("/"));
        if trailing_slash && !segments.is_empty() {
            normalized.push('/');
        }
        StorePath(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// True for the root path `/`.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The path without its leading slash.
    pub fn relative(&self) -> &str {
        &self.0[1..]
    }

    /// Iterate over the segments after the leading slash.
    ///
    /// A path with a trailing slash yields a final empty segment, and the root
    /// yields a single empty segment.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.relative().split('/')
    }

    /// Project this path onto its first segment.
    ///
    /// A first segment followed by anything else is reported as a directory
    /// (`/name/`), a lone segment as a file (`/name`). The root projects to
    /// itself.
    pub fn top_level_name(&self) -> String {
        if self.is_root() {
            return "/".to_string();
        }
        match self.relative().split_once('/') {
            Some((first, _)) => format!("/{}/", first),
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StorePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StorePath {
    fn from(raw: &str) -> Self {
        StorePath::normalize(raw)
    }
}

impl From<String> for StorePath {
    fn from(raw: String) -> Self {
        StorePath::normalize(&raw)
    }
}

impl PartialEq<str> for StorePath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StorePath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for StorePath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StorePath {
    fn deserialize<D>(deserializer: D) -> Result<StorePath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        Ok(StorePath::normalize(&s))
    }
}

/// The subtree a scoped view exposes: a normalized path ending in `/`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct MountPrefix(StorePath);

impl MountPrefix {
    /// Normalize `raw` into a mount prefix, adding the trailing slash if it is
    /// missing.
    pub fn new(raw: &str) -> Self {
        let StorePath(mut normalized) = StorePath::normalize(raw);
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        MountPrefix(StorePath(normalized))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_path(&self) -> &StorePath {
        &self.0
    }

    /// True when `path` lies inside this prefix.
    pub fn contains(&self, path: &StorePath) -> bool {
        path.as_str().starts_with(self.as_str())
    }

    /// Rewrite an absolute path to be relative to this prefix.
    ///
    /// The prefix's trailing slash becomes the result's leading slash.
    /// Returns `None` for paths outside the prefix.
    pub fn relativize(&self, path: &StorePath) -> Option<StorePath> {
        if !self.contains(path) {
            return None;
        }
        let cut = self.as_str().len() - 1;
        Some(StorePath(path.as_str()[cut..].to_string()))
    }

    /// Rewrite a path relative to this prefix into an absolute one.
    ///
    /// The relative path is resolved against the prefix's own root first, so
    /// `..` segments cannot climb out of the prefix.
    pub fn absolutize(&self, relative: &str) -> StorePath {
        let contained = StorePath::normalize(relative);
        StorePath(format!("{}{}", self.as_str(), contained.relative()))
    }

    /// Compose a nested prefix: `self` followed by `inner`.
    #[must_use]
    pub fn join(&self, inner: &MountPrefix) -> MountPrefix {
        MountPrefix(StorePath(format!("{}{}", self.as_str(), inner.0.relative())))
    }
}

impl fmt::Display for MountPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MountPrefix {
    fn from(raw: &str) -> Self {
        MountPrefix::new(raw)
    }
}
