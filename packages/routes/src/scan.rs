use std::fs;
use std::path::{Component, Path, PathBuf};

use routefs_store::{PathStore, Store};

use crate::{RouteScanConfig, ScanError};

/// A discovered route file and the store key it maps to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RouteFile {
    /// `/`-prefixed, POSIX-style key with the extension stripped.
    pub key: String,
    pub file: PathBuf,
}

/// Derive the store key for `file` inside `routes_dir`.
///
/// Returns `None` when `file` is outside `routes_dir`, lacks the extension,
/// or has a component that is not valid UTF-8.
pub fn route_key(routes_dir: &Path, file: &Path, extension: &str) -> Option<String> {
    let relative = file.strip_prefix(routes_dir).ok()?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }

    let joined = parts.join("/");
    let stem = joined.strip_suffix(extension)?.strip_suffix('.')?;
    Some(format!("/{}", stem))
}

/// Find every route file under `config.root`, sorted by key.
///
/// A missing routes directory is not an error; it simply has no routes.
pub fn discover(config: &RouteScanConfig) -> Result<Vec<RouteFile>, ScanError> {
    if !config.root.is_dir() {
        tracing::debug!(root = %config.root.display(), "routes directory does not exist");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(&config.root)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() || !config.matches(entry.path()) {
            continue;
        }

        match route_key(&config.root, entry.path(), &config.extension) {
            Some(key) => files.push(RouteFile {
                key,
                file: entry.path().to_path_buf(),
            }),
            None => {
                tracing::warn!(file = %entry.path().display(), "skipping file with no route key");
            }
        }
    }

    files.sort();
    tracing::debug!(root = %config.root.display(), count = files.len(), "discovered routes");
    Ok(files)
}

/// Read a route file's contents as its value.
pub fn load_text(route: &RouteFile) -> Result<String, ScanError> {
    fs::read_to_string(&route.file).map_err(|source| ScanError::Io {
        path: route.file.clone(),
        source,
    })
}

/// Build a root store with one entry per route file.
pub fn seed_store<T, F>(files: &[RouteFile], mut loader: F) -> Result<PathStore<T>, ScanError>
where
    T: Clone + 'static,
    F: FnMut(&RouteFile) -> Result<T, ScanError>,
{
    let mut initial = Vec::with_capacity(files.len());
    for route in files {
        initial.push((route.key.clone(), loader(route)?));
    }
    let store = PathStore::new(initial);
    tracing::info!(count = store.len(), "seeded route store");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn route_key_strips_extension() {
        let root = Path::new("/site/routes");
        assert_eq!(
            route_key(root, Path::new("/site/routes/home.ripple"), "ripple"),
            Some("/home".to_string())
        );
        assert_eq!(
            route_key(root, Path::new("/site/routes/blog/post-1.ripple"), "ripple"),
            Some("/blog/post-1".to_string())
        );
    }

    #[test]
    fn route_key_rejects_other_files() {
        let root = Path::new("/site/routes");
        assert_eq!(route_key(root, Path::new("/site/routes/a.txt"), "ripple"), None);
        assert_eq!(route_key(root, Path::new("/elsewhere/a.ripple"), "ripple"), None);
        assert_eq!(route_key(root, Path::new("/site/routes/aripple"), "ripple"), None);
    }

    #[test]
    fn discover_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = RouteScanConfig::new(dir.path().join("nope"), "ripple");
        assert!(discover(&config).unwrap().is_empty());
    }

    #[test]
    fn discover_finds_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "home.ripple", "H");
        touch(dir.path(), "blog/post-1.ripple", "P1");
        touch(dir.path(), "blog/post-2.ripple", "P2");
        touch(dir.path(), "blog/notes.txt", "ignored");

        let config = RouteScanConfig::new(dir.path(), "ripple");
        let keys: Vec<String> = discover(&config)
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["/blog/post-1", "/blog/post-2", "/home"]);
    }

    #[test]
    fn seed_store_loads_contents() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "home.ripple", "H");
        touch(dir.path(), "blog/post-1.ripple", "P1");

        let config = RouteScanConfig::new(dir.path(), "ripple");
        let files = discover(&config).unwrap();
        let store = seed_store(&files, load_text).unwrap();

        assert_eq!(store.get_element("/home"), Some("H".to_string()));
        assert_eq!(store.get_element("/blog/post-1"), Some("P1".to_string()));
        assert!(store.paths().contains("/blog/"));
    }

    #[test]
    fn seed_store_propagates_loader_errors() {
        let files = vec![RouteFile {
            key: "/gone".to_string(),
            file: PathBuf::from("/definitely/not/here.ripple"),
        }];
        let err = seed_store(&files, load_text).unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }
}
