use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const DEFAULT_ROOT: &str = "src/routes";
const DEFAULT_EXTENSION: &str = "ripple";

/// Where to look for route files and which ones count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteScanConfig {
    /// The routes directory. Relative paths are resolved against a working
    /// directory with [`RouteScanConfig::resolve`].
    pub root: PathBuf,
    /// File extension, without the leading dot.
    pub extension: String,
}

impl Default for RouteScanConfig {
    fn default() -> Self {
        RouteScanConfig {
            root: PathBuf::from(DEFAULT_ROOT),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl RouteScanConfig {
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        RouteScanConfig {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Anchor a relative `root` at `cwd`.
    #[must_use]
    pub fn resolve(&self, cwd: &Path) -> Self {
        RouteScanConfig {
            root: cwd.join(&self.root),
            extension: self.extension.clone(),
        }
    }

    /// The suffix, dot included, that route files end with.
    pub fn suffix(&self) -> String {
        format!(".{}", self.extension)
    }

    /// True when `file`'s name ends with this config's extension.
    pub fn matches(&self, file: &Path) -> bool {
        file.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(&self.suffix()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RouteScanConfig::default();
        assert_eq!(config.root, PathBuf::from("src/routes"));
        assert_eq!(config.extension, "ripple");
        assert_eq!(config.suffix(), ".ripple");
    }

    #[test]
    fn leading_dot_is_dropped() {
        let config = RouteScanConfig::new("pages", ".md");
        assert_eq!(config.extension, "md");
    }

    #[test]
    fn resolve_against_cwd() {
        let config = RouteScanConfig::default().resolve(Path::new("/work/site"));
        assert_eq!(config.root, PathBuf::from("/work/site/src/routes"));

        let absolute = RouteScanConfig::new("/srv/routes", "ripple").resolve(Path::new("/work"));
        assert_eq!(absolute.root, PathBuf::from("/srv/routes"));
    }

    #[test]
    fn matches_extension() {
        let config = RouteScanConfig::default();
        assert!(config.matches(Path::new("/a/b/home.ripple")));
        assert!(!config.matches(Path::new("/a/b/home.ripple.bak")));
        assert!(!config.matches(Path::new("/a/b/ripple")));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: RouteScanConfig = serde_json::from_str(r#"{"root": "app/routes"}"#).unwrap();
        assert_eq!(config.root, PathBuf::from("app/routes"));
        assert_eq!(config.extension, "ripple");
    }
}
