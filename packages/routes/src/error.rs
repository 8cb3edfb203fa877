use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("failed to walk routes directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load route {key} from {}: {message}", path.display())]
    Load {
        key: String,
        path: PathBuf,
        message: String,
    },
}
