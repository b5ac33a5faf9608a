use std::path::PathBuf;
use storage::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("watched directory {0} does not exist")]
    MissingDirectory(PathBuf),
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] globset::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("directory listing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
