use page::page_id::PageId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by disk managers.
#[derive(Debug, Error)]
pub enum DiskError {
    #[error("I/O error while accessing page {page_id}")]
    Io {
        /// Page being read or written
        page_id: PageId,
        source: std::io::Error,
    },
    #[error("Page buffer expected to be {expected} bytes, but was {actual}")]
    BufferSize { expected: usize, actual: usize },
    #[error("Unable to open database file {}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Page {0} was never allocated")]
    InvalidPage(PageId),
    #[error("No page identifiers left to allocate")]
    OutOfPageIds,
}

/// Result type of disk manager operations.
pub type DiskResult<T> = Result<T, DiskError>;
