//! Write-ahead log collaborator interface.
//!
//! The buffer pool holds a `LogManager` but does not drive it yet. The intended integration point is
//! forcing the log up to a page's LSN before that page is written back.

use crate::errors::DiskResult;
use std::fmt::Debug;

/// Log sequence number.
pub type Lsn = u64;

/// The write-ahead logger as seen by the buffer pool.
pub trait LogManager: Send + Sync + Debug {
    /// Forces every log record up to and including `lsn` to stable storage.
    fn flush(&self, lsn: Lsn) -> DiskResult<()>;

    /// The highest LSN known to be on stable storage.
    fn persistent_lsn(&self) -> Lsn;
}
