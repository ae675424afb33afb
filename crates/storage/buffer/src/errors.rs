use crate::frame::FrameId;
use disk::errors::DiskError;
use page::page_id::PageId;
use thiserror::Error;

/// Buffer error.
#[derive(Debug, Error)]
pub enum BufferError {
    /// The page is not resident in the pool
    #[error("Page {0} is not resident in the buffer pool")]
    NotFound(PageId),
    /// Every frame is pinned and the free list is empty
    #[error("Buffer pool is exhausted: no free frame and no evictable page")]
    PoolExhausted,
    /// The page cannot be deleted while it is pinned
    #[error("Page {page_id} is pinned by {pin_count} holder(s)")]
    InUse { page_id: PageId, pin_count: u32 },
    /// A handle was used after its page was unpinned or left the frame
    #[error("Handle for page {page_id} in frame {frame_id} is no longer valid")]
    StaleHandle { page_id: PageId, frame_id: FrameId },
    /// The disk manager failed
    #[error("Disk manager error")]
    Disk(#[from] DiskError),
}

/// Result type of buffer pool operations.
pub type BufferResult<T> = Result<T, BufferError>;
