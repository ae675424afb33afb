//! Public API for the `disk` crate

use crate::errors::DiskResult;
use page::page_id::PageId;

/// Disk manager public API
///
/// A `DiskManager` manages a collection of fixed-size pages addressed by `PageId`, and owns the
/// allocation of page identifiers. Implementations are free to choose the backing storage layout.
///
/// The buffer pool calls into the disk manager while holding its own latch, so implementations must
/// not call back into the pool.
pub trait DiskManager: Send + Sync {
    /// Read the page identified by `page_id` into `destination`.
    ///
    /// Params
    /// - `page_id`: Identifier of the page to read.
    /// - `destination`: Caller-provided buffer to receive the page bytes. The buffer length must
    ///   equal the storage page size.
    ///
    /// A page that was allocated but never written reads back as all zeroes.
    fn read_page(&self, page_id: PageId, destination: &mut [u8]) -> DiskResult<()>;

    /// Write the contents of `page_data` as the page for `page_id`.
    ///
    /// Params
    /// - `page_id`: Identifier of the page to write.
    /// - `page_data`: Byte slice containing exactly one page worth of data.
    fn write_page(&self, page_id: PageId, page_data: &[u8]) -> DiskResult<()>;

    /// Hands out an identifier not currently in use. Never returns `PageId::INVALID`.
    fn allocate_page(&self) -> DiskResult<PageId>;

    /// Marks `page_id` as reclaimable. A later `allocate_page` may return it again.
    fn deallocate_page(&self, page_id: PageId) -> DiskResult<()>;
}
