use crate::buffer::BufferPoolManager;
use crate::errors::BufferResult;
use crate::frame::FrameId;
use crate::replacer::Replacer;
use disk::api::DiskManager;
use page::page::Page;
use page::page_id::PageId;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

/// Provides read access to a `Page` instance stored in one of the buffer's frames.
/// Shared latch, allowing concurrent reads.
/// Free as soon as possible, and never hold it across a call into the pool.
#[derive(Debug)]
pub struct PageReadGuard<'a> {
    /// The underlying `RwLockReadGuard` which will be dereferenced to `&Page`
    pub(crate) guard: RwLockReadGuard<'a, Page>,
}

impl Deref for PageReadGuard<'_> {
    type Target = Page;
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Provides write access to a `Page` instance stored in one of the buffer's frames.
/// Exclusive latch on the frame.
///
/// Writing through the guard does not mark the page dirty; pass `is_dirty = true` when unpinning.
#[derive(Debug)]
pub struct PageWriteGuard<'a> {
    /// The underlying `RwLockWriteGuard` which will be dereferenced to `&mut Page`
    pub(crate) guard: RwLockWriteGuard<'a, Page>,
}

impl Deref for PageWriteGuard<'_> {
    type Target = Page;
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for PageWriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

/// A pinned page, as handed out by [`BufferPoolManager::fetch_page`] and
/// [`BufferPoolManager::new_page`].
///
/// The handle only records which frame holds which page. It stays usable while the page remains
/// pinned; once the page has been unpinned (and possibly evicted), `read`/`write` fail with
/// `BufferError::StaleHandle` instead of exposing another page's bytes.
///
/// Dropping a handle does not unpin the page. Every successful fetch/new must be matched by one
/// `unpin`, either through [`PageHandle::unpin`] or [`BufferPoolManager::unpin_page`].
pub struct PageHandle<'a, D: DiskManager, R: Replacer> {
    pool: &'a BufferPoolManager<D, R>,
    frame_id: FrameId,
    page_id: PageId,
}

impl<'a, D: DiskManager, R: Replacer> PageHandle<'a, D, R> {
    pub(crate) fn new(
        pool: &'a BufferPoolManager<D, R>,
        frame_id: FrameId,
        page_id: PageId,
    ) -> Self {
        Self {
            pool,
            frame_id,
            page_id,
        }
    }

    /// The page this handle refers to.
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// The frame holding the page.
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Shared access to the page contents.
    pub fn read(&self) -> BufferResult<PageReadGuard<'_>> {
        self.pool.read_pinned(self.frame_id, self.page_id)
    }

    /// Exclusive access to the page contents.
    pub fn write(&mut self) -> BufferResult<PageWriteGuard<'_>> {
        self.pool.write_pinned(self.frame_id, self.page_id)
    }

    /// Releases this holder's pin. See [`BufferPoolManager::unpin_page`].
    pub fn unpin(self, is_dirty: bool) -> BufferResult<()> {
        self.pool.unpin_page(self.page_id, is_dirty)
    }
}

impl<D: DiskManager, R: Replacer> fmt::Debug for PageHandle<'_, D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageHandle")
            .field("frame_id", &self.frame_id)
            .field("page_id", &self.page_id)
            .finish()
    }
}
