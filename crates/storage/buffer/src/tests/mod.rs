use crate::buffer::BufferPoolManager;
use crate::guards::PageHandle;
use crate::replacer::{ClockReplacer, LruReplacer, Replacer};
use disk::api::DiskManager;
use disk::errors::{DiskError, DiskResult};
use disk::log_manager::{LogManager, Lsn};
use page::PAGE_SIZE;
use page::page_id::PageId;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

mod flush_tests;
mod new_page_tests;

pub(super) type LruPool = BufferPoolManager<MockDiskManager, LruReplacer>;
pub(super) type ClockPool = BufferPoolManager<MockDiskManager, ClockReplacer>;

/// A disk manager that keeps pages in memory and records every call made by the pool.
///
/// Unlike a real disk manager, `read_page` leaves the destination untouched for pages that were
/// never written, so tests can observe whether the pool zeroed the frame itself.
#[derive(Debug, Default)]
pub(super) struct MockDiskManager {
    pages: RwLock<HashMap<PageId, Vec<u8>>>,
    next_page: AtomicU32,
    reads: RwLock<Vec<PageId>>,
    writes: RwLock<Vec<PageId>>,
    allocations: RwLock<Vec<PageId>>,
    deallocations: RwLock<Vec<PageId>>,
    pub(super) fail_reads: AtomicBool,
    pub(super) fail_writes: AtomicBool,
    pub(super) fail_allocations: AtomicBool,
}

impl MockDiskManager {
    /// Stores a page filled with `byte` without recording a write.
    pub(super) fn seed(&self, page_id: PageId, byte: u8) {
        self.pages
            .write()
            .unwrap()
            .insert(page_id, vec![byte; PAGE_SIZE]);
    }

    /// The persisted contents of a page, if it was ever written.
    pub(super) fn stored(&self, page_id: PageId) -> Option<Vec<u8>> {
        self.pages.read().unwrap().get(&page_id).cloned()
    }

    pub(super) fn reads(&self) -> Vec<PageId> {
        self.reads.read().unwrap().clone()
    }

    pub(super) fn writes(&self) -> Vec<PageId> {
        self.writes.read().unwrap().clone()
    }

    pub(super) fn allocations(&self) -> Vec<PageId> {
        self.allocations.read().unwrap().clone()
    }

    pub(super) fn deallocations(&self) -> Vec<PageId> {
        self.deallocations.read().unwrap().clone()
    }

    fn injected(page_id: PageId) -> DiskError {
        DiskError::Io {
            page_id,
            source: io::Error::other("injected failure"),
        }
    }
}

impl DiskManager for MockDiskManager {
    fn read_page(&self, page_id: PageId, destination: &mut [u8]) -> DiskResult<()> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(Self::injected(page_id));
        }
        self.reads.write().unwrap().push(page_id);
        if let Some(data) = self.pages.read().unwrap().get(&page_id) {
            destination.copy_from_slice(data);
        }
        Ok(())
    }

    fn write_page(&self, page_id: PageId, page_data: &[u8]) -> DiskResult<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(Self::injected(page_id));
        }
        self.writes.write().unwrap().push(page_id);
        self.pages
            .write()
            .unwrap()
            .insert(page_id, page_data.to_vec());
        Ok(())
    }

    fn allocate_page(&self) -> DiskResult<PageId> {
        if self.fail_allocations.load(Ordering::Relaxed) {
            return Err(DiskError::OutOfPageIds);
        }
        let page_id = PageId::new(self.next_page.fetch_add(1, Ordering::Relaxed));
        self.allocations.write().unwrap().push(page_id);
        Ok(page_id)
    }

    fn deallocate_page(&self, page_id: PageId) -> DiskResult<()> {
        self.deallocations.write().unwrap().push(page_id);
        Ok(())
    }
}

/// Counts calls so tests can check the pool never drives the log on its own.
#[derive(Debug, Default)]
pub(super) struct MockLogManager {
    pub(super) flushes: AtomicUsize,
}

impl LogManager for MockLogManager {
    fn flush(&self, _lsn: Lsn) -> DiskResult<()> {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn persistent_lsn(&self) -> Lsn {
        0
    }
}

pub(super) fn create_pool<R: Replacer>(pool_size: usize) -> BufferPoolManager<MockDiskManager, R> {
    BufferPoolManager::new(Arc::new(MockDiskManager::default()), pool_size)
}

/// Copies `bytes` into the page at `offset`.
pub(super) fn write_bytes<D: DiskManager, R: Replacer>(
    handle: &mut PageHandle<'_, D, R>,
    offset: usize,
    bytes: &[u8],
) {
    let mut page = handle.write().unwrap();
    page.data_mut()[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// Reads `len` bytes of the page starting at `offset`.
pub(super) fn read_bytes<D: DiskManager, R: Replacer>(
    handle: &PageHandle<'_, D, R>,
    offset: usize,
    len: usize,
) -> Vec<u8> {
    let page = handle.read().unwrap();
    page.data()[offset..offset + len].to_vec()
}
