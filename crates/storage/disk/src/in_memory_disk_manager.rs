use crate::allocator::PageAllocator;
use crate::api::DiskManager;
use crate::errors::{DiskError, DiskResult};
use page::PAGE_SIZE;
use page::page_id::PageId;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

/// A page store kept entirely in memory. Contents are lost when the instance is dropped.
#[derive(Debug, Default)]
pub struct InMemoryDiskManager {
    pages: RwLock<HashMap<PageId, Box<[u8; PAGE_SIZE]>>>,
    allocator: Mutex<PageAllocator>,
}

impl InMemoryDiskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages that have been written at least once and not deallocated since.
    pub fn stored_pages(&self) -> usize {
        self.pages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn check_buffer(len: usize) -> DiskResult<()> {
        if len != PAGE_SIZE {
            return Err(DiskError::BufferSize {
                expected: PAGE_SIZE,
                actual: len,
            });
        }
        Ok(())
    }
}

impl DiskManager for InMemoryDiskManager {
    fn read_page(&self, page_id: PageId, destination: &mut [u8]) -> DiskResult<()> {
        Self::check_buffer(destination.len())?;

        let pages = self.pages.read().unwrap_or_else(PoisonError::into_inner);
        match pages.get(&page_id) {
            Some(page) => destination.copy_from_slice(&page[..]),
            None => destination.fill(0),
        }
        Ok(())
    }

    fn write_page(&self, page_id: PageId, page_data: &[u8]) -> DiskResult<()> {
        Self::check_buffer(page_data.len())?;
        if !page_id.is_valid() {
            return Err(DiskError::InvalidPage(page_id));
        }

        let mut boxed = Box::new([0u8; PAGE_SIZE]);
        boxed.copy_from_slice(page_data);
        self.pages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(page_id, boxed);
        Ok(())
    }

    fn allocate_page(&self) -> DiskResult<PageId> {
        self.allocator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .allocate()
    }

    fn deallocate_page(&self, page_id: PageId) -> DiskResult<()> {
        self.allocator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .deallocate(page_id)?;
        self.pages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&page_id);
        Ok(())
    }
}
