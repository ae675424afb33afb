use crate::errors::{DiskError, DiskResult};
use page::page_id::PageId;
use std::collections::BTreeSet;

/// Page id allocation shared by the disk managers.
///
/// Ids below `next` have been handed out at least once. Deallocated ids are kept in `reclaimed`
/// and reused lowest first, before the id space grows.
#[derive(Debug, Default)]
pub(crate) struct PageAllocator {
    next: u32,
    reclaimed: BTreeSet<u32>,
}

impl PageAllocator {
    /// Creates an allocator whose first fresh id is `next`.
    pub(crate) fn starting_at(next: u32) -> Self {
        Self {
            next,
            reclaimed: BTreeSet::new(),
        }
    }

    pub(crate) fn allocate(&mut self) -> DiskResult<PageId> {
        if let Some(page_number) = self.reclaimed.pop_first() {
            return Ok(PageId::new(page_number));
        }

        let page_id = PageId::new(self.next);
        if !page_id.is_valid() {
            return Err(DiskError::OutOfPageIds);
        }
        self.next += 1;
        Ok(page_id)
    }

    /// Returns `page_id` to the pool of reusable ids.
    ///
    /// Ids that are not currently handed out (never allocated, or already reclaimed) are left alone,
    /// so deallocating twice cannot make an id reachable through two allocations.
    pub(crate) fn deallocate(&mut self, page_id: PageId) -> DiskResult<()> {
        if !page_id.is_valid() {
            return Err(DiskError::InvalidPage(page_id));
        }
        if !self.is_allocated(page_id) {
            tracing::trace!(%page_id, "deallocate of an id that is not allocated, ignoring");
            return Ok(());
        }
        self.reclaimed.insert(page_id.page_number());
        Ok(())
    }

    /// Whether `page_id` is currently handed out.
    pub(crate) fn is_allocated(&self, page_id: PageId) -> bool {
        page_id.is_valid()
            && page_id.page_number() < self.next
            && !self.reclaimed.contains(&page_id.page_number())
    }

    /// Number of ids handed out at least once.
    pub(crate) fn high_water_mark(&self) -> u32 {
        self.next
    }
}
