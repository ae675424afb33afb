//! Provides the implementation for the buffer pool leveraged by the engine

use crate::errors::{BufferError, BufferResult};
use crate::frame::{BufferFrame, FrameId, FrameMeta};
use crate::guards::{PageHandle, PageReadGuard, PageWriteGuard};
use crate::replacer::{LruReplacer, Replacer};
use crate::stats::BufferPoolStats;
use disk::api::DiskManager;
use disk::errors::DiskError;
use disk::log_manager::LogManager;
use page::page::Page;
use page::page_id::PageId;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLockReadGuard, RwLockWriteGuard};

/// Everything the pool latch protects.
#[derive(Debug)]
pub(crate) struct PoolState<R> {
    /// Resident pages and the frame holding each of them.
    pub(crate) page_table: HashMap<PageId, FrameId>,
    /// Frames holding no page. Consumed before asking the replacer for a victim.
    pub(crate) free_list: VecDeque<FrameId>,
    /// Per-frame pin count and dirty flag, indexed by `FrameId`.
    pub(crate) meta: Vec<FrameMeta>,
    /// Tracks the resident frames whose pin count is 0.
    pub(crate) replacer: R,
    pub(crate) stats: BufferPoolStats,
}

/// The buffer pool manager, responsible for caching disk pages in a fixed set of frames.
///
/// All bookkeeping (page table, free list, pin counts, dirty flags, replacer) sits behind a single
/// latch. Page bytes live in per-frame latches so that pinned pages can be accessed without holding
/// the pool latch. The pool latch is only held while taking the latch of a frame nobody has pinned,
/// so a client holding a page guard never blocks the pool. Flushes pin the page they write and do
/// the I/O with the pool latch released.
///
/// The replacement policy `R` is fixed when the pool is created.
pub struct BufferPoolManager<D: DiskManager, R: Replacer = LruReplacer> {
    disk_manager: Arc<D>,
    log_manager: Option<Arc<dyn LogManager>>,
    frames: Vec<BufferFrame>,
    state: Mutex<PoolState<R>>,
}

impl<D: DiskManager, R: Replacer> BufferPoolManager<D, R> {
    /// Creates a new empty buffer pool with `pool_size` frames, all of them on the free list.
    pub fn new(disk_manager: Arc<D>, pool_size: usize) -> Self {
        let frames = (0..pool_size).map(|_| BufferFrame::default()).collect();

        Self {
            disk_manager,
            log_manager: None,
            frames,
            state: Mutex::new(PoolState {
                page_table: HashMap::with_capacity(pool_size),
                free_list: (0..pool_size).collect(),
                meta: vec![FrameMeta::default(); pool_size],
                replacer: R::new(pool_size),
                stats: BufferPoolStats::default(),
            }),
        }
    }

    /// Attaches the write-ahead log manager.
    ///
    /// The pool only holds on to it for now: write-backs do not force the log first.
    pub fn with_log_manager(mut self, log_manager: Arc<dyn LogManager>) -> Self {
        self.log_manager = Some(log_manager);
        self
    }

    /// Retrieves a page, loading it from disk if it is not resident, and pins it.
    ///
    /// # Params
    /// - `page_id`: The identifier of the page to be retrieved.
    ///
    /// # Returns
    /// A `PageHandle` for the pinned page. `BufferError::PoolExhausted` if the page is not resident
    /// and every frame is pinned.
    pub fn fetch_page(&self, page_id: PageId) -> BufferResult<PageHandle<'_, D, R>> {
        if !page_id.is_valid() {
            return Err(DiskError::InvalidPage(page_id).into());
        }

        let mut guard = self.state();
        let state = &mut *guard;

        // Happiest of flows - the page is already cached.
        if let Some(&frame_id) = state.page_table.get(&page_id) {
            Self::pin_frame(state, frame_id);
            state.stats.cache_hits += 1;
            tracing::trace!(
                %page_id,
                frame_id,
                pin_count = state.meta[frame_id].pin_count,
                "buffer hit"
            );
            return Ok(PageHandle::new(self, frame_id, page_id));
        }

        state.stats.cache_misses += 1;
        let frame_id = self.acquire_frame(state)?;

        {
            let mut page = self.write_frame(frame_id);
            page.reset(page_id);
            if let Err(e) = self.disk_manager.read_page(page_id, page.data_mut()) {
                // the frame no longer holds anything, hand it back as free
                page.reset(PageId::INVALID);
                state.free_list.push_back(frame_id);
                tracing::warn!(%page_id, frame_id, error = %e, "failed to load page");
                return Err(e.into());
            }
        }
        state.stats.disk_reads += 1;

        state.meta[frame_id].install(page_id);
        state.page_table.insert(page_id, frame_id);
        tracing::debug!(%page_id, frame_id, "loaded page into frame");

        Ok(PageHandle::new(self, frame_id, page_id))
    }

    /// Releases one pin on a resident page.
    ///
    /// The pin count is floored at 0: unpinning an unpinned page is not an error. `is_dirty` is
    /// OR-ed into the page's dirty flag. When the last pin goes away the frame becomes evictable.
    ///
    /// All guards obtained for the page must be dropped before unpinning it.
    ///
    /// # Returns
    /// `BufferError::NotFound` if the page is not resident.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> BufferResult<()> {
        let mut guard = self.state();
        let state = &mut *guard;

        let frame_id = Self::lookup(state, page_id)?;
        state.meta[frame_id].dirty |= is_dirty;
        Self::release_frame(state, frame_id);

        Ok(())
    }

    /// Allocates a new page on disk and installs it, zero-filled and pinned, in a frame.
    ///
    /// The pool checks that a frame can be obtained before asking the disk manager for an id, so a
    /// `PoolExhausted` result never leaks a page id.
    ///
    /// # Returns
    /// The id of the new page together with its `PageHandle`.
    pub fn new_page(&self) -> BufferResult<(PageId, PageHandle<'_, D, R>)> {
        let mut guard = self.state();
        let state = &mut *guard;

        if state.free_list.is_empty() && state.replacer.size() == 0 {
            return Err(BufferError::PoolExhausted);
        }

        let frame_id = self.acquire_frame(state)?;

        let page_id = match self.disk_manager.allocate_page() {
            Ok(page_id) => page_id,
            Err(e) => {
                self.write_frame(frame_id).reset(PageId::INVALID);
                state.free_list.push_back(frame_id);
                return Err(e.into());
            }
        };

        self.write_frame(frame_id).reset(page_id);
        state.meta[frame_id].install(page_id);
        state.page_table.insert(page_id, frame_id);
        tracing::debug!(%page_id, frame_id, "created new page");

        Ok((page_id, PageHandle::new(self, frame_id, page_id)))
    }

    /// Writes a resident page back to disk, whether it is dirty or not, and clears its dirty flag.
    /// Pinned pages can be flushed too.
    ///
    /// The page is pinned for the duration of the write, which waits for any write guard held on it
    /// to be dropped. Modifications made in the meantime are not lost: unpinning with `is_dirty` set
    /// marks the page dirty again.
    ///
    /// # Returns
    /// `BufferError::NotFound` if the page is not resident.
    pub fn flush_page(&self, page_id: PageId) -> BufferResult<()> {
        let frame_id = {
            let mut guard = self.state();
            let state = &mut *guard;

            let frame_id = Self::lookup(state, page_id)?;
            Self::pin_frame(state, frame_id);
            state.meta[frame_id].dirty = false;
            frame_id
        };

        self.write_back(frame_id, page_id)
    }

    /// Flushes every page resident when the call starts exactly once, in page id order.
    ///
    /// Pages evicted or deleted while the flush is running are skipped. Stops at the first failed write.
    pub fn flush_all_pages(&self) -> BufferResult<()> {
        let mut resident: Vec<PageId> = self.state().page_table.keys().copied().collect();
        resident.sort_unstable();

        for &page_id in &resident {
            match self.flush_page(page_id) {
                Ok(()) | Err(BufferError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(pages = resident.len(), "flushed all pages");
        Ok(())
    }

    /// Drops a page from the pool and deallocates it on disk. Its contents are discarded, even if dirty.
    ///
    /// Deleting a page that is not resident succeeds without doing anything.
    ///
    /// # Returns
    /// `BufferError::InUse` if the page is pinned; the pool is left untouched in that case.
    pub fn delete_page(&self, page_id: PageId) -> BufferResult<()> {
        let mut guard = self.state();
        let state = &mut *guard;

        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return Ok(());
        };

        let pin_count = state.meta[frame_id].pin_count;
        if pin_count > 0 {
            return Err(BufferError::InUse { page_id, pin_count });
        }

        self.disk_manager.deallocate_page(page_id)?;

        state.replacer.pin(frame_id);
        state.page_table.remove(&page_id);
        state.meta[frame_id].clear();
        self.write_frame(frame_id).reset(PageId::INVALID);
        state.free_list.push_back(frame_id);
        tracing::debug!(%page_id, frame_id, "deleted page");

        Ok(())
    }

    /// Number of frames in the pool.
    pub fn pool_size(&self) -> usize {
        self.frames.len()
    }

    /// Number of pages currently resident.
    pub fn resident_pages(&self) -> usize {
        self.state().page_table.len()
    }

    /// Number of frames on the free list.
    pub fn free_frames(&self) -> usize {
        self.state().free_list.len()
    }

    /// Number of resident pages that could be evicted right now.
    pub fn evictable_frames(&self) -> usize {
        self.state().replacer.size()
    }

    /// Whether `page_id` is resident.
    pub fn contains(&self, page_id: PageId) -> bool {
        self.state().page_table.contains_key(&page_id)
    }

    /// Pin count of a resident page. `None` if the page is not resident.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let state = self.state();
        let frame_id = *state.page_table.get(&page_id)?;
        Some(state.meta[frame_id].pin_count)
    }

    /// Dirty flag of a resident page. `None` if the page is not resident.
    pub fn is_dirty(&self, page_id: PageId) -> Option<bool> {
        let state = self.state();
        let frame_id = *state.page_table.get(&page_id)?;
        Some(state.meta[frame_id].dirty)
    }

    /// Activity counters.
    pub fn stats(&self) -> BufferPoolStats {
        self.state().stats
    }

    /// Zeroes the activity counters.
    pub fn reset_stats(&self) {
        self.state().stats = BufferPoolStats::default();
    }

    pub fn disk_manager(&self) -> &Arc<D> {
        &self.disk_manager
    }

    pub fn log_manager(&self) -> Option<&Arc<dyn LogManager>> {
        self.log_manager.as_ref()
    }

    pub(crate) fn read_pinned(
        &self,
        frame_id: FrameId,
        page_id: PageId,
    ) -> BufferResult<PageReadGuard<'_>> {
        self.check_pinned(frame_id, page_id)?;

        let guard = self.read_frame(frame_id);
        // the pin was checked under the pool latch; the frame latch confirms nobody rebound the frame since
        if guard.page_id() != page_id {
            return Err(BufferError::StaleHandle { page_id, frame_id });
        }
        Ok(PageReadGuard { guard })
    }

    pub(crate) fn write_pinned(
        &self,
        frame_id: FrameId,
        page_id: PageId,
    ) -> BufferResult<PageWriteGuard<'_>> {
        self.check_pinned(frame_id, page_id)?;

        let guard = self.write_frame(frame_id);
        if guard.page_id() != page_id {
            return Err(BufferError::StaleHandle { page_id, frame_id });
        }
        Ok(PageWriteGuard { guard })
    }

    fn check_pinned(&self, frame_id: FrameId, page_id: PageId) -> BufferResult<()> {
        let state = self.state();
        let meta = &state.meta[frame_id];
        if meta.page_id != Some(page_id) || !meta.is_pinned() {
            return Err(BufferError::StaleHandle { page_id, frame_id });
        }
        Ok(())
    }

    /// Finds a frame for a page about to be installed: the free list first, then a replacer victim.
    ///
    /// A victim holding a dirty page is written back before anything else happens to it, then its
    /// page table entry is erased. On a failed write-back the victim stays resident and evictable.
    /// The returned frame is unassigned and tracked nowhere.
    fn acquire_frame(&self, state: &mut PoolState<R>) -> BufferResult<FrameId> {
        if let Some(frame_id) = state.free_list.pop_front() {
            return Ok(frame_id);
        }

        let frame_id = state.replacer.victim().ok_or(BufferError::PoolExhausted)?;

        let meta = &state.meta[frame_id];
        if let Some(old_page_id) = meta.page_id {
            if meta.dirty {
                let page = self.read_frame(frame_id);
                if let Err(e) = self.disk_manager.write_page(old_page_id, page.data()) {
                    drop(page);
                    state.replacer.unpin(frame_id);
                    tracing::warn!(
                        page_id = %old_page_id,
                        frame_id,
                        error = %e,
                        "failed to write back victim"
                    );
                    return Err(e.into());
                }
                state.stats.disk_writes += 1;
            }
            state.page_table.remove(&old_page_id);
            state.stats.evictions += 1;
            tracing::debug!(page_id = %old_page_id, frame_id, dirty = meta.dirty, "evicted page");
        }

        state.meta[frame_id].clear();
        Ok(frame_id)
    }

    /// Writes a page the caller pinned for the flush, then drops that pin.
    ///
    /// Must be called without the pool latch. A failed write leaves the page dirty.
    fn write_back(&self, frame_id: FrameId, page_id: PageId) -> BufferResult<()> {
        let result = {
            let page = self.read_frame(frame_id);
            self.disk_manager.write_page(page_id, page.data())
        };

        let mut guard = self.state();
        let state = &mut *guard;
        match &result {
            Ok(()) => {
                state.stats.disk_writes += 1;
                tracing::trace!(%page_id, frame_id, "flushed page");
            }
            Err(e) => {
                state.meta[frame_id].dirty = true;
                tracing::warn!(%page_id, frame_id, error = %e, "failed to flush page");
            }
        }
        Self::release_frame(state, frame_id);

        result.map_err(Into::into)
    }

    /// Adds a pin, taking the frame away from the replacer on the first one.
    fn pin_frame(state: &mut PoolState<R>, frame_id: FrameId) {
        let meta = &mut state.meta[frame_id];
        meta.pin();
        if meta.pin_count == 1 {
            state.replacer.pin(frame_id);
        }
    }

    /// Drops a pin, handing the frame to the replacer when the last one goes. Floored at 0.
    fn release_frame(state: &mut PoolState<R>, frame_id: FrameId) {
        let meta = &mut state.meta[frame_id];
        let was_pinned = meta.is_pinned();
        meta.unpin();
        if was_pinned && !meta.is_pinned() {
            state.replacer.unpin(frame_id);
        }
    }

    fn lookup(state: &PoolState<R>, page_id: PageId) -> BufferResult<FrameId> {
        state
            .page_table
            .get(&page_id)
            .copied()
            .ok_or(BufferError::NotFound(page_id))
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, PoolState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_frame(&self, frame_id: FrameId) -> RwLockReadGuard<'_, Page> {
        self.frames[frame_id]
            .page
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_frame(&self, frame_id: FrameId) -> RwLockWriteGuard<'_, Page> {
        self.frames[frame_id]
            .page
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: DiskManager, R: Replacer> fmt::Debug for BufferPoolManager<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPoolManager")
            .field("pool_size", &self.frames.len())
            .field("log_manager", &self.log_manager)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
impl<D: DiskManager, R: Replacer> BufferPoolManager<D, R> {
    /// Asserts the structural invariants: every frame is free, tracked by the replacer or pinned,
    /// and the page table agrees with the frame bookkeeping.
    pub(crate) fn assert_invariants(&self) {
        let state = self.state();

        assert!(state.page_table.len() <= self.frames.len());
        for (&page_id, &frame_id) in &state.page_table {
            assert_eq!(state.meta[frame_id].page_id, Some(page_id));
        }

        let pinned = state.meta.iter().filter(|m| m.is_pinned()).count();
        let resident = state.meta.iter().filter(|m| m.page_id.is_some()).count();
        assert_eq!(resident, state.page_table.len());
        assert_eq!(
            state.free_list.len() + state.replacer.size() + pinned,
            self.frames.len()
        );
        for &frame_id in &state.free_list {
            assert_eq!(state.meta[frame_id], FrameMeta::default());
        }
    }

    /// Page id currently held by the frame's page buffer.
    pub(crate) fn frame_page_id(&self, frame_id: FrameId) -> PageId {
        self.read_frame(frame_id).page_id()
    }
}

#[cfg(test)]
impl<D: DiskManager, R: Replacer + Clone + PartialEq> BufferPoolManager<D, R> {
    /// Copy of the pool bookkeeping, for before/after comparisons.
    pub(crate) fn snapshot(&self) -> PoolSnapshot<R> {
        let state = self.state();
        let mut page_table: Vec<_> = state.page_table.iter().map(|(&p, &f)| (p, f)).collect();
        page_table.sort_unstable();
        PoolSnapshot {
            page_table,
            free_list: state.free_list.iter().copied().collect(),
            meta: state.meta.clone(),
            replacer: state.replacer.clone(),
        }
    }
}

#[cfg(test)]
#[derive(Debug, PartialEq)]
pub(crate) struct PoolSnapshot<R> {
    page_table: Vec<(PageId, FrameId)>,
    free_list: Vec<FrameId>,
    meta: Vec<FrameMeta>,
    replacer: R,
}
