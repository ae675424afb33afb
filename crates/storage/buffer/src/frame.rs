use page::page::Page;
use page::page_id::PageId;
use std::sync::RwLock;

/// The ID of a frame is basically just its index in the buffer's vector
pub type FrameId = usize;

/// A buffer frame is a memory allocation designed to store the contents of a data page in memory.
///
/// The `Page` is protected by a `RwLock` (the frame latch) so that pinned pages can be read and
/// written without holding the pool latch. An empty frame contains a zeroed `Page` whose id is
/// `PageId::INVALID`.
///
/// The `BufferFrame` is the owner of the `Page`. The `Page` is never moved outside of the frame,
/// only borrowed through guards.
#[derive(Debug)]
pub(crate) struct BufferFrame {
    pub(crate) page: RwLock<Page>,
}

impl Default for BufferFrame {
    fn default() -> Self {
        Self {
            page: RwLock::new(Page::new_zeroed(PageId::INVALID)),
        }
    }
}

/// Bookkeeping for one frame. Lives inside the pool state, so it is only touched under the pool latch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FrameMeta {
    /// The page bound to the frame. `None` while the frame is free.
    pub(crate) page_id: Option<PageId>,
    /// Number of active holders of the page.
    pub(crate) pin_count: u32,
    /// Set when the page was modified since it was last written back.
    pub(crate) dirty: bool,
}

impl FrameMeta {
    /// Binds the frame to `page_id` with a single pin and a clean page.
    pub(crate) fn install(&mut self, page_id: PageId) {
        self.page_id = Some(page_id);
        self.pin_count = 1;
        self.dirty = false;
    }

    /// Returns the frame to the unassigned state.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn pin(&mut self) {
        self.pin_count = self.pin_count.saturating_add(1);
    }

    /// Decrements the pin count, floored at 0.
    pub(crate) fn unpin(&mut self) {
        self.pin_count = self.pin_count.saturating_sub(1);
    }

    pub(crate) fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }
}
