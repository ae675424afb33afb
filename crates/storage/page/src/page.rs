//! The in-memory representation of a single page: its identifier and `PAGE_SIZE` bytes.
//!
//! A `Page` carries no interpretation of its contents. Layouts (slotted pages, index nodes, ...)
//! are built on top of the raw byte array by higher layers.

use crate::PAGE_SIZE;
use crate::page_id::PageId;

/// Wrapper around a fixed-size byte array representing a page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Identifier of the page currently held. `PageId::INVALID` while the page is unassigned.
    page_id: PageId,
    /// Main binary array holding the `PAGE_SIZE` bytes of data for the page. Boxed and owned by this struct.
    data: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    /// Creates a zero-filled page with the given identifier.
    pub fn new_zeroed(page_id: PageId) -> Self {
        Self {
            page_id,
            data: Box::new([0u8; PAGE_SIZE]),
        }
    }

    /// Returns the unique identifier of the page.
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Read access to the page bytes.
    pub fn data(&self) -> &[u8] {
        &self.data[..]
    }

    /// Write access to the page bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data[..]
    }

    /// Zeroes the data and rebinds the page to `page_id`.
    pub fn reset(&mut self, page_id: PageId) {
        self.data.fill(0);
        self.page_id = page_id;
    }

    /// Whether every byte of the page is zero.
    pub fn is_zeroed(&self) -> bool {
        self.data.iter().all(|b| *b == 0)
    }
}
