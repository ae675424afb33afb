use std::fmt;

/// A unique identifier for any page.
///
/// Identifiers are issued by the disk manager's allocator. The value `u32::MAX` is reserved as
/// [`PageId::INVALID`] and never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(u32);

impl PageId {
    /// Sentinel for "no page". Carried by frames that do not hold a page.
    pub const INVALID: PageId = PageId(u32::MAX);

    /// Creates a new `PageId` from its page number.
    pub const fn new(page_number: u32) -> Self {
        Self(page_number)
    }

    /// The page number within the database file.
    pub const fn page_number(self) -> u32 {
        self.0
    }

    /// Whether this is a real identifier rather than the [`PageId::INVALID`] sentinel.
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// Byte offset of the page within a file of contiguous `page_size` pages.
    pub fn file_offset(self, page_size: usize) -> u64 {
        u64::from(self.0) * page_size as u64
    }
}

impl From<u32> for PageId {
    fn from(page_number: u32) -> Self {
        Self::new(page_number)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "<invalid>")
        }
    }
}
