//! This crate provides the page abstraction shared by the storage crates.

/// Fixed-size byte container for a single page.
pub mod page;

/// Unique identifier for pages.
pub mod page_id;

/// Fixed-size of a page in bytes
pub const PAGE_SIZE: usize = 4096;
