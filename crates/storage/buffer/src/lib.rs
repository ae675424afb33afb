//! Buffer management module for storage system.
//!
//! The [`buffer::BufferPoolManager`] caches pages in a fixed number of frames and hands them out as
//! pinned [`guards::PageHandle`]s. Which unpinned page gets evicted is decided by a [`replacer::Replacer`].

pub mod buffer;
pub mod errors;
mod frame;

/// Exposes `guard`-like structs that will provide the access to the `Page` instances
/// from the buffer via `&Page`
pub mod guards;

pub mod replacer;
pub mod stats;

pub use frame::FrameId;

#[cfg(test)]
mod tests;
