//! # Strata
//!
//! This is the main crate for the **strata** storage engine.
//!
//! The engine is composed of multiple internal components organized under
//! the `/crates` directory of this workspace:
//!
//! - `/storage/page`: page identifiers and the fixed-size page buffer.
//! - `/storage/disk`: the `DiskManager` and `LogManager` collaborators, with a file backed and an
//!   in-memory disk manager.
//! - `/storage/buffer`: the buffer pool manager and its LRU and CLOCK replacers.

pub use buffer;
pub use disk;
pub use page;
