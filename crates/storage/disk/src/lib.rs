//! The `disk` crate is responsible for the interaction between the engine and the file system.
//! It defines the collaborator interfaces consumed by the buffer pool (`DiskManager`, `LogManager`)
//! and ships the disk managers used by the engine and its tests.

pub mod api;

mod allocator;

/// The actual disk based page store
pub mod disk_file_manager;

pub mod errors;

/// A volatile page store, used by tests and short-lived pools
pub mod in_memory_disk_manager;

pub mod log_manager;
