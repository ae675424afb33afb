//! Page replacement policies for the buffer pool.
//!
//! A replacer tracks the frames that are candidates for eviction: a frame becomes tracked when its
//! page's pin count drops to 0 and stops being tracked when it is pinned again or chosen as a victim.
//!
//! Replacers own no latch. They are only ever driven from inside the buffer pool's critical section,
//! hence the `&mut self` receivers.

use crate::frame::FrameId;
use serde::Deserialize;
use std::fmt;

mod clock;
mod lru;

pub use clock::ClockReplacer;
pub use lru::LruReplacer;

/// Eviction candidate selection.
pub trait Replacer: fmt::Debug + Send {
    /// Creates a replacer able to track up to `num_pages` frames.
    fn new(num_pages: usize) -> Self
    where
        Self: Sized;

    /// Selects a frame to evict, stops tracking it and returns it.
    /// `None` when no frame is evictable.
    fn victim(&mut self) -> Option<FrameId>;

    /// Stops tracking `frame_id`. No-op if it is not tracked.
    fn pin(&mut self, frame_id: FrameId);

    /// Starts tracking `frame_id` as evictable. A frame that is already tracked stays tracked once.
    fn unpin(&mut self, frame_id: FrameId);

    /// Number of frames currently tracked.
    fn size(&self) -> usize;
}

/// The replacement policies a pool can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacerPolicy {
    /// Strict least-recently-unpinned. See [`LruReplacer`].
    #[default]
    Lru,
    /// Second-chance approximation of LRU. See [`ClockReplacer`].
    Clock,
}

impl fmt::Display for ReplacerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacerPolicy::Lru => write!(f, "lru"),
            ReplacerPolicy::Clock => write!(f, "clock"),
        }
    }
}
