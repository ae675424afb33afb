use crate::frame::FrameId;
use crate::replacer::Replacer;
use std::collections::{HashSet, VecDeque};

/// Strict LRU over unpin order.
///
/// Tracked frames are kept in the order in which they became evictable. The head (least recently
/// unpinned) is always the next victim. Unpinning a frame that is already tracked does not move it;
/// it only moves to the tail if it was pinned in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LruReplacer {
    /// Frames in eviction order (front = least recently unpinned).
    queue: VecDeque<FrameId>,
    /// Membership index for `queue`.
    tracked: HashSet<FrameId>,
    /// Maximum number of frames tracked at once.
    capacity: usize,
}

impl Replacer for LruReplacer {
    fn new(num_pages: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(num_pages),
            tracked: HashSet::with_capacity(num_pages),
            capacity: num_pages,
        }
    }

    fn victim(&mut self) -> Option<FrameId> {
        let frame_id = self.queue.pop_front()?;
        self.tracked.remove(&frame_id);
        Some(frame_id)
    }

    fn pin(&mut self, frame_id: FrameId) {
        if self.tracked.remove(&frame_id) {
            self.queue.retain(|&id| id != frame_id);
        }
    }

    fn unpin(&mut self, frame_id: FrameId) {
        if self.tracked.contains(&frame_id) {
            return;
        }
        if self.queue.len() >= self.capacity {
            tracing::warn!(
                frame_id,
                capacity = self.capacity,
                "lru replacer is full, frame not tracked"
            );
            return;
        }
        self.tracked.insert(frame_id);
        self.queue.push_back(frame_id);
    }

    fn size(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn victims(replacer: &mut LruReplacer) -> Vec<FrameId> {
        std::iter::from_fn(|| replacer.victim()).collect()
    }

    #[test]
    fn victims_follow_unpin_order() {
        let mut replacer = LruReplacer::new(7);

        replacer.unpin(0);
        replacer.unpin(1);
        replacer.unpin(2);

        assert_eq!(replacer.size(), 3);
        assert_eq!(replacer.victim(), Some(0));
        assert_eq!(replacer.victim(), Some(1));
        assert_eq!(replacer.victim(), Some(2));
        assert_eq!(replacer.victim(), None);
        assert_eq!(replacer.size(), 0);
    }

    #[test]
    fn victim_on_empty_returns_none() {
        let mut replacer = LruReplacer::new(3);
        assert_eq!(replacer.victim(), None);
    }

    #[test]
    fn repeated_unpin_keeps_position() {
        let mut replacer = LruReplacer::new(7);

        replacer.unpin(1);
        replacer.unpin(2);
        replacer.unpin(3);
        replacer.unpin(1);

        assert_eq!(replacer.size(), 3);
        assert_eq!(victims(&mut replacer), vec![1, 2, 3]);
    }

    #[test]
    fn pin_then_unpin_moves_to_tail() {
        let mut replacer = LruReplacer::new(7);

        replacer.unpin(1);
        replacer.unpin(2);
        replacer.unpin(3);
        replacer.pin(1);
        replacer.unpin(1);

        assert_eq!(victims(&mut replacer), vec![2, 3, 1]);
    }

    #[test]
    fn pin_removes_from_middle() {
        let mut replacer = LruReplacer::new(7);

        replacer.unpin(1);
        replacer.unpin(2);
        replacer.unpin(3);
        replacer.pin(2);

        assert_eq!(replacer.size(), 2);
        assert_eq!(victims(&mut replacer), vec![1, 3]);
    }

    #[test]
    fn pin_of_untracked_frame_is_noop() {
        let mut replacer = LruReplacer::new(7);

        replacer.unpin(1);
        replacer.pin(5);
        replacer.pin(5);

        assert_eq!(replacer.size(), 1);
        assert_eq!(replacer.victim(), Some(1));
    }

    #[test]
    fn unpin_beyond_capacity_is_ignored() {
        let mut replacer = LruReplacer::new(2);

        replacer.unpin(0);
        replacer.unpin(1);
        replacer.unpin(2);

        assert_eq!(replacer.size(), 2);
        assert_eq!(victims(&mut replacer), vec![0, 1]);
    }

    #[test]
    fn sample_sequence() {
        let mut replacer = LruReplacer::new(7);

        for frame_id in 1..=6 {
            replacer.unpin(frame_id);
        }
        replacer.unpin(1);
        assert_eq!(replacer.size(), 6);

        assert_eq!(replacer.victim(), Some(1));
        assert_eq!(replacer.victim(), Some(2));
        assert_eq!(replacer.victim(), Some(3));

        replacer.pin(3);
        replacer.pin(4);
        assert_eq!(replacer.size(), 2);

        replacer.unpin(4);
        assert_eq!(replacer.victim(), Some(5));
        assert_eq!(replacer.victim(), Some(6));
        assert_eq!(replacer.victim(), Some(4));
    }
}
