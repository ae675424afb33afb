use crate::frame::FrameId;
use crate::replacer::Replacer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClockEntry {
    frame_id: FrameId,
    /// Second-chance bit. Set on every unpin, cleared when the hand passes over the entry.
    referenced: bool,
}

/// CLOCK (second-chance) replacer.
///
/// The tracked frames form a logical ring, stored as a `Vec` that only ever contains tracked
/// entries. `hand` addresses the next candidate; the ring is read from `hand` to the end and wraps
/// around to index 0. New entries go in right behind the hand, so they are the last ones the hand
/// reaches.
///
/// Invariant: `hand < ring.len()`, or `hand == 0` when the ring is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockReplacer {
    ring: Vec<ClockEntry>,
    hand: usize,
    capacity: usize,
}

impl ClockReplacer {
    fn position(&self, frame_id: FrameId) -> Option<usize> {
        self.ring.iter().position(|e| e.frame_id == frame_id)
    }

    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.ring.len();
    }
}

impl Replacer for ClockReplacer {
    fn new(num_pages: usize) -> Self {
        Self {
            ring: Vec::with_capacity(num_pages),
            hand: 0,
            capacity: num_pages,
        }
    }

    fn victim(&mut self) -> Option<FrameId> {
        if self.ring.is_empty() {
            return None;
        }

        // One full sweep clears every bit, so this ends within two passes.
        loop {
            let entry = &mut self.ring[self.hand];
            if entry.referenced {
                entry.referenced = false;
                self.advance();
                continue;
            }

            let victim = self.ring.remove(self.hand);
            // the hand already addresses the next survivor, unless we removed the last slot
            if self.hand >= self.ring.len() {
                self.hand = 0;
            }
            return Some(victim.frame_id);
        }
    }

    fn pin(&mut self, frame_id: FrameId) {
        let Some(pos) = self.position(frame_id) else {
            return;
        };

        self.ring.remove(pos);
        if pos < self.hand {
            self.hand -= 1;
        }
        if self.hand >= self.ring.len() {
            self.hand = 0;
        }
    }

    fn unpin(&mut self, frame_id: FrameId) {
        if let Some(pos) = self.position(frame_id) {
            self.ring[pos].referenced = true;
            return;
        }
        if self.ring.len() >= self.capacity {
            tracing::warn!(
                frame_id,
                capacity = self.capacity,
                "clock replacer is full, frame not tracked"
            );
            return;
        }

        self.ring.insert(
            self.hand,
            ClockEntry {
                frame_id,
                referenced: true,
            },
        );
        self.advance();
    }

    fn size(&self) -> usize {
        self.ring.len()
    }
}
