/// Counters describing the pool's activity since creation or the last `reset_stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferPoolStats {
    /// Fetches served by an already resident page.
    pub cache_hits: u64,
    /// Fetches that had to load the page from disk.
    pub cache_misses: u64,
    /// Resident pages dropped to make room for another page.
    pub evictions: u64,
    /// Pages read from the disk manager.
    pub disk_reads: u64,
    /// Pages written to the disk manager, by flushes and by evictions of dirty pages.
    pub disk_writes: u64,
}

impl BufferPoolStats {
    /// Cache hit rate between 0.0 and 1.0. `None` if there have been no fetches.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.total_accesses();
        if total == 0 {
            None
        } else {
            Some(self.cache_hits as f64 / total as f64)
        }
    }

    /// Total number of fetches (hits + misses).
    pub fn total_accesses(&self) -> u64 {
        self.cache_hits + self.cache_misses
    }
}
