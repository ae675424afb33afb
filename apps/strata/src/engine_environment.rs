use crate::config::EngineConfig;
use buffer::buffer::BufferPoolManager;
use buffer::errors::BufferResult;
use buffer::replacer::Replacer;
use disk::disk_file_manager::DiskFileManager;
use disk::errors::DiskResult;
use std::sync::Arc;

/// Owner of the singleton-like instances that are needed for the entire lifetime of the server
#[derive(Debug)]
pub struct EngineEnvironment<R: Replacer> {
    pub disk_manager: Arc<DiskFileManager>,
    pub buffer: Arc<BufferPoolManager<DiskFileManager, R>>,
    pub engine_config: EngineConfig,
}

impl<R: Replacer> EngineEnvironment<R> {
    pub fn new(config: EngineConfig) -> DiskResult<Self> {
        let disk_manager = Arc::new(DiskFileManager::open(config.storage.database_path())?);
        let buffer = Arc::new(BufferPoolManager::new(
            disk_manager.clone(),
            config.storage.buffer_pages.get(),
        ));
        Ok(Self {
            disk_manager,
            buffer,
            engine_config: config,
        })
    }

    /// Writes every resident page back, syncs the database file and reports the pool statistics.
    pub fn shutdown(&self) -> BufferResult<()> {
        self.buffer.flush_all_pages()?;
        self.disk_manager.sync_all()?;

        let stats = self.buffer.stats();
        tracing::info!(
            hits = stats.cache_hits,
            misses = stats.cache_misses,
            hit_rate = stats.hit_rate().unwrap_or_default(),
            evictions = stats.evictions,
            disk_reads = stats.disk_reads,
            disk_writes = stats.disk_writes,
            "buffer pool statistics"
        );
        Ok(())
    }
}
