use buffer::buffer::BufferPoolManager;
use buffer::replacer::Replacer;
use disk::api::DiskManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Periodically writes every resident page back to disk until `shutdown` is cancelled.
///
/// The flush blocks on disk I/O and on page latches held by clients, so it runs on the blocking pool.
pub async fn run_flusher<D, R>(
    pool: Arc<BufferPoolManager<D, R>>,
    period: Duration,
    shutdown: CancellationToken,
) where
    D: DiskManager + 'static,
    R: Replacer + 'static,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!("flusher stopped");
                break;
            }

            _ = ticker.tick() => {
                let pool = pool.clone();
                match task::spawn_blocking(move || pool.flush_all_pages()).await {
                    Ok(Ok(())) => tracing::trace!("periodic flush complete"),
                    Ok(Err(e)) => tracing::warn!(error = %e, "periodic flush failed"),
                    Err(join_err) => tracing::warn!("flush task ended with error: {join_err}"),
                }
            }
        }
    }
}
