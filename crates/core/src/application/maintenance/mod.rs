// Blob Reaper - retries blob deletion for confirmed jobs
// Post-confirm deletes are best effort; this catches the ones that failed.

use crate::application::constants::REAPER_BATCH_SIZE;
use crate::application::shutdown::ShutdownToken;
use crate::error::Result;
use crate::port::{BlobError, BlobStore, PrintJobRepository, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapStats {
    pub examined: usize,
    pub deleted: usize,
    pub failed: usize,
}

pub struct BlobReaper {
    jobs: Arc<dyn PrintJobRepository>,
    blobs: Arc<dyn BlobStore>,
    time_provider: Arc<dyn TimeProvider>,
    interval: Duration,
}

impl BlobReaper {
    pub fn new(
        jobs: Arc<dyn PrintJobRepository>,
        blobs: Arc<dyn BlobStore>,
        time_provider: Arc<dyn TimeProvider>,
        interval: Duration,
    ) -> Self {
        Self {
            jobs,
            blobs,
            time_provider,
            interval,
        }
    }

    /// Run the reaper loop until shutdown (background task)
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(interval_secs = self.interval.as_secs(), "Blob reaper started");

        let mut tick = interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {}
                _ = shutdown.wait() => break,
            }

            match self.sweep_once().await {
                Ok(stats) if stats.examined > 0 => {
                    info!(
                        examined = stats.examined,
                        deleted = stats.deleted,
                        failed = stats.failed,
                        "Blob sweep completed"
                    );
                }
                Ok(_) => debug!("Blob sweep: nothing to do"),
                Err(e) => error!(error = %e, "Blob sweep failed"),
            }
        }

        info!("Blob reaper stopped");
    }

    /// Delete blobs of confirmed jobs still holding one. A missing blob counts as deleted.
    pub async fn sweep_once(&self) -> Result<ReapStats> {
        let pending = self.jobs.find_unreaped(REAPER_BATCH_SIZE).await?;
        let mut stats = ReapStats {
            examined: pending.len(),
            ..Default::default()
        };

        for job in pending {
            match self.blobs.delete(&job.blob_path).await {
                Ok(()) | Err(BlobError::NotFound(_)) => {
                    let now = self.time_provider.now_millis();
                    match self.jobs.mark_blob_deleted(job.id, now).await {
                        Ok(()) => stats.deleted += 1,
                        Err(e) => {
                            // Blob is gone; next sweep sees NotFound and stamps it
                            warn!(job_id = job.id, error = %e, "Failed to record blob deletion");
                            stats.failed += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(job_id = job.id, blob_path = %job.blob_path, error = %e, "Blob delete failed, will retry");
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }
}
