// Queue Manager - dense per-shop queue positions

use crate::domain::{NewPrintJob, PrintJob, PrintJobId, PrintType, QueueEntry, UserId};
use crate::error::{AppError, Result};
use crate::port::{PrintJobRepository, PrintJobTransaction, TransactionalPrintJobRepository};
use std::sync::Arc;
use tracing::{debug, info};

/// Assigns queue positions on enqueue and closes the gap on dequeue.
///
/// Positions among a shop's pending queue jobs are always exactly `1..=N`.
/// Serialization comes from the store's transactions, not in-process locks.
pub struct QueueManager {
    jobs: Arc<dyn PrintJobRepository>,
    tx_repo: Arc<dyn TransactionalPrintJobRepository>,
}

impl QueueManager {
    pub fn new(
        jobs: Arc<dyn PrintJobRepository>,
        tx_repo: Arc<dyn TransactionalPrintJobRepository>,
    ) -> Self {
        Self { jobs, tx_repo }
    }

    /// Persist a queue job at the tail of its shop's queue
    pub async fn enqueue(&self, job: &NewPrintJob) -> Result<PrintJob> {
        let shop_id = match (job.print_type, job.shop_id) {
            (PrintType::Queue, Some(shop_id)) => shop_id,
            _ => {
                return Err(AppError::Validation(
                    "only queue prints with a shop can be enqueued".to_string(),
                ))
            }
        };

        let mut tx = self.tx_repo.begin_transaction().await?;
        let stored = tx.insert(job).await?;
        tx.commit().await?;

        info!(
            job_id = stored.id,
            shop_id,
            position = stored.queue_position,
            "Job enqueued"
        );
        Ok(stored)
    }

    /// Remove a pending job from `shop_id`'s queue inside `tx` and renumber the rest.
    ///
    /// Returns the former position, or `None` if the job was not pending in that queue.
    pub async fn dequeue(
        tx: &mut dyn PrintJobTransaction,
        shop_id: UserId,
        job_id: PrintJobId,
        now_millis: i64,
    ) -> Result<Option<i64>> {
        let Some(position) = tx.complete_queued(job_id, shop_id, now_millis).await? else {
            return Ok(None);
        };

        let shifted = tx.close_gap(shop_id, position).await?;
        debug!(job_id, shop_id, position, shifted, "Queue renumbered");
        Ok(Some(position))
    }

    /// Pending queue of `shop_id`, front first
    pub async fn list_queue(&self, shop_id: UserId) -> Result<Vec<QueueEntry>> {
        self.jobs.list_queue(shop_id).await
    }
}
