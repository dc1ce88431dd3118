// Print Job Lifecycle - redeem / confirm transitions and blob release

use crate::application::access::require_role;
use crate::application::queue::QueueManager;
use crate::domain::{DomainError, Identity, PrintJob, PrintJobId, Role};
use crate::error::{AppError, Result};
use crate::port::{
    BlobError, BlobStore, PrintJobRepository, TimeProvider, TransactionalPrintJobRepository,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Drives jobs from `uploaded` to `downloaded`.
///
/// Every transition checks the domain rules first, then applies a conditional
/// update in the store. Blob deletion happens only after commit and never
/// undoes a committed transition.
pub struct PrintLifecycle {
    jobs: Arc<dyn PrintJobRepository>,
    tx_repo: Arc<dyn TransactionalPrintJobRepository>,
    blobs: Arc<dyn BlobStore>,
    time_provider: Arc<dyn TimeProvider>,
}

impl PrintLifecycle {
    pub fn new(
        jobs: Arc<dyn PrintJobRepository>,
        tx_repo: Arc<dyn TransactionalPrintJobRepository>,
        blobs: Arc<dyn BlobStore>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            jobs,
            tx_repo,
            blobs,
            time_provider,
        }
    }

    async fn job_by_code(&self, code: &str) -> Result<PrintJob> {
        self.jobs
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("print job with code {}", code)))
    }

    async fn job_by_id(&self, id: PrintJobId) -> Result<PrintJob> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("print job {}", id)))
    }

    /// Public status lookup by code
    pub async fn status(&self, code: &str) -> Result<PrintJob> {
        self.job_by_code(code).await
    }

    /// Serve a private job's bytes to a shopkeeper and mark it downloaded.
    ///
    /// The blob stays in place until `confirm_private`.
    pub async fn redeem_private(
        &self,
        identity: &Identity,
        code: &str,
    ) -> Result<(PrintJob, Vec<u8>)> {
        require_role(identity, Role::Shopkeeper)?;
        let mut job = self.job_by_code(code).await?;
        let now = self.time_provider.now_millis();
        job.redeem(now)?;

        let data = self.read_document(&job).await?;

        if !self.jobs.mark_redeemed(job.id, now).await? {
            return Err(DomainError::AlreadyRedeemed(code.to_string()).into());
        }

        info!(job_id = job.id, code, shop_id = identity.user_id, "Private job redeemed");
        Ok((job, data))
    }

    /// Confirm a private job as printed by the calling shop, then delete its blob
    pub async fn confirm_private(&self, identity: &Identity, code: &str) -> Result<PrintJob> {
        require_role(identity, Role::Shopkeeper)?;
        let mut job = self.job_by_code(code).await?;
        let now = self.time_provider.now_millis();
        job.confirm_private(identity.user_id, now)?;

        let mut tx = self.tx_repo.begin_transaction().await?;
        if !tx.complete_private(job.id, identity.user_id, now).await? {
            tx.rollback().await?;
            return Err(DomainError::AlreadyRedeemed(code.to_string()).into());
        }
        tx.commit().await?;

        info!(job_id = job.id, code, shop_id = identity.user_id, "Private job confirmed");
        self.release_blob(&mut job).await;
        Ok(job)
    }

    /// Confirm a queued job for its assigned shop, renumber the queue, then delete its blob
    pub async fn confirm_queue(&self, identity: &Identity, job_id: PrintJobId) -> Result<PrintJob> {
        require_role(identity, Role::Shopkeeper)?;
        let mut job = self.job_by_id(job_id).await?;
        let now = self.time_provider.now_millis();
        job.confirm_queued(identity.user_id, now)?;

        let mut tx = self.tx_repo.begin_transaction().await?;
        let Some(former) =
            QueueManager::dequeue(tx.as_mut(), identity.user_id, job_id, now).await?
        else {
            tx.rollback().await?;
            return Err(DomainError::AlreadyRedeemed(job.code.to_string()).into());
        };
        tx.commit().await?;

        info!(job_id, shop_id = identity.user_id, position = former, "Queued job confirmed");

        self.release_blob(&mut job).await;
        Ok(job)
    }

    /// Fetch a queued job's bytes for its assigned shop without changing its state
    pub async fn download_queued(
        &self,
        identity: &Identity,
        job_id: PrintJobId,
    ) -> Result<(PrintJob, Vec<u8>)> {
        require_role(identity, Role::Shopkeeper)?;
        let job = self.job_by_id(job_id).await?;
        job.ensure_queued_for(identity.user_id)?;

        let data = self.read_document(&job).await?;
        Ok((job, data))
    }

    /// Bytes of a pending job. A missing blob is reported as `NotFound`.
    async fn read_document(&self, job: &PrintJob) -> Result<Vec<u8>> {
        match self.blobs.get(&job.blob_path).await {
            Ok(data) => Ok(data),
            Err(BlobError::NotFound(_)) => {
                warn!(job_id = job.id, blob_path = %job.blob_path, "Document missing for pending job");
                Err(AppError::NotFound(format!("document for print job {}", job.id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort blob delete after a committed confirm. Failures are logged and
    /// left to the reaper.
    async fn release_blob(&self, job: &mut PrintJob) {
        match self.blobs.delete(&job.blob_path).await {
            Ok(()) | Err(BlobError::NotFound(_)) => {
                let now = self.time_provider.now_millis();
                match self.jobs.mark_blob_deleted(job.id, now).await {
                    Ok(()) => job.blob_deleted_at = Some(now),
                    Err(e) => warn!(job_id = job.id, error = %e, "Failed to record blob deletion"),
                }
            }
            Err(e) => {
                warn!(
                    job_id = job.id,
                    blob_path = %job.blob_path,
                    error = %e,
                    "Blob delete failed after confirm; reaper will retry"
                );
            }
        }
    }
}
