// Upload Service - turns an uploaded document into a print job

pub mod validate;


pub use validate::{validate_request, UploadRequest, ValidatedUpload};

use crate::application::access::require_role;
use crate::application::constants::{FALLBACK_PAGE_COUNT, MAX_CODE_ATTEMPTS};
use crate::application::queue::QueueManager;
use crate::domain::{compute_cost, Identity, NewPrintJob, PrintJob, PrintType, Role};
use crate::error::{AppError, Result};
use crate::port::{
    BlobStore, CodeGenerator, PageCounter, TimeProvider, TransactionalPrintJobRepository,
    UserRepository,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct UploadService {
    queue: Arc<QueueManager>,
    tx_repo: Arc<dyn TransactionalPrintJobRepository>,
    users: Arc<dyn UserRepository>,
    blobs: Arc<dyn BlobStore>,
    page_counter: Arc<dyn PageCounter>,
    codes: Arc<dyn CodeGenerator>,
    time_provider: Arc<dyn TimeProvider>,
    max_upload_bytes: usize,
}

impl UploadService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: Arc<QueueManager>,
        tx_repo: Arc<dyn TransactionalPrintJobRepository>,
        users: Arc<dyn UserRepository>,
        blobs: Arc<dyn BlobStore>,
        page_counter: Arc<dyn PageCounter>,
        codes: Arc<dyn CodeGenerator>,
        time_provider: Arc<dyn TimeProvider>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            queue,
            tx_repo,
            users,
            blobs,
            page_counter,
            codes,
            time_provider,
            max_upload_bytes,
        }
    }

    /// Validate, store the bytes, price the job and persist it.
    ///
    /// Nothing is written before validation passes. If persisting fails the
    /// stored blob is removed again.
    pub async fn upload(&self, identity: &Identity, req: UploadRequest) -> Result<PrintJob> {
        require_role(identity, Role::Customer)?;
        let spec = validate_request(&req, self.max_upload_bytes)?;

        if let Some(shop_id) = spec.shop_id {
            let is_shop = self
                .users
                .find_by_id(shop_id)
                .await?
                .is_some_and(|u| u.role == Role::Shopkeeper);
            if !is_shop {
                return Err(AppError::NotFound(format!("shop {}", shop_id)));
            }
        }

        let page_count = match self.page_counter.count_pages(&req.data).await {
            Ok(n) => n,
            Err(e) => {
                warn!(file = %spec.file_name, error = %e, "Page count failed, using fallback");
                FALLBACK_PAGE_COUNT
            }
        };
        let total_cost = compute_cost(page_count, spec.copies);

        let blob_path = self.blobs.put(&spec.file_name, &req.data).await?;

        let mut new_job = NewPrintJob {
            user_id: identity.user_id,
            blob_path,
            original_name: spec.file_name,
            code: self.codes.generate(),
            print_type: spec.print_type,
            copies: spec.copies,
            print_mode: spec.print_mode,
            color_mode: spec.color_mode,
            paper_size: spec.paper_size,
            page_count,
            total_cost,
            shop_id: spec.shop_id,
            created_at: self.time_provider.now_millis(),
        };

        let mut attempt = 1;
        let outcome = loop {
            match self.persist(&new_job).await {
                Err(AppError::Conflict(msg)) if attempt < MAX_CODE_ATTEMPTS => {
                    warn!(attempt, code = %new_job.code, reason = %msg, "Redemption code taken, retrying");
                    attempt += 1;
                    new_job.code = self.codes.generate();
                }
                Err(AppError::Conflict(_)) => {
                    break Err(AppError::Conflict(
                        "could not allocate a unique redemption code".to_string(),
                    ))
                }
                other => break other,
            }
        };

        match outcome {
            Ok(job) => {
                info!(
                    job_id = job.id,
                    code = %job.code,
                    print_type = %job.print_type,
                    pages = job.page_count,
                    cost = job.total_cost,
                    "Print job uploaded"
                );
                Ok(job)
            }
            Err(e) => {
                if let Err(cleanup) = self.blobs.delete(&new_job.blob_path).await {
                    warn!(blob_path = %new_job.blob_path, error = %cleanup, "Orphan blob cleanup failed");
                }
                Err(e)
            }
        }
    }

    async fn persist(&self, job: &NewPrintJob) -> Result<PrintJob> {
        match job.print_type {
            PrintType::Queue => self.queue.enqueue(job).await,
            PrintType::Private => {
                let mut tx = self.tx_repo.begin_transaction().await?;
                let stored = tx.insert(job).await?;
                tx.commit().await?;
                Ok(stored)
            }
        }
    }
}
