//! Redeem/confirm state machine and post-commit blob handling.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{assert_dense, Harness, SAMPLE_BYTES};
use qprint_core::application::BlobReaper;
use qprint_core::domain::{
    DomainError, JobStatus, OwnedJob, PrintJob, PrintJobId, QueueEntry, UserId,
};
use qprint_core::port::{BlobStore, PrintJobRepository};
use qprint_core::{AppError, Result};
use qprint_infra_sqlite::SqlitePrintJobRepository;

/// Delegates to SQLite but refuses to stamp `blob_deleted_at` for one job
struct StampFailingRepository {
    inner: Arc<SqlitePrintJobRepository>,
    fail_for: PrintJobId,
}

#[async_trait]
impl PrintJobRepository for StampFailingRepository {
    async fn find_by_id(&self, id: PrintJobId) -> Result<Option<PrintJob>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<PrintJob>> {
        self.inner.find_by_code(code).await
    }

    async fn list_queue(&self, shop_id: UserId) -> Result<Vec<QueueEntry>> {
        self.inner.list_queue(shop_id).await
    }

    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<OwnedJob>> {
        self.inner.list_by_owner(user_id).await
    }

    async fn list_confirmed_by_shop(&self, shop_id: UserId) -> Result<Vec<PrintJob>> {
        self.inner.list_confirmed_by_shop(shop_id).await
    }

    async fn mark_redeemed(&self, id: PrintJobId, now_millis: i64) -> Result<bool> {
        self.inner.mark_redeemed(id, now_millis).await
    }

    async fn mark_blob_deleted(&self, id: PrintJobId, now_millis: i64) -> Result<()> {
        if id == self.fail_for {
            return Err(AppError::Database("database is locked".to_string()));
        }
        self.inner.mark_blob_deleted(id, now_millis).await
    }

    async fn find_unreaped(&self, limit: i64) -> Result<Vec<PrintJob>> {
        self.inner.find_unreaped(limit).await
    }
}

#[tokio::test]
async fn test_status_is_public() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let job = h.upload_private(&customer).await;

    let status = h.lifecycle.status(job.code.as_str()).await.unwrap();
    assert_eq!(status.status, JobStatus::Uploaded);

    let missing = h.lifecycle.status("ZZZZZZ").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_redeem_private_twice() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("corner-print", 12.97, 77.59).await;
    let job = h.upload_private(&customer).await;

    let (redeemed, data) = h
        .lifecycle
        .redeem_private(&shop, job.code.as_str())
        .await
        .unwrap();
    assert_eq!(data, SAMPLE_BYTES);
    assert_eq!(redeemed.status, JobStatus::Downloaded);

    let again = h.lifecycle.redeem_private(&shop, job.code.as_str()).await;
    assert!(matches!(
        again,
        Err(AppError::Domain(DomainError::AlreadyRedeemed(_)))
    ));

    // Redeem alone keeps the blob until confirm
    assert!(h.blobs.contains(&job.blob_path));
    let stored = h.jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Downloaded);
    assert!(stored.downloaded_at.is_some());
    assert!(stored.confirmed_at.is_none());
}

#[tokio::test]
async fn test_customer_cannot_redeem() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let job = h.upload_private(&customer).await;

    let result = h.lifecycle.redeem_private(&customer, job.code.as_str()).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let stored = h.jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Uploaded);
}

#[tokio::test]
async fn test_confirm_private_deletes_blob_once() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("corner-print", 12.97, 77.59).await;
    let job = h.upload_private(&customer).await;

    h.lifecycle
        .redeem_private(&shop, job.code.as_str())
        .await
        .unwrap();
    h.clock.advance(1_000);
    let confirmed = h
        .lifecycle
        .confirm_private(&shop, job.code.as_str())
        .await
        .unwrap();

    assert_eq!(confirmed.shop_id, Some(shop.user_id));
    assert!(!h.blobs.contains(&job.blob_path));
    assert_eq!(h.blobs.delete_calls(), 1);

    let stored = h.jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert!(stored.confirmed_at.is_some());
    assert!(stored.blob_deleted_at.is_some());

    let again = h.lifecycle.confirm_private(&shop, job.code.as_str()).await;
    assert!(matches!(
        again,
        Err(AppError::Domain(DomainError::AlreadyRedeemed(_)))
    ));
    assert_eq!(h.blobs.delete_calls(), 1);
}

#[tokio::test]
async fn test_confirm_private_without_redeem() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("corner-print", 12.97, 77.59).await;
    let job = h.upload_private(&customer).await;

    let confirmed = h
        .lifecycle
        .confirm_private(&shop, job.code.as_str())
        .await
        .unwrap();
    assert_eq!(confirmed.status, JobStatus::Downloaded);

    let history = h.reports().shop_history(&shop).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, job.id);
}

#[tokio::test]
async fn test_confirm_queue_wrong_shop() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("shop-a", 0.0, 0.0).await;
    let other = h.shop("shop-b", 0.0, 1.0).await;

    let first = h.upload_queued(&customer, &shop).await;
    h.upload_queued(&customer, &shop).await;
    let before = h.positions(&shop).await;

    let result = h.lifecycle.confirm_queue(&other, first.id).await;
    assert!(matches!(
        result,
        Err(AppError::Domain(DomainError::ShopMismatch { .. }))
    ));

    assert_eq!(h.positions(&shop).await, before);
    assert!(h.blobs.contains(&first.blob_path));
}

#[tokio::test]
async fn test_confirm_queue_twice() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("shop-a", 0.0, 0.0).await;
    let job = h.upload_queued(&customer, &shop).await;

    h.lifecycle.confirm_queue(&shop, job.id).await.unwrap();
    let again = h.lifecycle.confirm_queue(&shop, job.id).await;
    assert!(matches!(
        again,
        Err(AppError::Domain(DomainError::AlreadyRedeemed(_)))
    ));
}

#[tokio::test]
async fn test_download_queued_keeps_state() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("shop-a", 0.0, 0.0).await;
    let other = h.shop("shop-b", 0.0, 1.0).await;
    let job = h.upload_queued(&customer, &shop).await;

    let (_, data) = h.lifecycle.download_queued(&shop, job.id).await.unwrap();
    assert_eq!(data, SAMPLE_BYTES);
    assert_eq!(h.positions(&shop).await, vec![(job.id, 1)]);

    let denied = h.lifecycle.download_queued(&other, job.id).await;
    assert!(matches!(
        denied,
        Err(AppError::Domain(DomainError::ShopMismatch { .. }))
    ));
}

#[tokio::test]
async fn test_blob_delete_failure_is_not_fatal() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("shop-a", 0.0, 0.0).await;
    let first = h.upload_queued(&customer, &shop).await;
    h.upload_queued(&customer, &shop).await;

    h.blobs.set_fail_deletes(true);
    h.lifecycle.confirm_queue(&shop, first.id).await.unwrap();

    // Transition committed even though the blob survived
    let stored = h.jobs.find_by_id(first.id).await.unwrap().unwrap();
    assert!(stored.is_confirmed());
    assert!(stored.blob_deleted_at.is_none());
    assert!(h.blobs.contains(&first.blob_path));
    assert_dense(&h.positions(&shop).await);

    let reaper = h.reaper();
    let failed = reaper.sweep_once().await.unwrap();
    assert_eq!((failed.examined, failed.deleted, failed.failed), (1, 0, 1));

    h.blobs.set_fail_deletes(false);
    let swept = reaper.sweep_once().await.unwrap();
    assert_eq!((swept.examined, swept.deleted, swept.failed), (1, 1, 0));
    assert!(!h.blobs.contains(&first.blob_path));

    let stored = h.jobs.find_by_id(first.id).await.unwrap().unwrap();
    assert!(stored.blob_deleted_at.is_some());
    assert_eq!(reaper.sweep_once().await.unwrap().examined, 0);
}

#[tokio::test]
async fn test_reaper_skips_unconfirmed_redeems() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("shop-a", 0.0, 0.0).await;
    let job = h.upload_private(&customer).await;

    h.lifecycle
        .redeem_private(&shop, job.code.as_str())
        .await
        .unwrap();

    let stats = h.reaper().sweep_once().await.unwrap();
    assert_eq!(stats.examined, 0);
    assert!(h.blobs.contains(&job.blob_path));
}

#[tokio::test]
async fn test_reaper_continues_past_failed_stamp() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("shop-a", 0.0, 0.0).await;
    let first = h.upload_queued(&customer, &shop).await;
    let second = h.upload_queued(&customer, &shop).await;

    h.blobs.set_fail_deletes(true);
    h.lifecycle.confirm_queue(&shop, first.id).await.unwrap();
    h.clock.advance(1_000);
    h.lifecycle.confirm_queue(&shop, second.id).await.unwrap();
    h.blobs.set_fail_deletes(false);

    let reaper = BlobReaper::new(
        Arc::new(StampFailingRepository {
            inner: h.jobs.clone(),
            fail_for: first.id,
        }),
        h.blobs.clone(),
        h.clock.clone(),
        Duration::from_secs(60),
    );
    let stats = reaper.sweep_once().await.unwrap();
    assert_eq!((stats.examined, stats.deleted, stats.failed), (2, 1, 1));

    let stored = h.jobs.find_by_id(second.id).await.unwrap().unwrap();
    assert!(stored.blob_deleted_at.is_some());
    assert!(!h.blobs.contains(&first.blob_path));

    // Blob already gone, so the regular reaper only records it
    let retry = h.reaper().sweep_once().await.unwrap();
    assert_eq!((retry.examined, retry.deleted, retry.failed), (1, 1, 0));
    let stored = h.jobs.find_by_id(first.id).await.unwrap().unwrap();
    assert!(stored.blob_deleted_at.is_some());
}

#[tokio::test]
async fn test_missing_document_is_not_found() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("shop-a", 0.0, 0.0).await;
    let private = h.upload_private(&customer).await;
    let queued = h.upload_queued(&customer, &shop).await;

    h.blobs.delete(&private.blob_path).await.unwrap();
    h.blobs.delete(&queued.blob_path).await.unwrap();

    let redeemed = h.lifecycle.redeem_private(&shop, private.code.as_str()).await;
    assert!(matches!(redeemed, Err(AppError::NotFound(_))));
    let stored = h.jobs.find_by_id(private.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Uploaded);

    let downloaded = h.lifecycle.download_queued(&shop, queued.id).await;
    assert!(matches!(downloaded, Err(AppError::NotFound(_))));
}
