// Print Job Repository Port (Interface)

use crate::domain::{OwnedJob, PrintJob, PrintJobId, QueueEntry, UserId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for print job reads and single-row updates.
/// Queue-affecting writes go through `TransactionalPrintJobRepository`.
#[async_trait]
pub trait PrintJobRepository: Send + Sync {
    /// Find job by ID
    async fn find_by_id(&self, id: PrintJobId) -> Result<Option<PrintJob>>;

    /// Find job by redemption code
    async fn find_by_code(&self, code: &str) -> Result<Option<PrintJob>>;

    /// Pending queue of a shop, ascending by position
    async fn list_queue(&self, shop_id: UserId) -> Result<Vec<QueueEntry>>;

    /// Jobs uploaded by a user, newest first
    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<OwnedJob>>;

    /// Jobs confirmed by a shop, newest confirmation first
    async fn list_confirmed_by_shop(&self, shop_id: UserId) -> Result<Vec<PrintJob>>;

    /// Conditional uploaded -> downloaded for a private job. False if it was not pending.
    async fn mark_redeemed(&self, id: PrintJobId, now_millis: i64) -> Result<bool>;

    /// Stamp `blob_deleted_at`
    async fn mark_blob_deleted(&self, id: PrintJobId, now_millis: i64) -> Result<()>;

    /// Confirmed jobs whose blob has not been deleted yet (oldest first)
    async fn find_unreaped(&self, limit: i64) -> Result<Vec<PrintJob>>;
}
