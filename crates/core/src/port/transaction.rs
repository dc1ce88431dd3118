// Transaction port for atomic queue operations

use crate::domain::{NewPrintJob, PrintJob, PrintJobId, UserId};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional print job operations
#[async_trait]
pub trait TransactionalPrintJobRepository: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn PrintJobTransaction>>;
}

/// Print job writes that must be atomic with respect to a shop's queue
#[async_trait]
pub trait PrintJobTransaction: Transaction {
    /// Insert a job. Queue jobs get `max(position) + 1` for their shop in the same statement.
    async fn insert(&mut self, job: &NewPrintJob) -> Result<PrintJob>;

    /// Move a pending queued job of `shop_id` to downloaded and clear its position.
    ///
    /// Returns the former position, or `None` when no pending job matched.
    async fn complete_queued(
        &mut self,
        id: PrintJobId,
        shop_id: UserId,
        now_millis: i64,
    ) -> Result<Option<i64>>;

    /// Confirm a private job for `shop_id`. Returns false if it was already confirmed.
    async fn complete_private(
        &mut self,
        id: PrintJobId,
        shop_id: UserId,
        now_millis: i64,
    ) -> Result<bool>;

    /// Decrement every pending position of `shop_id` above `position` by one
    async fn close_gap(&mut self, shop_id: UserId, position: i64) -> Result<u64>;
}
