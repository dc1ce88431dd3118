// SQLite PrintJobRepository Implementation

use crate::error::map_sqlx_error;
use crate::rows::{OwnedJobRow, PrintJobRow, QueueEntryRow};
use crate::SqlitePrintJobTransaction;
use async_trait::async_trait;
use qprint_core::domain::{OwnedJob, PrintJob, PrintJobId, QueueEntry, UserId};
use qprint_core::error::Result;
use qprint_core::port::{PrintJobRepository, PrintJobTransaction, TransactionalPrintJobRepository};
use sqlx::SqlitePool;

pub struct SqlitePrintJobRepository {
    pool: SqlitePool,
}

impl SqlitePrintJobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn into_jobs(rows: Vec<PrintJobRow>) -> Result<Vec<PrintJob>> {
    rows.into_iter().map(PrintJobRow::into_job).collect()
}

#[async_trait]
impl PrintJobRepository for SqlitePrintJobRepository {
    async fn find_by_id(&self, id: PrintJobId) -> Result<Option<PrintJob>> {
        let row: Option<PrintJobRow> = sqlx::query_as("SELECT * FROM print_jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(PrintJobRow::into_job).transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<PrintJob>> {
        let row: Option<PrintJobRow> =
            sqlx::query_as("SELECT * FROM print_jobs WHERE unique_code = ?")
                .bind(code)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.map(PrintJobRow::into_job).transpose()
    }

    async fn list_queue(&self, shop_id: UserId) -> Result<Vec<QueueEntry>> {
        let rows: Vec<QueueEntryRow> = sqlx::query_as(
            r#"
            SELECT j.*, u.username AS customer_name
            FROM print_jobs j
            JOIN users u ON u.id = j.user_id
            WHERE j.shop_id = ?
              AND j.status = 'uploaded'
              AND j.print_type = 'queue'
            ORDER BY j.queue_position ASC
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(QueueEntryRow::into_entry).collect()
    }

    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<OwnedJob>> {
        let rows: Vec<OwnedJobRow> = sqlx::query_as(
            r#"
            SELECT j.*,
                   s.username AS shop_name,
                   s.lat AS shop_lat,
                   s.long AS shop_long
            FROM print_jobs j
            LEFT JOIN users s ON s.id = j.shop_id
            WHERE j.user_id = ?
            ORDER BY j.created_at DESC, j.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(OwnedJobRow::into_owned).collect()
    }

    async fn list_confirmed_by_shop(&self, shop_id: UserId) -> Result<Vec<PrintJob>> {
        let rows: Vec<PrintJobRow> = sqlx::query_as(
            r#"
            SELECT * FROM print_jobs
            WHERE shop_id = ? AND confirmed_at IS NOT NULL
            ORDER BY confirmed_at DESC, id DESC
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        into_jobs(rows)
    }

    async fn mark_redeemed(&self, id: PrintJobId, now_millis: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE print_jobs
            SET status = 'downloaded', downloaded_at = ?
            WHERE id = ? AND print_type = 'private' AND status = 'uploaded'
            "#,
        )
        .bind(now_millis)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_blob_deleted(&self, id: PrintJobId, now_millis: i64) -> Result<()> {
        sqlx::query(
            "UPDATE print_jobs SET blob_deleted_at = ? WHERE id = ? AND blob_deleted_at IS NULL",
        )
        .bind(now_millis)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_unreaped(&self, limit: i64) -> Result<Vec<PrintJob>> {
        let rows: Vec<PrintJobRow> = sqlx::query_as(
            r#"
            SELECT * FROM print_jobs
            WHERE confirmed_at IS NOT NULL AND blob_deleted_at IS NULL
            ORDER BY confirmed_at ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        into_jobs(rows)
    }
}

#[async_trait]
impl TransactionalPrintJobRepository for SqlitePrintJobRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn PrintJobTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqlitePrintJobTransaction::new(tx)))
    }
}
