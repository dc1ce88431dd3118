// SQLite Transaction Implementation
//
// Every method starts with a write so the transaction holds the write lock
// from its first statement and never upgrades a stale read snapshot.

use crate::error::map_sqlx_error;
use crate::rows::PrintJobRow;
use async_trait::async_trait;
use qprint_core::domain::{NewPrintJob, PrintJob, PrintJobId, PrintType, UserId};
use qprint_core::error::Result;
use qprint_core::port::{PrintJobTransaction, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

const INSERT_PRIVATE: &str = r#"
    INSERT INTO print_jobs (
        user_id, blob_path, original_name, unique_code, print_type, status,
        copies, print_mode, color_mode, paper_size, page_count, total_cost,
        shop_id, queue_position, created_at
    ) VALUES (?, ?, ?, ?, ?, 'uploaded', ?, ?, ?, ?, ?, ?, ?, NULL, ?)
    RETURNING *
"#;

// Read-max and insert happen in one statement, under the write lock
const INSERT_QUEUED: &str = r#"
    INSERT INTO print_jobs (
        user_id, blob_path, original_name, unique_code, print_type, status,
        copies, print_mode, color_mode, paper_size, page_count, total_cost,
        shop_id, queue_position, created_at
    ) VALUES (?, ?, ?, ?, ?, 'uploaded', ?, ?, ?, ?, ?, ?, ?,
        (SELECT COALESCE(MAX(queue_position), 0) + 1
           FROM print_jobs
          WHERE shop_id = ?
            AND status = 'uploaded'
            AND print_type = 'queue'),
        ?)
    RETURNING *
"#;

pub struct SqlitePrintJobTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqlitePrintJobTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqlitePrintJobTransaction<'_> {
    async fn commit(mut self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl PrintJobTransaction for SqlitePrintJobTransaction<'_> {
    async fn insert(&mut self, job: &NewPrintJob) -> Result<PrintJob> {
        let queue_shop = match job.print_type {
            PrintType::Queue => job.shop_id,
            PrintType::Private => None,
        };

        let base = match queue_shop {
            Some(_) => sqlx::query_as::<_, PrintJobRow>(INSERT_QUEUED),
            None => sqlx::query_as::<_, PrintJobRow>(INSERT_PRIVATE),
        };

        let mut query = base
            .bind(job.user_id)
            .bind(&job.blob_path)
            .bind(&job.original_name)
            .bind(job.code.as_str())
            .bind(job.print_type.as_str())
            .bind(i64::from(job.copies))
            .bind(job.print_mode.as_str())
            .bind(job.color_mode.as_str())
            .bind(job.paper_size.as_str())
            .bind(i64::from(job.page_count))
            .bind(job.total_cost)
            .bind(job.shop_id);
        if let Some(shop_id) = queue_shop {
            query = query.bind(shop_id);
        }

        let row = query
            .bind(job.created_at)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        row.into_job()
    }

    async fn complete_queued(
        &mut self,
        id: PrintJobId,
        shop_id: UserId,
        now_millis: i64,
    ) -> Result<Option<i64>> {
        let position: Option<Option<i64>> = sqlx::query_scalar(
            r#"
            UPDATE print_jobs
            SET status = 'downloaded', downloaded_at = ?, confirmed_at = ?
            WHERE id = ? AND shop_id = ? AND print_type = 'queue' AND status = 'uploaded'
            RETURNING queue_position
            "#,
        )
        .bind(now_millis)
        .bind(now_millis)
        .bind(id)
        .bind(shop_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(position) = position.flatten() else {
            return Ok(None);
        };

        sqlx::query("UPDATE print_jobs SET queue_position = NULL WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(Some(position))
    }

    async fn complete_private(
        &mut self,
        id: PrintJobId,
        shop_id: UserId,
        now_millis: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE print_jobs
            SET status = 'downloaded',
                shop_id = ?,
                confirmed_at = ?,
                downloaded_at = COALESCE(downloaded_at, ?)
            WHERE id = ? AND print_type = 'private' AND confirmed_at IS NULL
            "#,
        )
        .bind(shop_id)
        .bind(now_millis)
        .bind(now_millis)
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn close_gap(&mut self, shop_id: UserId, position: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE print_jobs
            SET queue_position = queue_position - 1
            WHERE shop_id = ?
              AND status = 'uploaded'
              AND print_type = 'queue'
              AND queue_position > ?
            "#,
        )
        .bind(shop_id)
        .bind(position)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
