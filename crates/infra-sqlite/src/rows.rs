// SQLite row representations and their conversion into domain types

use qprint_core::domain::{
    ColorMode, Coordinate, JobStatus, OwnedJob, PaperSize, PrintJob, PrintMode, PrintType,
    QueueEntry, RedemptionCode, Role, ShopRef, User,
};
use qprint_core::error::{AppError, Result};
use std::str::FromStr;

fn corrupt(column: &str, value: impl std::fmt::Display) -> AppError {
    AppError::Database(format!("corrupt value in column {}: {}", column, value))
}

fn parse_column<T: FromStr>(column: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| corrupt(column, value))
}

fn u32_column(column: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| corrupt(column, value))
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PrintJobRow {
    id: i64,
    user_id: i64,
    blob_path: String,
    original_name: String,
    unique_code: String,
    print_type: String,
    status: String,
    copies: i64,
    print_mode: String,
    color_mode: String,
    paper_size: String,
    page_count: i64,
    total_cost: f64,
    shop_id: Option<i64>,
    queue_position: Option<i64>,
    created_at: i64,
    downloaded_at: Option<i64>,
    confirmed_at: Option<i64>,
    blob_deleted_at: Option<i64>,
}

impl PrintJobRow {
    pub(crate) fn into_job(self) -> Result<PrintJob> {
        Ok(PrintJob {
            id: self.id,
            user_id: self.user_id,
            blob_path: self.blob_path,
            original_name: self.original_name,
            code: RedemptionCode::new(self.unique_code),
            print_type: parse_column::<PrintType>("print_type", &self.print_type)?,
            status: parse_column::<JobStatus>("status", &self.status)?,
            copies: u32_column("copies", self.copies)?,
            print_mode: parse_column::<PrintMode>("print_mode", &self.print_mode)?,
            color_mode: parse_column::<ColorMode>("color_mode", &self.color_mode)?,
            paper_size: PaperSize::parse(self.paper_size.as_str())
                .map_err(|_| corrupt("paper_size", &self.paper_size))?,
            page_count: u32_column("page_count", self.page_count)?,
            total_cost: self.total_cost,
            shop_id: self.shop_id,
            queue_position: self.queue_position,
            created_at: self.created_at,
            downloaded_at: self.downloaded_at,
            confirmed_at: self.confirmed_at,
            blob_deleted_at: self.blob_deleted_at,
        })
    }
}

/// `print_jobs` row joined with the owner's username
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QueueEntryRow {
    #[sqlx(flatten)]
    job: PrintJobRow,
    customer_name: String,
}

impl QueueEntryRow {
    pub(crate) fn into_entry(self) -> Result<QueueEntry> {
        Ok(QueueEntry {
            job: self.job.into_job()?,
            customer_name: self.customer_name,
        })
    }
}

/// `print_jobs` row left-joined with its shop
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OwnedJobRow {
    #[sqlx(flatten)]
    job: PrintJobRow,
    shop_name: Option<String>,
    shop_lat: Option<f64>,
    shop_long: Option<f64>,
}

impl OwnedJobRow {
    pub(crate) fn into_owned(self) -> Result<OwnedJob> {
        let job = self.job.into_job()?;
        let shop = match (job.shop_id, self.shop_name) {
            (Some(id), Some(name)) => Some(ShopRef {
                id,
                name,
                location: location(self.shop_lat, self.shop_long),
            }),
            _ => None,
        };
        Ok(OwnedJob { job, shop })
    }
}

fn location(lat: Option<f64>, long: Option<f64>) -> Option<Coordinate> {
    match (lat, long) {
        (Some(lat), Some(long)) => Some(Coordinate { lat, long }),
        _ => None,
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    id: i64,
    username: String,
    pub(crate) password_hash: String,
    role: String,
    lat: Option<f64>,
    long: Option<f64>,
    address: Option<String>,
    created_at: i64,
}

impl UserRow {
    pub(crate) fn to_user(&self) -> Result<User> {
        Ok(User {
            id: self.id,
            username: self.username.clone(),
            role: parse_column::<Role>("role", &self.role)?,
            location: location(self.lat, self.long),
            address: self.address.clone(),
            created_at: self.created_at,
        })
    }
}
