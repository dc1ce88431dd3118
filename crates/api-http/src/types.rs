//! HTTP Request/Response Types
//!
//! One record per endpoint. Optional fields are skipped when absent.

use chrono::{DateTime, SecondsFormat};
use qprint_core::domain::{
    OwnedJob, PrintJob, PrintJobId, QueueEntry, RankedShop, ShopRef, UserId,
};
use serde::{Deserialize, Serialize};

/// Epoch milliseconds as RFC 3339 (UTC)
pub fn rfc3339(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// GET / - service banner
#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub message: &'static str,
    pub version: &'static str,
}

/// GET /health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// POST /register
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
}

/// POST /login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
    pub username: String,
}

/// PUT /location
#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub lat: f64,
    pub long: f64,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub lat: f64,
    pub long: f64,
}

/// POST /upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: PrintJobId,
    pub code: String,
    pub print_type: String,
    pub num_pages: u32,
    pub total_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<i64>,
}

impl From<&PrintJob> for UploadResponse {
    fn from(job: &PrintJob) -> Self {
        Self {
            id: job.id,
            code: job.code.to_string(),
            print_type: job.print_type.to_string(),
            num_pages: job.page_count,
            total_cost: job.total_cost,
            queue_position: job.queue_position,
        }
    }
}

/// GET /file/{code}/status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub code: String,
    pub status: String,
    pub print_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<i64>,
}

impl From<&PrintJob> for StatusResponse {
    fn from(job: &PrintJob) -> Self {
        Self {
            code: job.code.to_string(),
            status: job.status.to_string(),
            print_type: job.print_type.to_string(),
            queue_position: job.queue_position,
        }
    }
}

/// POST /file/{code}/confirm and POST /queue/{id}/confirm
#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub id: PrintJobId,
    pub code: String,
    pub status: String,
    pub confirmed_at: Option<String>,
}

impl From<&PrintJob> for ConfirmResponse {
    fn from(job: &PrintJob) -> Self {
        Self {
            id: job.id,
            code: job.code.to_string(),
            status: job.status.to_string(),
            confirmed_at: job.confirmed_at.map(rfc3339),
        }
    }
}

/// GET /queue entry
#[derive(Debug, Serialize)]
pub struct QueueItem {
    pub id: PrintJobId,
    pub queue_position: i64,
    pub customer_name: String,
    pub filename: String,
    pub num_pages: u32,
    pub copies: u32,
    pub print_mode: String,
    pub color_mode: String,
    pub paper_size: String,
    pub total_cost: f64,
    pub created_at: String,
}

impl From<QueueEntry> for QueueItem {
    fn from(entry: QueueEntry) -> Self {
        let job = entry.job;
        Self {
            id: job.id,
            queue_position: job.queue_position.unwrap_or_default(),
            customer_name: entry.customer_name,
            filename: job.original_name,
            num_pages: job.page_count,
            copies: job.copies,
            print_mode: job.print_mode.to_string(),
            color_mode: job.color_mode.to_string(),
            paper_size: job.paper_size.as_str().to_string(),
            total_cost: job.total_cost,
            created_at: rfc3339(job.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShopSummary {
    pub id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<f64>,
}

impl From<ShopRef> for ShopSummary {
    fn from(shop: ShopRef) -> Self {
        Self {
            id: shop.id,
            name: shop.name,
            lat: shop.location.map(|c| c.lat),
            long: shop.location.map(|c| c.long),
        }
    }
}

/// GET /my-files entry
#[derive(Debug, Serialize)]
pub struct MyFileItem {
    pub id: PrintJobId,
    pub code: String,
    pub print_type: String,
    pub status: String,
    pub num_pages: u32,
    pub copies: u32,
    pub print_mode: String,
    pub color_mode: String,
    pub paper_size: String,
    pub total_cost: f64,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop: Option<ShopSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<i64>,
}

impl From<OwnedJob> for MyFileItem {
    fn from(owned: OwnedJob) -> Self {
        let job = owned.job;
        Self {
            id: job.id,
            code: job.code.to_string(),
            print_type: job.print_type.to_string(),
            status: job.status.to_string(),
            num_pages: job.page_count,
            copies: job.copies,
            print_mode: job.print_mode.to_string(),
            color_mode: job.color_mode.to_string(),
            paper_size: job.paper_size.as_str().to_string(),
            total_cost: job.total_cost,
            created_at: rfc3339(job.created_at),
            shop: owned.shop.map(ShopSummary::from),
            queue_position: job.queue_position,
        }
    }
}

/// GET /shop-history entry
#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: PrintJobId,
    pub date: String,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub pages: u32,
    pub copies: u32,
    pub cost: f64,
}

impl From<PrintJob> for HistoryItem {
    fn from(job: PrintJob) -> Self {
        Self {
            id: job.id,
            date: rfc3339(job.confirmed_at.unwrap_or(job.created_at)),
            code: job.code.to_string(),
            kind: job.print_type.to_string(),
            pages: job.page_count,
            copies: job.copies,
            cost: job.total_cost,
        }
    }
}

/// GET /shops entry
#[derive(Debug, Serialize)]
pub struct ShopItem {
    pub id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub lat: f64,
    pub long: f64,
    pub distance_km: f64,
}

impl From<RankedShop> for ShopItem {
    fn from(ranked: RankedShop) -> Self {
        Self {
            id: ranked.shop.id,
            name: ranked.shop.name,
            address: ranked.shop.address,
            lat: ranked.shop.location.lat,
            long: ranked.shop.location.long,
            distance_km: ranked.distance_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339() {
        assert_eq!(rfc3339(0), "1970-01-01T00:00:00Z");
        assert_eq!(rfc3339(1_700_000_000_000), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_optional_fields_skipped() {
        let status = StatusResponse {
            code: "ABC123".into(),
            status: "uploaded".into(),
            print_type: "private".into(),
            queue_position: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("queue_position").is_none());

        let history = HistoryItem {
            id: 1,
            date: rfc3339(0),
            code: "ABC123".into(),
            kind: "queue".into(),
            pages: 2,
            copies: 1,
            cost: 2.0,
        };
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["type"], "queue");
    }
}
