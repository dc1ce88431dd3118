// Print Job Domain Model

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::{DomainError, Result};
use super::geo::Coordinate;
use super::user::UserId;

/// Print job ID (store-assigned)
pub type PrintJobId = i64;

/// How a job reaches a shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintType {
    /// Redeemed by code at any shop
    Private,
    /// Bound to one shop's queue from creation
    Queue,
}

impl PrintType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrintType::Private => "private",
            PrintType::Queue => "queue",
        }
    }
}

impl std::fmt::Display for PrintType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrintType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "private" => Ok(PrintType::Private),
            "queue" => Ok(PrintType::Queue),
            other => Err(DomainError::ValidationError(format!(
                "print_type must be 'private' or 'queue', got '{}'",
                other
            ))),
        }
    }
}

/// Job status. `Downloaded` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Uploaded,
    Downloaded,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Uploaded => "uploaded",
            JobStatus::Downloaded => "downloaded",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uploaded" => Ok(JobStatus::Uploaded),
            "downloaded" => Ok(JobStatus::Downloaded),
            other => Err(DomainError::ValidationError(format!(
                "unknown job status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrintMode {
    #[default]
    Single,
    Double,
}

impl PrintMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrintMode::Single => "single",
            PrintMode::Double => "double",
        }
    }
}

impl std::fmt::Display for PrintMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrintMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single" => Ok(PrintMode::Single),
            "double" => Ok(PrintMode::Double),
            other => Err(DomainError::ValidationError(format!(
                "print_mode must be 'single' or 'double', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Bw,
    Color,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Bw => "bw",
            ColorMode::Color => "color",
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bw" => Ok(ColorMode::Bw),
            "color" => Ok(ColorMode::Color),
            other => Err(DomainError::ValidationError(format!(
                "color_mode must be 'bw' or 'color', got '{}'",
                other
            ))),
        }
    }
}

/// Paper size token such as "A4" or "Letter"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperSize(String);

impl PaperSize {
    pub const MAX_LEN: usize = 16;

    /// Validate a paper size token (1-16 ASCII alphanumerics)
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.is_empty() || s.len() > Self::MAX_LEN {
            return Err(DomainError::ValidationError(format!(
                "paper_size must be 1-{} characters",
                Self::MAX_LEN
            )));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::ValidationError(
                "paper_size must be alphanumeric".to_string(),
            ));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PaperSize {
    fn default() -> Self {
        Self("A4".to_string())
    }
}

/// Short shareable code granting access to a private job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedemptionCode(String);

impl RedemptionCode {
    pub const LENGTH: usize = 6;

    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_well_formed(&self) -> bool {
        self.0.len() == Self::LENGTH && self.0.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

impl std::fmt::Display for RedemptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Print job entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: PrintJobId,
    pub user_id: UserId,
    pub blob_path: String,
    pub original_name: String,
    pub code: RedemptionCode,

    pub print_type: PrintType,
    pub status: JobStatus,

    pub copies: u32,
    pub print_mode: PrintMode,
    pub color_mode: ColorMode,
    pub paper_size: PaperSize,
    pub page_count: u32,
    pub total_cost: f64,

    pub shop_id: Option<UserId>,
    pub queue_position: Option<i64>,

    pub created_at: i64, // epoch ms
    pub downloaded_at: Option<i64>,
    pub confirmed_at: Option<i64>,
    pub blob_deleted_at: Option<i64>,
}

impl PrintJob {
    pub fn is_pending(&self) -> bool {
        self.status == JobStatus::Uploaded
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }

    fn require_type(&self, expected: PrintType, to: &str) -> Result<()> {
        if self.print_type != expected {
            return Err(DomainError::InvalidStateTransition {
                from: format!("{} {}", self.print_type, self.status),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    /// Code redemption of a private job. Serves the bytes; the blob is kept until confirm.
    pub fn redeem(&mut self, now_millis: i64) -> Result<()> {
        self.require_type(PrintType::Private, "redeemed")?;
        if self.status != JobStatus::Uploaded {
            return Err(DomainError::AlreadyRedeemed(self.code.to_string()));
        }
        self.status = JobStatus::Downloaded;
        self.downloaded_at = Some(now_millis);
        Ok(())
    }

    /// Shopkeeper confirmation of a private job. Allowed until the job is confirmed once.
    pub fn confirm_private(&mut self, shop_id: UserId, now_millis: i64) -> Result<()> {
        self.require_type(PrintType::Private, "confirmed")?;
        if self.is_confirmed() {
            return Err(DomainError::AlreadyRedeemed(self.code.to_string()));
        }
        self.status = JobStatus::Downloaded;
        self.shop_id = Some(shop_id);
        self.downloaded_at.get_or_insert(now_millis);
        self.confirmed_at = Some(now_millis);
        Ok(())
    }

    /// Checks that `shop_id` may act on this queued job while it is still pending.
    pub fn ensure_queued_for(&self, shop_id: UserId) -> Result<()> {
        self.require_type(PrintType::Queue, "confirmed")?;
        if self.shop_id != Some(shop_id) {
            return Err(DomainError::ShopMismatch {
                job_id: self.id,
                shop_id,
            });
        }
        if self.status != JobStatus::Uploaded {
            return Err(DomainError::AlreadyRedeemed(self.code.to_string()));
        }
        Ok(())
    }

    /// Shopkeeper confirmation of a queued job. Clears the queue position.
    pub fn confirm_queued(&mut self, shop_id: UserId, now_millis: i64) -> Result<()> {
        self.ensure_queued_for(shop_id)?;
        self.status = JobStatus::Downloaded;
        self.queue_position = None;
        self.downloaded_at = Some(now_millis);
        self.confirmed_at = Some(now_millis);
        Ok(())
    }
}

/// Insert payload for a new job. The store assigns `id` and, for queue jobs, `queue_position`.
#[derive(Debug, Clone)]
pub struct NewPrintJob {
    pub user_id: UserId,
    pub blob_path: String,
    pub original_name: String,
    pub code: RedemptionCode,
    pub print_type: PrintType,
    pub copies: u32,
    pub print_mode: PrintMode,
    pub color_mode: ColorMode,
    pub paper_size: PaperSize,
    pub page_count: u32,
    pub total_cost: f64,
    pub shop_id: Option<UserId>,
    pub created_at: i64,
}

/// A pending queue job joined with its owner's name
#[derive(Debug, Clone, Serialize)]
pub struct QueueEntry {
    pub job: PrintJob,
    pub customer_name: String,
}

/// Shop summary attached to a customer's job listing
#[derive(Debug, Clone, Serialize)]
pub struct ShopRef {
    pub id: UserId,
    pub name: String,
    pub location: Option<Coordinate>,
}

/// A customer's job joined with its shop, if any
#[derive(Debug, Clone, Serialize)]
pub struct OwnedJob {
    pub job: PrintJob,
    pub shop: Option<ShopRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(print_type: PrintType, shop_id: Option<UserId>) -> PrintJob {
        PrintJob {
            id: 7,
            user_id: 1,
            blob_path: "uploads/1-doc.pdf".to_string(),
            original_name: "doc.pdf".to_string(),
            code: RedemptionCode::new("AbC123"),
            print_type,
            status: JobStatus::Uploaded,
            copies: 1,
            print_mode: PrintMode::Single,
            color_mode: ColorMode::Bw,
            paper_size: PaperSize::default(),
            page_count: 3,
            total_cost: 3.0,
            shop_id,
            queue_position: shop_id.map(|_| 1),
            created_at: 1000,
            downloaded_at: None,
            confirmed_at: None,
            blob_deleted_at: None,
        }
    }

    #[test]
    fn test_redeem_twice_is_already_redeemed() {
        let mut j = job(PrintType::Private, None);
        j.redeem(2000).unwrap();
        assert_eq!(j.status, JobStatus::Downloaded);
        assert_eq!(j.downloaded_at, Some(2000));

        let err = j.redeem(3000).unwrap_err();
        assert_eq!(err, DomainError::AlreadyRedeemed("AbC123".to_string()));
    }

    #[test]
    fn test_redeem_rejects_queue_job() {
        let mut j = job(PrintType::Queue, Some(9));
        assert!(matches!(
            j.redeem(2000),
            Err(DomainError::InvalidStateTransition { .. })
        ));
        assert_eq!(j.status, JobStatus::Uploaded);
    }

    #[test]
    fn test_confirm_private_after_redeem() {
        let mut j = job(PrintType::Private, None);
        j.redeem(2000).unwrap();
        j.confirm_private(9, 3000).unwrap();

        assert_eq!(j.shop_id, Some(9));
        assert_eq!(j.downloaded_at, Some(2000));
        assert_eq!(j.confirmed_at, Some(3000));
        assert!(matches!(
            j.confirm_private(9, 4000),
            Err(DomainError::AlreadyRedeemed(_))
        ));
    }

    #[test]
    fn test_confirm_queued_wrong_shop() {
        let mut j = job(PrintType::Queue, Some(9));
        let err = j.confirm_queued(10, 2000).unwrap_err();
        assert_eq!(
            err,
            DomainError::ShopMismatch {
                job_id: 7,
                shop_id: 10
            }
        );
        assert_eq!(j.queue_position, Some(1));
        assert!(j.is_pending());
    }

    #[test]
    fn test_confirm_queued_clears_position() {
        let mut j = job(PrintType::Queue, Some(9));
        j.confirm_queued(9, 2000).unwrap();
        assert_eq!(j.queue_position, None);
        assert_eq!(j.status, JobStatus::Downloaded);
        assert!(j.confirm_queued(9, 3000).is_err());
    }

    #[test]
    fn test_paper_size_validation() {
        assert_eq!(PaperSize::parse("Letter").unwrap().as_str(), "Letter");
        assert!(PaperSize::parse("").is_err());
        assert!(PaperSize::parse("A4; DROP").is_err());
        assert!(PaperSize::parse("A".repeat(17)).is_err());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("queue".parse::<PrintType>().unwrap(), PrintType::Queue);
        assert_eq!("double".parse::<PrintMode>().unwrap(), PrintMode::Double);
        assert_eq!("color".parse::<ColorMode>().unwrap(), ColorMode::Color);
        assert!("QUEUE".parse::<PrintType>().is_err());
        assert!("grey".parse::<ColorMode>().is_err());
    }
}
