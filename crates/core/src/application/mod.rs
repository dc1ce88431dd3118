// Application Layer - Use Cases and Business Logic

pub mod access;
pub mod accounts;
pub mod constants;
pub mod lifecycle;
pub mod maintenance;
pub mod queue;
pub mod reports;
pub mod shops;
pub mod shutdown;
pub mod upload;

// Re-exports
pub use accounts::{AccountService, LoginOutcome, RegisterRequest};
pub use lifecycle::PrintLifecycle;
pub use maintenance::{BlobReaper, ReapStats};
pub use queue::QueueManager;
pub use reports::ReportService;
pub use shops::ShopDirectory;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use upload::{UploadRequest, UploadService};
