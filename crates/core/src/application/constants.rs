// Application constants (No magic values)
use std::time::Duration;

/// Attempts at drawing a redemption code that is not taken yet
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Page count used when the document cannot be counted
pub const FALLBACK_PAGE_COUNT: u32 = 1;

pub const MIN_COPIES: u32 = 1;
pub const MAX_COPIES: u32 = 999;

/// Stored file names are truncated to this many characters
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Name used when the client sends no file name
pub const DEFAULT_FILE_NAME: &str = "document.pdf";

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 64;
pub const PASSWORD_MIN_LEN: usize = 6;

/// Session lifetime when none is configured (24h)
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 3600);

/// How often the blob reaper wakes up (5 minutes)
pub const DEFAULT_REAPER_INTERVAL: Duration = Duration::from_secs(300);

/// Jobs examined per reaper sweep
pub const REAPER_BATCH_SIZE: i64 = 100;
