// Page Counter Port

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Page count failed: {0}")]
pub struct PageCountError(pub String);

#[async_trait]
pub trait PageCounter: Send + Sync {
    async fn count_pages(&self, data: &[u8]) -> Result<u32, PageCountError>;
}

pub mod mocks {
    use super::*;

    /// Always reports the same page count
    pub struct FixedPageCounter(pub u32);

    #[async_trait]
    impl PageCounter for FixedPageCounter {
        async fn count_pages(&self, _data: &[u8]) -> Result<u32, PageCountError> {
            Ok(self.0)
        }
    }

    /// Always fails, for exercising the fallback
    pub struct FailingPageCounter;

    #[async_trait]
    impl PageCounter for FailingPageCounter {
        async fn count_pages(&self, _data: &[u8]) -> Result<u32, PageCountError> {
            Err(PageCountError("not a document".to_string()))
        }
    }
}
