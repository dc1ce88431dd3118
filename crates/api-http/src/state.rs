//! Application state shared across handlers.

use std::sync::Arc;

use qprint_core::application::{
    AccountService, PrintLifecycle, QueueManager, ReportService, ShopDirectory, UploadService,
};

/// Application services, wired by the composition root
pub struct Services {
    pub accounts: Arc<AccountService>,
    pub uploads: Arc<UploadService>,
    pub lifecycle: Arc<PrintLifecycle>,
    pub queue: Arc<QueueManager>,
    pub shops: Arc<ShopDirectory>,
    pub reports: Arc<ReportService>,
}

/// Cheaply cloneable handle to the services and HTTP limits.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    services: Services,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(services: Services, max_upload_bytes: usize) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                services,
                max_upload_bytes,
            }),
        }
    }

    #[must_use]
    pub fn accounts(&self) -> &AccountService {
        &self.inner.services.accounts
    }

    #[must_use]
    pub fn uploads(&self) -> &UploadService {
        &self.inner.services.uploads
    }

    #[must_use]
    pub fn lifecycle(&self) -> &PrintLifecycle {
        &self.inner.services.lifecycle
    }

    #[must_use]
    pub fn queue(&self) -> &QueueManager {
        &self.inner.services.queue
    }

    #[must_use]
    pub fn shops(&self) -> &ShopDirectory {
        &self.inner.services.shops
    }

    #[must_use]
    pub fn reports(&self) -> &ReportService {
        &self.inner.services.reports
    }

    /// Largest accepted document, in bytes
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.inner.max_upload_bytes
    }
}
