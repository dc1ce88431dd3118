// Reports - customer file listing and shop history

use crate::application::access::require_role;
use crate::domain::{Identity, OwnedJob, PrintJob, Role};
use crate::error::Result;
use crate::port::PrintJobRepository;
use std::sync::Arc;

pub struct ReportService {
    jobs: Arc<dyn PrintJobRepository>,
}

impl ReportService {
    pub fn new(jobs: Arc<dyn PrintJobRepository>) -> Self {
        Self { jobs }
    }

    /// Caller's uploads, newest first
    pub async fn my_files(&self, identity: &Identity) -> Result<Vec<OwnedJob>> {
        require_role(identity, Role::Customer)?;
        self.jobs.list_by_owner(identity.user_id).await
    }

    /// Jobs the calling shop has confirmed, newest first
    pub async fn shop_history(&self, identity: &Identity) -> Result<Vec<PrintJob>> {
        require_role(identity, Role::Shopkeeper)?;
        self.jobs.list_confirmed_by_shop(identity.user_id).await
    }
}
