//! Shared fixtures: a migrated SQLite file per test plus wired services.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use qprint_core::application::{
    AccountService, BlobReaper, PrintLifecycle, QueueManager, RegisterRequest, ReportService,
    ShopDirectory, UploadRequest, UploadService,
};
use qprint_core::domain::{Identity, PrintJob, Role};
use qprint_core::port::mocks::{
    FixedPageCounter, FixedTimeProvider, InMemoryBlobStore, PlainPasswordHasher,
};
use qprint_core::port::{CodeGenerator, PageCounter, RandomCodeGenerator};
use qprint_infra_sqlite::{
    create_pool, run_migrations, SqlitePool, SqlitePrintJobRepository, SqliteSessionStore,
    SqliteUserRepository,
};
use tempfile::TempDir;

pub const START_MILLIS: i64 = 1_700_000_000_000;
pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;
pub const SAMPLE_BYTES: &[u8] = b"%PDF-1.4 sample document";

pub struct Harness {
    _dir: TempDir,
    pub pool: SqlitePool,
    pub jobs: Arc<SqlitePrintJobRepository>,
    pub users: Arc<SqliteUserRepository>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub clock: Arc<FixedTimeProvider>,
    pub queue: Arc<QueueManager>,
    pub lifecycle: Arc<PrintLifecycle>,
    pub accounts: Arc<AccountService>,
    pub uploads: Arc<UploadService>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_collaborators(Arc::new(FixedPageCounter(3)), Arc::new(RandomCodeGenerator))
            .await
    }

    pub async fn with_collaborators(
        page_counter: Arc<dyn PageCounter>,
        codes: Arc<dyn CodeGenerator>,
    ) -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("qprint.db");
        let pool = create_pool(db_path.to_str().unwrap(), 8).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let jobs = Arc::new(SqlitePrintJobRepository::new(pool.clone()));
        let users = Arc::new(SqliteUserRepository::new(pool.clone()));
        let blobs = Arc::new(InMemoryBlobStore::new());
        let clock = Arc::new(FixedTimeProvider::new(START_MILLIS));

        let queue = Arc::new(QueueManager::new(jobs.clone(), jobs.clone()));
        let lifecycle = Arc::new(PrintLifecycle::new(
            jobs.clone(),
            jobs.clone(),
            blobs.clone(),
            clock.clone(),
        ));
        let accounts = Arc::new(AccountService::new(
            users.clone(),
            Arc::new(PlainPasswordHasher),
            Arc::new(SqliteSessionStore::new(pool.clone())),
            clock.clone(),
            Duration::from_secs(3600),
        ));
        let uploads = Arc::new(UploadService::new(
            queue.clone(),
            jobs.clone(),
            users.clone(),
            blobs.clone(),
            page_counter,
            codes,
            clock.clone(),
            MAX_UPLOAD_BYTES,
        ));

        Self {
            _dir: dir,
            pool,
            jobs,
            users,
            blobs,
            clock,
            queue,
            lifecycle,
            accounts,
            uploads,
        }
    }

    pub fn shops(&self) -> ShopDirectory {
        ShopDirectory::new(self.users.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.jobs.clone())
    }

    pub fn reaper(&self) -> BlobReaper {
        BlobReaper::new(
            self.jobs.clone(),
            self.blobs.clone(),
            self.clock.clone(),
            Duration::from_secs(60),
        )
    }

    async fn register(&self, name: &str, role: Role, at: Option<(f64, f64)>) -> Identity {
        let user_id = self
            .accounts
            .register(RegisterRequest {
                username: name.to_string(),
                password: "secret-pw".to_string(),
                role: role.to_string(),
                lat: at.map(|(lat, _)| lat),
                long: at.map(|(_, long)| long),
                address: None,
            })
            .await
            .unwrap();
        Identity::new(user_id, role)
    }

    pub async fn customer(&self, name: &str) -> Identity {
        self.register(name, Role::Customer, None).await
    }

    pub async fn shop(&self, name: &str, lat: f64, long: f64) -> Identity {
        self.register(name, Role::Shopkeeper, Some((lat, long))).await
    }

    pub async fn upload_private(&self, customer: &Identity) -> PrintJob {
        self.uploads
            .upload(customer, private_request())
            .await
            .unwrap()
    }

    pub async fn upload_queued(&self, customer: &Identity, shop: &Identity) -> PrintJob {
        self.uploads
            .upload(customer, queue_request(shop))
            .await
            .unwrap()
    }

    /// (job id, position) pairs of a shop's pending queue, front first
    pub async fn positions(&self, shop: &Identity) -> Vec<(i64, i64)> {
        self.queue
            .list_queue(shop.user_id)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| (entry.job.id, entry.job.queue_position.unwrap()))
            .collect()
    }
}

pub fn private_request() -> UploadRequest {
    UploadRequest {
        file_name: "thesis.pdf".to_string(),
        data: SAMPLE_BYTES.to_vec(),
        copies: Some("2".to_string()),
        ..Default::default()
    }
}

pub fn queue_request(shop: &Identity) -> UploadRequest {
    UploadRequest {
        file_name: "notes.pdf".to_string(),
        data: SAMPLE_BYTES.to_vec(),
        print_type: Some("queue".to_string()),
        shop_id: Some(shop.user_id.to_string()),
        ..Default::default()
    }
}

/// Positions must be exactly 1..=n in list order
pub fn assert_dense(positions: &[(i64, i64)]) {
    let actual: Vec<i64> = positions.iter().map(|(_, p)| *p).collect();
    let expected: Vec<i64> = (1..=positions.len() as i64).collect();
    assert_eq!(actual, expected, "queue positions must be dense");
}
