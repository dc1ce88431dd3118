// QPrint Infrastructure - SQLite Adapter
// Implements: PrintJobRepository, TransactionalPrintJobRepository, UserRepository, SessionStore

mod connection;
mod error;
mod migration;
mod print_job_repository;
mod rows;
mod session_store;
mod transaction;
mod user_repository;

pub use connection::create_pool;
pub use error::map_sqlx_error;
pub use migration::run_migrations;
pub use print_job_repository::SqlitePrintJobRepository;
pub use session_store::SqliteSessionStore;
pub use transaction::SqlitePrintJobTransaction;
pub use user_repository::SqliteUserRepository;

// Re-exported so callers need not depend on sqlx directly
pub use sqlx::SqlitePool;
