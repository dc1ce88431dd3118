// Port Layer - Interfaces for external dependencies

pub mod auth;
pub mod blob_store;
pub mod code_generator; // For deterministic testing
pub mod page_counter;
pub mod print_job_repository;
pub mod time_provider;
pub mod transaction;
pub mod user_repository;

// Re-exports
pub use auth::{PasswordHasher, SessionStore};
pub use blob_store::{BlobError, BlobStore};
pub use code_generator::{CodeGenerator, RandomCodeGenerator};
pub use page_counter::{PageCountError, PageCounter};
pub use print_job_repository::PrintJobRepository;
pub use time_provider::{SystemTimeProvider, TimeProvider};
pub use transaction::{PrintJobTransaction, Transaction, TransactionalPrintJobRepository};
pub use user_repository::{Credentials, UserRepository};

/// Test doubles for every collaborator port, gathered in one place.
pub mod mocks {
    pub use super::auth::mocks::PlainPasswordHasher;
    pub use super::blob_store::mocks::InMemoryBlobStore;
    pub use super::code_generator::mocks::SequenceCodeGenerator;
    pub use super::page_counter::mocks::{FailingPageCounter, FixedPageCounter};
    pub use super::time_provider::mocks::FixedTimeProvider;
}
