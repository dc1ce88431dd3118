// QPrint Infrastructure - System Adapters
// Implements: BlobStore (filesystem), PageCounter (PDF), PasswordHasher (argon2)

pub mod blob_store;
pub mod page_counter;
pub mod password;

pub use blob_store::LocalBlobStore;
pub use page_counter::PdfPageCounter;
pub use password::Argon2PasswordHasher;
