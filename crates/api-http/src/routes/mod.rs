//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Service banner
//! GET  /health                    - Health check
//!
//! # Accounts
//! POST /register                  - Create a customer or shopkeeper account
//! POST /login                     - Exchange credentials for a bearer token
//! PUT  /location                  - Update the caller's coordinates (any role)
//!
//! # Files (customer)
//! POST /upload                    - Multipart document upload
//! GET  /my-files                  - Caller's uploads, newest first
//! GET  /shops                     - Shops ranked by distance from the caller
//!
//! # Files (public)
//! GET  /file/{code}/status        - Job status by redemption code
//!
//! # Redemption (shopkeeper)
//! GET  /file/{code}               - Redeem a private job and download it
//! POST /file/{code}/confirm       - Confirm a private job as printed
//! GET  /queue                     - Shop's pending queue, front first
//! GET  /queue/{id}/download       - Download a queued job without changing it
//! POST /queue/{id}/confirm        - Confirm a queued job and renumber the queue
//! GET  /shop-history              - Jobs confirmed by the shop, newest first
//! ```

pub mod auth;
pub mod files;
pub mod queue;
pub mod shops;
pub mod system;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Multipart framing overhead allowed on top of the document limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Banner and health check.
pub fn system_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(system::banner))
        .route("/health", get(system::health))
}

/// Registration, login and location update.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/location", put(auth::update_location))
}

/// Upload, redemption by code and the customer's views.
pub fn file_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(files::upload).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        )
        .route("/file/{code}", get(files::redeem))
        .route("/file/{code}/status", get(files::status))
        .route("/file/{code}/confirm", post(files::confirm))
        .route("/my-files", get(files::my_files))
        .route("/shops", get(shops::nearest))
}

/// The shopkeeper's queue and history.
pub fn queue_routes() -> Router<AppState> {
    Router::new()
        .route("/queue", get(queue::list))
        .route("/queue/{id}/download", get(queue::download))
        .route("/queue/{id}/confirm", post(queue::confirm))
        .route("/shop-history", get(queue::history))
}
