//! HTTP API Layer
//!
//! axum routes over the QPrint application services. Handlers stay thin:
//! they extract identity and input, call one service, and shape the response.

pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod state;
pub mod types;

pub use error::ApiError;
pub use extract::AuthUser;
pub use server::{build_router, HttpServer, HttpServerConfig};
pub use state::{AppState, Services};
