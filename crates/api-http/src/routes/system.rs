//! Banner and health check.

use axum::Json;

use crate::types::{BannerResponse, HealthResponse};

pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Welcome to QPrint API - Print Without Standing in Queue",
        version: qprint_core::VERSION,
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
