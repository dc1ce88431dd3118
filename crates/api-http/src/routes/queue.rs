//! Shopkeeper queue handlers.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use qprint_core::application::access::require_role;
use qprint_core::domain::{PrintJobId, Role};

use super::files::attachment;
use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::state::AppState;
use crate::types::{ConfirmResponse, HistoryItem, QueueItem};

/// GET /queue
pub async fn list(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<QueueItem>>, ApiError> {
    require_role(&identity, Role::Shopkeeper)?;
    let entries = state.queue().list_queue(identity.user_id).await?;
    Ok(Json(entries.into_iter().map(QueueItem::from).collect()))
}

/// GET /queue/{id}/download
pub async fn download(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    id: Result<Path<PrintJobId>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let (job, data) = state.lifecycle().download_queued(&identity, id).await?;
    Ok(attachment(&job, data))
}

/// POST /queue/{id}/confirm
pub async fn confirm(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    id: Result<Path<PrintJobId>, PathRejection>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let Path(id) = id?;
    let job = state.lifecycle().confirm_queue(&identity, id).await?;
    Ok(Json(ConfirmResponse::from(&job)))
}

/// GET /shop-history
pub async fn history(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<HistoryItem>>, ApiError> {
    let jobs = state.reports().shop_history(&identity).await?;
    Ok(Json(jobs.into_iter().map(HistoryItem::from).collect()))
}
