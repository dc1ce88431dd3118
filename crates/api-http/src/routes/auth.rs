//! Account handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use qprint_core::application::RegisterRequest;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::state::AppState;
use crate::types::{LocationRequest, LocationResponse, LoginRequest, LoginResponse, RegisterResponse};

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(req) = payload?;
    let user_id = state.accounts().register(req).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let outcome = state.accounts().login(&req.username, &req.password).await?;
    Ok(Json(LoginResponse {
        token: outcome.token,
        role: outcome.identity.role.to_string(),
        username: outcome.username,
    }))
}

/// PUT /location
pub async fn update_location(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    payload: Result<Json<LocationRequest>, JsonRejection>,
) -> Result<Json<LocationResponse>, ApiError> {
    let Json(req) = payload?;
    let location = state
        .accounts()
        .update_location(&identity, req.lat, req.long, req.address.as_deref())
        .await?;
    Ok(Json(LocationResponse {
        lat: location.lat,
        long: location.long,
    }))
}
