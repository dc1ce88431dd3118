//! Nearest-shop ranking.

use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::state::AppState;
use crate::types::ShopItem;

/// GET /shops
pub async fn nearest(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<ShopItem>>, ApiError> {
    let ranked = state.shops().nearest_shops(&identity).await?;
    Ok(Json(ranked.into_iter().map(ShopItem::from).collect()))
}
