//! Cart handlers. All routes require a bearer token.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use hearthside_core::{CartItemId, ProductId};

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::{CartView, LineVerdict, ValidatedLine};
use crate::routes::{ApiResponse, ok};
use crate::services::CartService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemPayload {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemPayload {
    pub quantity: i32,
}

/// Stock re-check result for the whole cart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub valid: bool,
    pub items: Vec<ValidatedLine>,
}

/// `GET /api/cart`
pub async fn show(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<CartView>>> {
    let view = CartService::new(state.pool()).view(claims.user_id()).await?;
    Ok(ok(view))
}

/// `POST /api/cart/items`
pub async fn add_item(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<AddItemPayload>,
) -> Result<Json<ApiResponse<CartView>>> {
    let view = CartService::new(state.pool())
        .add(claims.user_id(), payload.product_id, payload.quantity)
        .await?;
    Ok(ok(view))
}

/// `PUT /api/cart/items/{id}`
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(line_id): Path<CartItemId>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<Json<ApiResponse<CartView>>> {
    let view = CartService::new(state.pool())
        .update_quantity(claims.user_id(), line_id, payload.quantity)
        .await?;
    Ok(ok(view))
}

/// `DELETE /api/cart/items/{id}`
pub async fn remove_item(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(line_id): Path<CartItemId>,
) -> Result<Json<ApiResponse<CartView>>> {
    let view = CartService::new(state.pool())
        .remove(claims.user_id(), line_id)
        .await?;
    Ok(ok(view))
}

/// `DELETE /api/cart`
pub async fn clear(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<CartView>>> {
    let service = CartService::new(state.pool());
    service.clear(claims.user_id()).await?;
    let view = service.view(claims.user_id()).await?;
    Ok(ok(view))
}

/// `POST /api/cart/items/{id}/move-to-wishlist`
pub async fn move_to_wishlist(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(line_id): Path<CartItemId>,
) -> Result<Json<ApiResponse<CartView>>> {
    let service = CartService::new(state.pool());
    service.move_to_wishlist(claims.user_id(), line_id).await?;
    let view = service.view(claims.user_id()).await?;
    Ok(ok(view))
}

/// `POST /api/cart/validate`
pub async fn validate(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<ValidationResponse>>> {
    let items = CartService::new(state.pool())
        .validate(claims.user_id())
        .await?;
    let valid = items.iter().all(|line| line.status == LineVerdict::Ok);
    Ok(ok(ValidationResponse { valid, items }))
}
