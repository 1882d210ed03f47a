//! Wishlist handlers. All routes require a bearer token.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use hearthside_core::ProductId;

use crate::db::WishlistRepository;
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::{CartView, WishlistEntry};
use crate::routes::{ApiResponse, ok};
use crate::services::CartService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPayload {
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct MoveToCartPayload {
    #[serde(default = "default_move_quantity")]
    pub quantity: i32,
}

const fn default_move_quantity() -> i32 {
    1
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub in_wishlist: bool,
}

/// `GET /api/wishlist`
pub async fn index(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<WishlistEntry>>>> {
    let entries = CartService::new(state.pool())
        .wishlist(claims.user_id())
        .await?;
    Ok(ok(entries))
}

/// `POST /api/wishlist/items`
pub async fn add(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<AddPayload>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<WishlistEntry>>>)> {
    let service = CartService::new(state.pool());
    service
        .add_to_wishlist(claims.user_id(), payload.product_id)
        .await?;
    let entries = service.wishlist(claims.user_id()).await?;
    Ok(super::created(entries))
}

/// `DELETE /api/wishlist/items/{product_id}`
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ApiResponse<Vec<WishlistEntry>>>> {
    let service = CartService::new(state.pool());
    service
        .remove_from_wishlist(claims.user_id(), product_id)
        .await?;
    let entries = service.wishlist(claims.user_id()).await?;
    Ok(ok(entries))
}

/// `DELETE /api/wishlist`
pub async fn clear(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<WishlistEntry>>>> {
    let service = CartService::new(state.pool());
    service.clear_wishlist(claims.user_id()).await?;
    Ok(ok(Vec::new()))
}

/// `GET /api/wishlist/check/{product_id}`
pub async fn check(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ApiResponse<CheckResponse>>> {
    let found = WishlistRepository::new(state.pool())
        .contains(claims.user_id(), product_id)
        .await?;
    Ok(ok(CheckResponse {
        in_wishlist: found.is_some(),
    }))
}

/// `POST /api/wishlist/items/{product_id}/move-to-cart`
///
/// The body is optional; quantity defaults to one.
pub async fn move_to_cart(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(product_id): Path<ProductId>,
    payload: Option<Json<MoveToCartPayload>>,
) -> Result<Json<ApiResponse<CartView>>> {
    let quantity = payload.map_or_else(default_move_quantity, |Json(p)| p.quantity);
    let view = CartService::new(state.pool())
        .move_to_cart(claims.user_id(), product_id, quantity)
        .await?;
    Ok(ok(view))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_move_payload_quantity_defaults_to_one() {
        let payload: MoveToCartPayload = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(payload.quantity, 1);

        let payload: MoveToCartPayload =
            serde_json::from_value(serde_json::json!({"quantity": 3})).unwrap();
        assert_eq!(payload.quantity, 3);
    }
}
