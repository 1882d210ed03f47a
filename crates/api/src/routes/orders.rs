//! Order handlers: checkout, history, public tracking, admin status.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use hearthside_core::{OrderId, OrderStatus};

use crate::db::{OrderRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::{AdminUser, AuthUser};
use crate::models::{Order, OrderListItem, OrderTracking, OrderWithItems, Pagination};
use crate::routes::{ApiResponse, ok};
use crate::services::CheckoutService;
use crate::services::checkout::{PlaceOrder, PlacedOrder};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 50;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    pub orders: Vec<OrderListItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// `POST /api/orders`
pub async fn create(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<PlaceOrder>,
) -> Result<(StatusCode, Json<ApiResponse<PlacedOrder>>)> {
    let user = UserRepository::new(state.pool())
        .get_by_id(claims.user_id())
        .await
        .map_err(|e| AppError::from_repo(e, "User"))?;

    let service = CheckoutService::new(state.pool(), state.gateway(), state.mailer());
    let placed = service.checkout(&user, payload).await?;

    Ok(super::created(placed))
}

/// `GET /api/orders`
pub async fn index(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<OrderListResponse>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let (orders, total) = OrderRepository::new(state.pool())
        .list(claims.user_id(), limit, (page - 1) * limit)
        .await?;

    Ok(ok(OrderListResponse {
        orders,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// `GET /api/orders/{id}`
pub async fn show(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<ApiResponse<OrderWithItems>>> {
    let order = OrderRepository::new(state.pool())
        .get(claims.user_id(), order_id)
        .await
        .map_err(|e| AppError::from_repo(e, "Order"))?;
    Ok(ok(order))
}

/// `GET /api/orders/track/{order_number}`
///
/// Public: tracking by order number exposes no customer data.
pub async fn track(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<ApiResponse<OrderTracking>>> {
    let tracking = OrderRepository::new(state.pool())
        .track(order_number.trim())
        .await
        .map_err(|e| AppError::from_repo(e, "Order"))?;
    Ok(ok(tracking))
}

/// `PATCH /api/orders/{id}/status` (admin)
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(order_id): Path<OrderId>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<ApiResponse<Order>>> {
    let repo = OrderRepository::new(state.pool());

    let current = repo
        .status(order_id)
        .await
        .map_err(|e| AppError::from_repo(e, "Order"))?;
    if current.is_terminal() {
        return Err(AppError::Validation(format!(
            "order is already {current}"
        )));
    }

    let order = repo
        .update_status(order_id, payload.status, payload.tracking_number.as_deref())
        .await
        .map_err(|e| AppError::from_repo(e, "Order"))?;

    tracing::info!(
        order_number = %order.order_number,
        status = %order.status,
        admin = %claims.email,
        "order status updated"
    );
    Ok(ok(order))
}
