//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Readiness (SELECT 1)
//!
//! # Auth
//! POST /api/auth/register              - Register
//! POST /api/auth/login                 - Login
//! GET  /api/auth/profile               - Current profile
//! POST /api/auth/refresh               - Re-issue token
//!
//! # Catalog
//! GET  /api/products                   - Product listing (filters/sort/pagination)
//! GET  /api/products/{slug}            - Product detail
//! POST /api/products                   - Create product (admin)
//! GET  /api/categories                 - Category tree with counts
//! GET  /api/categories/{id_or_slug}    - Category with subcategories
//! GET  /api/categories/{id_or_slug}/breadcrumbs - Ancestor chain
//!
//! # Cart (requires auth)
//! GET    /api/cart                     - Cart with summary
//! POST   /api/cart/items               - Add item
//! PUT    /api/cart/items/{id}          - Update quantity
//! DELETE /api/cart/items/{id}          - Remove line
//! DELETE /api/cart                     - Clear cart
//! POST   /api/cart/items/{id}/move-to-wishlist - Move line to wishlist
//! POST   /api/cart/validate            - Stock re-check
//!
//! # Wishlist (requires auth)
//! GET    /api/wishlist                 - Wishlist
//! POST   /api/wishlist/items           - Add product
//! DELETE /api/wishlist/items/{product_id} - Remove product
//! DELETE /api/wishlist                 - Clear
//! GET    /api/wishlist/check/{product_id} - Contains check
//! POST   /api/wishlist/items/{product_id}/move-to-cart - Move to cart
//!
//! # Orders
//! POST  /api/orders                    - Checkout (requires auth)
//! GET   /api/orders                    - Own order history (requires auth)
//! GET   /api/orders/{id}               - Order detail (requires auth)
//! GET   /api/orders/track/{order_number} - Public tracking
//! PATCH /api/orders/{id}/status        - Status/tracking update (admin)
//!
//! # Account (requires auth)
//! GET    /api/users/profile            - Profile
//! PUT    /api/users/profile            - Update profile
//! GET    /api/users/addresses          - List addresses
//! POST   /api/users/addresses          - Create address
//! PUT    /api/users/addresses/{id}     - Update address
//! DELETE /api/users/addresses/{id}     - Delete address
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;
pub mod wishlist;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};
use serde::Serialize;

use crate::state::AppState;

/// Success envelope; failures use the envelope in [`crate::error`].
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Wrap data in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

/// Wrap data in the success envelope with a 201 status.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(data))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/profile", get(auth::profile))
        .route("/refresh", post(auth::refresh))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/{slug}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{id_or_slug}", get(categories::show))
        .route("/{id_or_slug}/breadcrumbs", get(categories::breadcrumbs))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{id}",
            put(cart::update_item).delete(cart::remove_item),
        )
        .route("/items/{id}/move-to-wishlist", post(cart::move_to_wishlist))
        .route("/validate", post(cart::validate))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::index).delete(wishlist::clear))
        .route("/items", post(wishlist::add))
        .route("/items/{product_id}", delete(wishlist::remove))
        .route("/items/{product_id}/move-to-cart", post(wishlist::move_to_cart))
        .route("/check/{product_id}", get(wishlist::check))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", patch(orders::update_status))
        .route("/track/{order_number}", get(orders::track))
}

/// Create the account routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(users::profile).put(users::update_profile))
        .route(
            "/addresses",
            get(users::addresses).post(users::create_address),
        )
        .route(
            "/addresses/{id}",
            put(users::update_address).delete(users::delete_address),
        )
}

/// Compose the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/orders", order_routes())
        .nest("/users", user_routes())
}
