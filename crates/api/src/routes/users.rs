//! Account handlers: profile and saved addresses.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use hearthside_core::AddressId;

use crate::db::{AddressRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{Address, AddressInput, User};
use crate::routes::{ApiResponse, ok};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// `GET /api/users/profile`
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<User>>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(claims.user_id())
        .await
        .map_err(|e| AppError::from_repo(e, "User"))?;
    Ok(ok(user))
}

/// `PUT /api/users/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<ApiResponse<User>>> {
    let first_name = payload.first_name.trim();
    let last_name = payload.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(AppError::Validation(
            "firstName and lastName are required".to_owned(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .update_profile(
            claims.user_id(),
            first_name,
            last_name,
            payload.phone.as_deref(),
        )
        .await
        .map_err(|e| AppError::from_repo(e, "User"))?;
    Ok(ok(user))
}

/// `GET /api/users/addresses`
pub async fn addresses(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<Address>>>> {
    let list = AddressRepository::new(state.pool())
        .list(claims.user_id())
        .await?;
    Ok(ok(list))
}

/// `POST /api/users/addresses`
pub async fn create_address(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(input): Json<AddressInput>,
) -> Result<(StatusCode, Json<ApiResponse<Address>>)> {
    input.validate().map_err(AppError::Validation)?;

    let address = AddressRepository::new(state.pool())
        .create(claims.user_id(), &input)
        .await?;
    Ok(super::created(address))
}

/// `PUT /api/users/addresses/{id}`
pub async fn update_address(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(address_id): Path<AddressId>,
    Json(input): Json<AddressInput>,
) -> Result<Json<ApiResponse<Address>>> {
    input.validate().map_err(AppError::Validation)?;

    let address = AddressRepository::new(state.pool())
        .update(claims.user_id(), address_id, &input)
        .await
        .map_err(|e| AppError::from_repo(e, "Address"))?;
    Ok(ok(address))
}

/// `DELETE /api/users/addresses/{id}`
pub async fn delete_address(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(address_id): Path<AddressId>,
) -> Result<Json<ApiResponse<Vec<Address>>>> {
    let repo = AddressRepository::new(state.pool());
    repo.delete(claims.user_id(), address_id)
        .await
        .map_err(|e| AppError::from_repo(e, "Address"))?;

    let list = repo.list(claims.user_id()).await?;
    Ok(ok(list))
}
