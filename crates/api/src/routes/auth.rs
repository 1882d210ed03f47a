//! Registration, login, and token refresh.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::User;
use crate::routes::{ApiResponse, ok};
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// User plus bearer token, returned by register, login, and refresh.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<ApiResponse<SessionResponse>>)> {
    let service = AuthService::new(
        state.pool(),
        state.jwt_secret(),
        state.config().token_ttl_days,
    );
    let authed = service
        .register(
            &payload.email,
            &payload.password,
            payload.first_name.trim(),
            payload.last_name.trim(),
            payload.phone.as_deref(),
        )
        .await?;

    if let Some(mailer) = state.mailer()
        && let Err(err) = mailer
            .send_welcome(authed.user.email.as_str(), &authed.user.first_name)
            .await
    {
        tracing::warn!(user_id = %authed.user.id, error = %err, "welcome mail failed");
    }

    tracing::info!(user_id = %authed.user.id, "user registered");
    Ok(super::created(SessionResponse {
        user: authed.user,
        token: authed.token,
    }))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<ApiResponse<SessionResponse>>> {
    let service = AuthService::new(
        state.pool(),
        state.jwt_secret(),
        state.config().token_ttl_days,
    );
    let authed = service.login(&payload.email, &payload.password).await?;

    Ok(ok(SessionResponse {
        user: authed.user,
        token: authed.token,
    }))
}

/// `GET /api/auth/profile`
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<User>>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(claims.user_id())
        .await
        .map_err(|e| crate::error::AppError::from_repo(e, "User"))?;
    Ok(ok(user))
}

/// `POST /api/auth/refresh`
///
/// Re-issues a token from current user data, so an admin flag change takes
/// effect without a fresh login.
pub async fn refresh(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<SessionResponse>>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(claims.user_id())
        .await
        .map_err(|e| crate::error::AppError::from_repo(e, "User"))?;

    let service = AuthService::new(
        state.pool(),
        state.jwt_secret(),
        state.config().token_ttl_days,
    );
    let token = service.mint_token(&user)?;

    Ok(ok(SessionResponse { user, token }))
}
