use axum::{Json, extract::State};

use flockr_core::Flockr;
use flockr_types::api::{
    AuthResponse, Empty, LoginRequest, LogoutResponse, PasswordResetComplete,
    PasswordResetRequest, RegisterRequest, TokenRequest,
};

use crate::error::ApiResult;

// Register, login and reset hash passwords with Argon2, so they run off the
// async workers.

pub async fn register(
    State(flockr): State<Flockr>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let auth = tokio::task::spawn_blocking(move || {
        flockr.register(&req.email, &req.password, &req.name_first, &req.name_last)
    })
    .await??;

    Ok(Json(auth))
}

pub async fn login(
    State(flockr): State<Flockr>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let auth = tokio::task::spawn_blocking(move || flockr.login(&req.email, &req.password)).await??;
    Ok(Json(auth))
}

pub async fn logout(
    State(flockr): State<Flockr>,
    Json(req): Json<TokenRequest>,
) -> Json<LogoutResponse> {
    Json(LogoutResponse {
        is_success: flockr.logout(&req.token),
    })
}

/// Always succeeds so the endpoint cannot be used to probe for accounts.
pub async fn password_reset_request(
    State(flockr): State<Flockr>,
    Json(req): Json<PasswordResetRequest>,
) -> Json<Empty> {
    flockr.password_reset_request(&req.email);
    Json(Empty::default())
}

pub async fn password_reset_complete(
    State(flockr): State<Flockr>,
    Json(req): Json<PasswordResetComplete>,
) -> ApiResult<Json<Empty>> {
    tokio::task::spawn_blocking(move || {
        flockr.password_reset_complete(&req.reset_code, &req.new_password)
    })
    .await??;

    Ok(Json(Empty::default()))
}
