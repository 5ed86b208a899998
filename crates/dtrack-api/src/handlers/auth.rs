//! Authentication API handlers

use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::{
    auth::IssuedTokens,
    error::ApiResult,
    middleware::CurrentUser,
    models::{
        AuthResponse, ChangePasswordRequest, LoginRequest, LogoutRequest, RefreshRequest,
        RegisterRequest, UserInfo,
    },
    state::AppState,
};

fn auth_response(issued: IssuedTokens) -> AuthResponse {
    AuthResponse {
        access_token: issued.access_token,
        refresh_token: issued.refresh_token,
        expires_at: issued.expires_at,
        user: UserInfo::from(&issued.user),
    }
}

/// Authenticate with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authentication successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let issued = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(auth_response(issued)))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserInfo),
        (status = 400, description = "Invalid registration payload"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let user = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(UserInfo::from(&user))))
}

/// Exchange a refresh token for a fresh token pair
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens rotated", body = AuthResponse),
        (status = 401, description = "Unknown or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let issued = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(auth_response(issued)))
}

/// Revoke refresh tokens
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 204, description = "Logout successful"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<LogoutRequest>,
) -> ApiResult<StatusCode> {
    state
        .auth
        .logout(&user, request.refresh_token.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change the current user's password
#[utoipa::path(
    post,
    path = "/api/v1/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Current password does not match")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    state
        .auth
        .change_password(&user, &request.current_password, &request.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
