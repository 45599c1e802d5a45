// HTTP handlers for authentication endpoints

use axum::{extract::State, http::HeaderMap, Json};
use validator::Validate;

use crate::auth::{
    middleware::{bearer_token, AuthenticatedUser},
    models::{LoginRequest, LoginResponse},
};
use crate::error::ApiError;
use crate::users::models::MessageResponse;
use crate::AppState;

/// Login a user
/// POST /user/login
#[utoipa::path(
    post,
    path = "/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let token = state.auth.login(&request.username, &request.password).await?;

    Ok(Json(LoginResponse {
        token,
        message: "Welcome, login successful!".to_string(),
    }))
}

/// Logout the current user by revoking their token
/// POST /user/logout
#[utoipa::path(
    post,
    path = "/user/logout",
    responses(
        (status = 200, description = "Token revoked", body = MessageResponse),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    headers: HeaderMap,
) -> Json<MessageResponse> {
    // present whenever the pipeline produced `user`
    if let Some(token) = bearer_token(&headers) {
        state.auth.logout(&user.username, token);
    }

    Json(MessageResponse::new(format!(
        "{}, you have been logged out.",
        user.username
    )))
}
