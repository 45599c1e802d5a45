// HTTP handlers for user endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ApiError;
use crate::users::models::{CreateUserRequest, MessageResponse, UpdateUserRequest, UserResponse};
use crate::AppState;

/// Handler for POST /user/save
/// Registers a new user
#[utoipa::path(
    post,
    path = "/user/save",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Username, phone number or email already taken")
    ),
    tag = "users"
)]
pub async fn save_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    tracing::debug!("Registering user: {}", payload.username);
    payload.validate()?;

    let user = state.users.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Handler for GET /user/get/:username
#[utoipa::path(
    get,
    path = "/user/get/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    tracing::debug!("{} fetching user {}", caller.username, username);

    let user = state.users.get(&username).await?;
    Ok(Json(user.into()))
}

/// Handler for PATCH /user/update/:username
/// Applies a partial update; omitted fields keep their values
#[utoipa::path(
    patch,
    path = "/user/update/{username}",
    params(("username" = String, Path, description = "Username")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Phone number or email already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(username): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    tracing::debug!("{} updating user {}", caller.username, username);
    payload.validate()?;

    let user = state.users.update(&username, payload).await?;
    Ok(Json(user.into()))
}

/// Handler for DELETE /user/delete/:username
#[utoipa::path(
    delete,
    path = "/user/delete/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    tracing::debug!("{} deleting user {}", caller.username, username);

    state.users.delete(&username).await?;
    Ok(Json(MessageResponse::new(format!(
        "User deleted by username: {}",
        username
    ))))
}
