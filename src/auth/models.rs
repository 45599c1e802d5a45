// Authentication DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Login request DTO
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username can't be empty"))]
    #[schema(example = "alice_01")]
    pub username: String,
    #[validate(length(min = 1, message = "Password can't be empty"))]
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

/// Login response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    #[schema(example = "Welcome, login successful!")]
    pub message: String,
}
