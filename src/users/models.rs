// User data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{validate_phone_no, validate_username};

/// User database model
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub username: String,
    pub name: String,
    pub address: String,
    pub phone_no: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a user about to be inserted; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub address: String,
    pub phone_no: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update applied by the store; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone_no: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// User response model (excludes password_hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "alice_01")]
    pub username: String,
    #[schema(example = "Alice Liddell")]
    pub name: String,
    #[schema(example = "12 Rabbit Hole Lane")]
    pub address: String,
    #[schema(example = "5550001111")]
    pub phone_no: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            name: user.name,
            address: user.address,
            phone_no: user.phone_no,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration request DTO
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(custom = "validate_username")]
    #[schema(example = "alice_01", pattern = "^[a-z0-9_]+$")]
    pub username: String,
    #[validate(length(min = 1, message = "name can't be empty"))]
    #[schema(example = "Alice Liddell")]
    pub name: String,
    #[validate(length(min = 1, message = "address can't be empty"))]
    #[schema(example = "12 Rabbit Hole Lane")]
    pub address: String,
    #[validate(custom = "validate_phone_no")]
    #[schema(example = "5550001111")]
    pub phone_no: String,
    #[validate(email(message = "email must be a valid address"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "password can't be empty"))]
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

/// Partial update request DTO; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "name can't be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "address can't be empty"))]
    pub address: Option<String>,
    #[validate(custom = "validate_phone_no")]
    pub phone_no: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "password can't be empty"))]
    pub password: Option<String>,
}

/// Plain confirmation message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
pub fn test_user(username: &str) -> User {
    let now = Utc::now();
    User {
        username: username.to_string(),
        name: "Test User".to_string(),
        address: "1 Test Street".to_string(),
        phone_no: "5550001111".to_string(),
        email: format!("{}@example.com", username),
        password_hash: "not-a-real-hash".to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateUserRequest {
        CreateUserRequest {
            username: "alice_01".to_string(),
            name: "Alice".to_string(),
            address: "12 Rabbit Hole Lane".to_string(),
            phone_no: "5550001111".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_invalid_fields_are_reported() {
        let request = CreateUserRequest {
            username: "Alice!".to_string(),
            phone_no: "12345".to_string(),
            email: "not-an-email".to_string(),
            name: String::new(),
            ..valid_request()
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("phone_no"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("name"));
        assert!(!fields.contains_key("address"));
    }

    #[test]
    fn test_empty_update_is_valid() {
        assert!(UpdateUserRequest::default().validate().is_ok());
    }

    #[test]
    fn test_update_validates_present_fields() {
        let request = UpdateUserRequest {
            phone_no: Some("555".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_response_omits_password_hash() {
        let json = serde_json::to_value(UserResponse::from(test_user("alice"))).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }
}
