// User service - registration and profile management

use std::sync::Arc;
use tracing::info;

use crate::auth::password::PasswordService;
use crate::error::ApiError;
use crate::users::{
    models::{CreateUserRequest, NewUser, UpdateUserRequest, User, UserChanges},
    repository::UserStore,
};

/// Service for user business logic
///
/// Passwords are hashed here so the store only ever sees hashes.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    passwords: PasswordService,
}

impl UserService {
    /// Create a new UserService
    pub fn new(store: Arc<dyn UserStore>, passwords: PasswordService) -> Self {
        Self { store, passwords }
    }

    /// Register a new user
    pub async fn register(&self, request: CreateUserRequest) -> Result<User, ApiError> {
        let password_hash = self.passwords.hash_password(&request.password)?;

        let user = self
            .store
            .create(NewUser {
                username: request.username,
                name: request.name,
                address: request.address,
                phone_no: request.phone_no,
                email: request.email,
                password_hash,
            })
            .await?;

        info!("Registered user {}", user.username);
        Ok(user)
    }

    /// Get a user by username
    pub async fn get(&self, username: &str) -> Result<User, ApiError> {
        self.store
            .find_by_username(username)
            .await?
            .ok_or_else(|| ApiError::user_not_found(username))
    }

    /// Apply a partial update; a new password is hashed before storage
    pub async fn update(&self, username: &str, request: UpdateUserRequest) -> Result<User, ApiError> {
        let password_hash = request
            .password
            .as_deref()
            .map(|password| self.passwords.hash_password(password))
            .transpose()?;

        let user = self
            .store
            .update(
                username,
                UserChanges {
                    name: request.name,
                    address: request.address,
                    phone_no: request.phone_no,
                    email: request.email,
                    password_hash,
                },
            )
            .await?;

        info!("Updated user {}", username);
        Ok(user)
    }

    /// Delete a user
    ///
    /// Tokens already issued to the user stop authenticating on their next use,
    /// since every request re-resolves its subject.
    pub async fn delete(&self, username: &str) -> Result<(), ApiError> {
        self.store.delete(username).await?;
        info!("Deleted user {}", username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::test_password_service;
    use crate::users::memory::InMemoryUserStore;

    fn test_service() -> UserService {
        UserService::new(Arc::new(InMemoryUserStore::new()), test_password_service())
    }

    fn request(username: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            name: "Alice".to_string(),
            address: "12 Rabbit Hole Lane".to_string(),
            phone_no: "5550001111".to_string(),
            email: format!("{}@example.com", username),
            password: "first-password".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let service = test_service();
        let user = service.register(request("alice")).await.unwrap();

        assert_ne!(user.password_hash, "first-password");
        assert!(test_password_service()
            .verify_password("first-password", &user.password_hash)
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_rehashes_new_password() {
        let service = test_service();
        service.register(request("alice")).await.unwrap();

        let updated = service
            .update(
                "alice",
                UpdateUserRequest {
                    password: Some("second-password".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let passwords = test_password_service();
        assert!(passwords.verify_password("second-password", &updated.password_hash).unwrap());
        assert!(!passwords.verify_password("first-password", &updated.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let service = test_service();
        service.register(request("alice")).await.unwrap();

        assert_eq!(service.get("alice").await.unwrap().username, "alice");
        service.delete("alice").await.unwrap();
        assert!(matches!(service.get("alice").await, Err(ApiError::NotFound { .. })));
    }
}
