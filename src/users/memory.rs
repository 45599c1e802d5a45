// In-process user store, used when no database is configured and in tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::users::models::{NewUser, User, UserChanges};
use crate::users::repository::{duplicate, UserStore};

/// User store backed by a map guarded by a single lock
///
/// Uniqueness checks and the write that follows them happen under one write
/// guard, so concurrent registrations cannot both claim the same value.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn taken_by_other(
    users: &HashMap<String, User>,
    username: &str,
    matches: impl Fn(&User) -> bool,
) -> bool {
    users
        .values()
        .any(|user| user.username != username && matches(user))
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, ApiError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.username) {
            return Err(duplicate("username", &user.username));
        }
        if users.values().any(|u| u.phone_no == user.phone_no) {
            return Err(duplicate("phone_no", &user.phone_no));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(duplicate("email", &user.email));
        }

        let now = Utc::now();
        let created = User {
            username: user.username,
            name: user.name,
            address: user.address,
            phone_no: user.phone_no,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.username.clone(), created.clone());
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn update(&self, username: &str, changes: UserChanges) -> Result<User, ApiError> {
        let mut users = self.users.write().await;

        if !users.contains_key(username) {
            return Err(ApiError::user_not_found(username));
        }
        if let Some(phone_no) = changes.phone_no.as_deref() {
            if taken_by_other(&users, username, |u| u.phone_no == phone_no) {
                return Err(duplicate("phone_no", phone_no));
            }
        }
        if let Some(email) = changes.email.as_deref() {
            if taken_by_other(&users, username, |u| u.email == email) {
                return Err(duplicate("email", email));
            }
        }

        let user = users
            .get_mut(username)
            .ok_or_else(|| ApiError::user_not_found(username))?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(address) = changes.address {
            user.address = address;
        }
        if let Some(phone_no) = changes.phone_no {
            user.phone_no = phone_no;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete(&self, username: &str) -> Result<(), ApiError> {
        self.users
            .write()
            .await
            .remove(username)
            .map(|_| ())
            .ok_or_else(|| ApiError::user_not_found(username))
    }
}
