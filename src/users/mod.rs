pub mod handlers;
pub mod memory;
pub mod models;
pub mod repository;
pub mod service;

pub use handlers::*;
pub use memory::InMemoryUserStore;
pub use models::{CreateUserRequest, MessageResponse, UpdateUserRequest, User, UserResponse};
pub use repository::{PgUserStore, UserStore};
pub use service::UserService;
