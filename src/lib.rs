pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod users;
pub mod validation;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    authenticate, authorize, AccessPolicy, AuthService, Authenticator, LoginRequest,
    LoginResponse, PasswordService, RoleResolver, TokenService,
};
use users::{
    CreateUserRequest, MessageResponse, UpdateUserRequest, UserResponse, UserService, UserStore,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        users::handlers::save_user,
        users::handlers::get_user,
        users::handlers::update_user,
        users::handlers::delete_user,
        auth::handlers::login_handler,
        auth::handlers::logout_handler,
    ),
    components(
        schemas(
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
            MessageResponse,
            LoginRequest,
            LoginResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "User registration and management"),
        (name = "auth", description = "Login and logout")
    ),
    info(
        title = "User API",
        version = "1.0.0",
        description = "User management API secured with bearer tokens"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub auth: AuthService,
    pub authenticator: Authenticator,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    /// Wire the services around one user store and one token service
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
        passwords: PasswordService,
        roles: Arc<dyn RoleResolver>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            users: UserService::new(store.clone(), passwords.clone()),
            auth: AuthService::new(store.clone(), passwords, tokens.clone()),
            authenticator: Authenticator::new(tokens, store, roles),
            policy: Arc::new(policy),
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Creates and configures the application router
///
/// Every request passes through `authenticate` and then `authorize` before
/// reaching a handler, Swagger UI included.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .route("/user/save", post(users::save_user))
        .route("/user/login", post(auth::login_handler))
        .route("/user/logout", post(auth::logout_handler))
        .route("/user/get/:username", get(users::get_user))
        .route("/user/update/:username", patch(users::update_user))
        .route("/user/delete/:username", delete(users::delete_user))
        // layers wrap outside-in: authenticate runs first, then authorize
        .layer(from_fn_with_state(state.policy.clone(), authorize))
        .layer(from_fn_with_state(state.authenticator.clone(), authenticate))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests;
