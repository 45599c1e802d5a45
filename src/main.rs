use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use user_api::{
    auth::{AccessPolicy, PasswordService, StaticRoles, TokenService},
    config::AppConfig,
    create_router, db,
    users::{InMemoryUserStore, PgUserStore, UserStore},
    AppState,
};

/// Periodically drop revoked tokens that have expired on their own
fn spawn_revocation_sweeper(tokens: Arc<TokenService>, every_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(every_secs));
        loop {
            interval.tick().await;
            let removed = tokens.sweep_revoked();
            if removed > 0 {
                tracing::debug!(
                    "Swept {} expired revocations, {} remaining",
                    removed,
                    tokens.revoked_count()
                );
            }
        }
    });
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("User API - Starting...");

    let config = AppConfig::from_env().expect("Invalid configuration");

    let store: Arc<dyn UserStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");
            db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, users are kept in memory and lost on restart");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let tokens = Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl_secs));
    spawn_revocation_sweeper(tokens.clone(), config.revocation_sweep_secs);

    let policy = AccessPolicy::new(AccessPolicy::default_rules())
        .expect("Default access policy must not overlap");

    let state = AppState::new(
        store,
        tokens,
        PasswordService::new(),
        Arc::new(StaticRoles::default()),
        policy,
    );
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("User API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
