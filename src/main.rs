//! Geometa Catalog - Main Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rand::Rng;

use geometa_catalog::{
    api,
    config::Config,
    db,
    error::Result,
    services::user_service::{CreateUserRequest, UserService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geometa_catalog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Starting Geometa Catalog");

    // Connect to database
    let db_pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Connected to database");

    // Run migrations
    db::MIGRATOR.run(&db_pool).await?;
    tracing::info!("Database migrations complete");

    // Provision admin user on first boot
    provision_admin_user(&db_pool, &config).await?;

    // Create application state
    let state = Arc::new(api::AppState::new(config.clone(), db_pool));

    // Build router
    let app = Router::new()
        .merge(api::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.bind_address.parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Provision the initial admin user on first boot.
///
/// Uses `ADMIN_PASSWORD` when set; otherwise a random password is generated
/// and logged once so the operator can log in and change it.
async fn provision_admin_user(db: &sqlx::SqlitePool, config: &Config) -> Result<()> {
    let users = UserService::new(db.clone());
    if users.admin_exists().await? {
        return Ok(());
    }

    let (password, generated) = match &config.admin_password {
        Some(password) => (password.clone(), false),
        None => (generate_password(), true),
    };

    users
        .create(&CreateUserRequest {
            email: config.admin_email.clone(),
            name: "Administrator".to_string(),
            password: Some(password.clone()),
            role: Some("ADMIN".to_string()),
            organization: None,
        })
        .await?;

    if generated {
        tracing::info!(
            "\n\
            ===========================================================\n\
            \n\
              Initial admin user created.\n\
            \n\
              Email:     {}\n\
              Password:  {}\n\
            \n\
              Log in and change this password.\n\
            \n\
            ===========================================================",
            config.admin_email,
            password,
        );
    } else {
        tracing::info!("Admin user created with password from ADMIN_PASSWORD env var");
    }

    Ok(())
}

/// Generate a random admin password
fn generate_password() -> String {
    const CHARSET: &[u8] = b"abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789!@#$%&*";
    let mut rng = rand::rng();
    (0..20)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
