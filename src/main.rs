//! coachlink-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use coachlink_gateway::api;
use coachlink_gateway::app_state::AppState;
use coachlink_gateway::auth::AuthVerifier;
use coachlink_gateway::config::GatewayConfig;
use coachlink_gateway::domain::SessionRegistry;
use coachlink_gateway::mailer::MailDispatcher;
use coachlink_gateway::persistence::PostgresStore;
use coachlink_gateway::service::Notifier;
use coachlink_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting coachlink-gateway");

    // Connect to PostgreSQL and apply migrations
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Build the delivery paths: durable log, live sessions, side channel.
    // The side channel is selected exactly once here; switching it later
    // requires a restart.
    let store = Arc::new(PostgresStore::new(pool));
    let registry = Arc::new(SessionRegistry::new());
    let mailer = Arc::new(MailDispatcher::from_config(config.smtp.as_ref())?);
    let verifier = Arc::new(AuthVerifier::new(&config.jwt_secret));
    let notifier = Arc::new(Notifier::new(
        Arc::clone(&store),
        Arc::clone(&registry),
        mailer,
    ));

    let app_state = AppState::new(store, registry, notifier, verifier);

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
