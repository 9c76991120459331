use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use scrawl::config::{Cli, Config};
use scrawl::db;
use scrawl::routes;
use scrawl::state::AppState;

const MIGRATION_ATTEMPTS: u32 = 5;
const MIGRATION_RETRY_DELAY: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Ensure uploads directory exists
    std::fs::create_dir_all(config.uploads_path())?;

    // Initialize database. Schema creation is retried a fixed number of
    // times, then given up on without stopping startup.
    let pool = db::create_pool(config.db_path())?;
    db::run_migrations_with_retry(&pool, MIGRATION_ATTEMPTS, MIGRATION_RETRY_DELAY);

    // Build app state
    let state = AppState {
        db: pool,
        config: config.clone(),
    };

    // Multipart bodies must fit the upload cap plus the form fields
    let body_limit = config.uploads.max_file_size as usize + 64 * 1024;

    // Build router
    let app = Router::new()
        .route("/", get(routes::home::index))
        .route("/search", get(routes::home::search))
        .route("/tag/{name}", get(routes::home::posts_by_tag))
        .route("/health", get(routes::home::health))
        .route("/assets/{*path}", get(routes::assets::serve))
        .nest_service("/uploads", ServeDir::new(config.uploads_path()))
        .merge(routes::auth::router())
        .merge(routes::posts::router())
        .merge(routes::comments::router())
        .merge(routes::reactions::router())
        .merge(routes::profile::router())
        .merge(routes::admin::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
