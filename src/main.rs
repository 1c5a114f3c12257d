mod config;
mod dirs;
mod error;
mod handlers;
mod models;
mod persist;
mod rate_limit;
mod state;
mod storage;
mod utils;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use tracing::info;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    handlers::{upload_bulk, upload_file},
    rate_limit::{DEFAULT_WINDOWS, RateLimiter},
    state::AppState,
    storage::init_source,
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()
        .expect("Failed to load configuration");

    dirs::ensure_dir(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");

    let source = init_source(&config)
        .await
        .expect("Failed to initialize upload source");

    let state = AppState {
        source,
        limiter: Arc::new(RateLimiter::new(DEFAULT_WINDOWS)),
        config: config.clone(),
    };

    let addr = SocketAddr::new(config.host, config.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

pub(crate) fn app(state: AppState) -> Router {
    // Generous request ceiling: a full bulk submission plus form overhead
    let body_limit = (state.config.max_file_size as usize)
        .saturating_mul(state.config.max_files_bulk)
        .saturating_add(1024 * 1024);

    let upload_routes = Router::new()
        .route("/upload/file", post(upload_file))
        .route("/upload/bulk", post(upload_bulk))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::throttle,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(upload_routes)
        // Read-only static view of everything persisted so far
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allowed_origins.iter().any(|origin| origin == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

async fn health_check() -> &'static str {
    "OK"
}
