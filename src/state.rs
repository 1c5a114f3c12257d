use std::sync::Arc;

use crate::config::Config;
use crate::rate_limit::RateLimiter;
use crate::storage::SourceBackend;

/// Central application state shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables or `.env`.
    pub config: Config,

    /// Upload buffering strategy (memory or disk spool).
    pub source: SourceBackend,

    /// Per-address sliding-window limiter for the upload routes.
    pub limiter: Arc<RateLimiter>,
}
