use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::{error::AppError, state::AppState};

/// One sliding window: at most `max_hits` requests per `window`.
#[derive(Debug, Clone, Copy)]
pub struct ThrottleWindow {
    pub window: Duration,
    pub max_hits: usize,
}

/// Default upload policy per client address: 10/minute, 30/5-minutes,
/// 100/hour. All three must have room for a request to pass.
pub const DEFAULT_WINDOWS: [ThrottleWindow; 3] = [
    ThrottleWindow { window: Duration::from_secs(60), max_hits: 10 },
    ThrottleWindow { window: Duration::from_secs(300), max_hits: 30 },
    ThrottleWindow { window: Duration::from_secs(3600), max_hits: 100 },
];

/// In-process sliding-window limiter keyed by client address.
///
/// State is local to this worker process; across workers the counters are
/// independent, so the effective cap scales with the worker count.
pub struct RateLimiter {
    windows: Vec<ThrottleWindow>,
    hits: Mutex<HashMap<IpAddr, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(windows: impl Into<Vec<ThrottleWindow>>) -> Self {
        Self {
            windows: windows.into(),
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record a hit for `ip` if every window still has room.
    pub async fn try_acquire(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let horizon = self
            .windows
            .iter()
            .map(|w| w.window)
            .max()
            .unwrap_or_default();

        let mut hits = self.hits.lock().await;
        let entry = hits.entry(ip).or_default();

        // Drop hits older than the widest window.
        while entry
            .front()
            .is_some_and(|t| now.duration_since(*t) >= horizon)
        {
            entry.pop_front();
        }

        for w in &self.windows {
            // Entries are ordered oldest to newest; count recent ones from the back.
            let recent = entry
                .iter()
                .rev()
                .take_while(|t| now.duration_since(**t) < w.window)
                .count();
            if recent >= w.max_hits {
                return false;
            }
        }

        entry.push_back(now);
        true
    }
}

/// Axum middleware gating the upload routes.
pub async fn throttle(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&request);

    if !state.limiter.try_acquire(ip).await {
        warn!("Rate limit exceeded for {}", ip);
        return Err(AppError::TooManyRequests);
    }

    Ok(next.run(request).await)
}

// Prefer the forwarded address set by a proxy, fall back to the connection
// peer, and lastly to the unspecified address.
fn client_ip(request: &Request) -> IpAddr {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|value| value.trim().parse().ok())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
