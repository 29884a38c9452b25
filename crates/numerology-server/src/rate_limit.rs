//! Per-client request throttling.
//!
//! Each client address gets its own token bucket with a fixed per-minute
//! quota. The limiter is keyed on the peer IP taken from the connection
//! info; when no connection info is present (router driven directly in
//! tests) all requests share a single fallback key.

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::Clock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::ServerError;

type KeyedLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, governor::clock::DefaultClock>;

const FALLBACK_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Keyed rate limiter shared across all connections.
#[derive(Clone)]
pub struct ClientRateLimiter {
    limiter: Arc<KeyedLimiter>,
}

impl ClientRateLimiter {
    /// Create a limiter allowing the given number of requests per minute per
    /// client address.
    pub fn per_minute(requests: NonZeroU32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(requests))),
        }
    }

    /// Check the quota for one client.
    ///
    /// Returns the number of seconds until the next request would be allowed
    /// when the quota is exhausted.
    pub fn check(&self, client: IpAddr) -> std::result::Result<(), u64> {
        self.limiter.check_key(&client).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.limiter.clock().now());
            wait.as_secs().max(1)
        })
    }
}

/// Middleware enforcing the per-client quota on a route.
///
/// Exhausted quotas yield 429 with a `Retry-After` header and the standard
/// JSON error body.
pub async fn rate_limit_middleware(
    State(limiter): State<ClientRateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(FALLBACK_CLIENT, |info| info.0.ip());

    match limiter.check(client) {
        Ok(()) => next.run(req).await,
        Err(retry_after_secs) => {
            log::warn!("Rate limit exceeded for client {}", client);
            let err = ServerError::RateLimited { retry_after_secs };
            let mut response = (err.status_code(), err.body()).into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, retry_after_secs.into());
            response
        }
    }
}
