/// Per-IP rate limiting middleware
///
/// Token bucket rate limiting applied to the submit path, independent of
/// the per-account monthly quota: the quota bounds how much an account may
/// consume, this bounds how fast any one address may hammer the endpoint.
///
/// # Algorithm
///
/// Token bucket per client IP:
/// - Tokens refill at a constant rate derived from the hourly allowance
/// - Each request consumes 1 token
/// - Requests are rejected with 429 when the bucket is empty
///
/// # Storage
///
/// Buckets live in process memory keyed by IP. This matches the
/// single-process deployment; a multi-instance deployment would move the
/// state to a shared store, which is exactly why the middleware is kept
/// interchangeable behind the router.
///
/// # Headers
///
/// 429 responses carry a `Retry-After` header with the seconds until a
/// token is available.

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// Token bucket state for one client IP
#[derive(Debug, Clone)]
struct TokenBucket {
    /// Current number of tokens
    tokens: f64,

    /// Last refill timestamp (Unix seconds)
    last_refill: u64,
}

impl TokenBucket {
    /// Creates a new full bucket
    fn new(capacity: u32, now: u64) -> Self {
        TokenBucket {
            tokens: capacity as f64,
            last_refill: now,
        }
    }

    /// Refills tokens based on elapsed time
    fn refill(&mut self, now: u64, rate: f64, capacity: u32) {
        let elapsed_secs = now.saturating_sub(self.last_refill) as f64;
        let new_tokens = elapsed_secs * rate;

        self.tokens = (self.tokens + new_tokens).min(capacity as f64);
        self.last_refill = now;
    }

    /// Attempts to consume N tokens
    fn try_consume(&mut self, count: f64) -> bool {
        if self.tokens >= count {
            self.tokens -= count;
            true
        } else {
            false
        }
    }

    /// Calculates seconds until N tokens are available
    fn seconds_until_available(&self, count: f64, rate: f64) -> u64 {
        let deficit = count - self.tokens;
        if deficit <= 0.0 {
            0
        } else {
            (deficit / rate).ceil() as u64
        }
    }
}

/// Per-IP rate limiter
///
/// Constructed once at startup and shared via [`AppState`].
pub struct RateLimiter {
    /// Requests allowed per hour, also the burst capacity
    requests_per_hour: u32,

    /// Token refill rate (tokens per second)
    refill_rate: f64,

    /// Bucket per client IP
    buckets: Mutex<HashMap<IpAddr, TokenBucket>>,
}

impl RateLimiter {
    /// Creates a rate limiter allowing `requests_per_hour` per IP
    pub fn new(requests_per_hour: u32) -> Self {
        RateLimiter {
            requests_per_hour,
            refill_rate: requests_per_hour as f64 / 3600.0,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Checks and consumes one token for the given IP
    ///
    /// Returns `Err(retry_after_seconds)` when the bucket is empty.
    pub async fn check(&self, ip: IpAddr) -> Result<(), u64> {
        self.check_at(ip, unix_now()).await
    }

    /// Time-parameterized variant of [`RateLimiter::check`]
    async fn check_at(&self, ip: IpAddr, now: u64) -> Result<(), u64> {
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets
            .entry(ip)
            .or_insert_with(|| TokenBucket::new(self.requests_per_hour, now));

        bucket.refill(now, self.refill_rate, self.requests_per_hour);

        if bucket.try_consume(1.0) {
            Ok(())
        } else {
            Err(bucket.seconds_until_available(1.0, self.refill_rate))
        }
    }
}

/// Current Unix time in seconds
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Rate limiting middleware layer
///
/// Checks the per-IP bucket before processing the request. When the server
/// is not run with connect info (e.g. under a test harness), all requests
/// share the loopback bucket.
///
/// # Errors
///
/// - 429 Too Many Requests with `Retry-After` when the bucket is empty
pub async fn rate_limit_layer(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    match state.rate_limiter.check(ip).await {
        Ok(()) => Ok(next.run(request).await),
        Err(retry_after) => {
            tracing::warn!(ip = %ip, retry_after, "submission rate limit exceeded");
            Err(ApiError::RateLimitExceeded {
                retry_after,
                message: "Too many submissions from this address".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_starts_full() {
        let mut bucket = TokenBucket::new(10, 1000);
        for _ in 0..10 {
            assert!(bucket.try_consume(1.0));
        }
        assert!(!bucket.try_consume(1.0));
    }

    #[test]
    fn test_bucket_refills_over_time() {
        let rate = 1.0; // 1 token/sec
        let mut bucket = TokenBucket::new(2, 1000);

        assert!(bucket.try_consume(1.0));
        assert!(bucket.try_consume(1.0));
        assert!(!bucket.try_consume(1.0));

        bucket.refill(1001, rate, 2);
        assert!(bucket.try_consume(1.0));
    }

    #[test]
    fn test_bucket_refill_caps_at_capacity() {
        let mut bucket = TokenBucket::new(5, 1000);
        bucket.refill(999_999, 1.0, 5);
        assert!(bucket.tokens <= 5.0);
    }

    #[test]
    fn test_seconds_until_available() {
        let mut bucket = TokenBucket::new(1, 1000);
        assert!(bucket.try_consume(1.0));

        // 0.5 tokens/sec means a full token is 2 seconds away
        assert_eq!(bucket.seconds_until_available(1.0, 0.5), 2);
        assert_eq!(bucket.seconds_until_available(1.0, 1.0), 1);
    }

    #[tokio::test]
    async fn test_rate_limiter_isolates_ips() {
        let limiter = RateLimiter::new(1);
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check_at(a, 1000).await.is_ok());
        assert!(limiter.check_at(a, 1000).await.is_err());

        // A different address has its own bucket
        assert!(limiter.check_at(b, 1000).await.is_ok());
    }

    #[tokio::test]
    async fn test_rate_limiter_recovers_after_window() {
        let limiter = RateLimiter::new(1);
        let ip: IpAddr = "10.0.0.3".parse().unwrap();

        assert!(limiter.check_at(ip, 0).await.is_ok());
        let retry_after = limiter.check_at(ip, 0).await.unwrap_err();
        assert_eq!(retry_after, 3600);

        // A full refill window later the request goes through again
        assert!(limiter.check_at(ip, 3600).await.is_ok());
    }
}
