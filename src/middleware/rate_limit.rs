// Sliding-window limiter for the sign-in endpoints
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::HttpError;

pub const LOGIN_ATTEMPTS: usize = 5;
pub const LOGIN_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Clone, Debug)]
pub struct RateLimiter {
    requests: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    pub fn login() -> Self {
        Self::new(LOGIN_ATTEMPTS, LOGIN_WINDOW)
    }

    pub fn is_allowed(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut requests = self
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        requests.retain(|_, timestamps| {
            timestamps.retain(|&timestamp| now.duration_since(timestamp) < self.window);
            !timestamps.is_empty()
        });

        let entry = requests.entry(key.to_string()).or_default();
        if entry.len() < self.max_requests {
            entry.push(now);
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

fn client_id(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        // the proxy appends the peer it saw; earlier entries are client supplied
        .and_then(|s| s.rsplit(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            request
                .headers()
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn login_rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let key = format!("{}:{}", request.uri().path(), client_id(&request));

    if !limiter.is_allowed(&key) {
        tracing::warn!("Rate limit exceeded for {}", key);
        return Err(HttpError::too_many_requests(
            "Too many login attempts. Please try again in 15 minutes.",
        ));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_limit_within_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check_at("ip", now));
        assert!(limiter.check_at("ip", now));
        assert!(!limiter.check_at("ip", now));
        assert!(limiter.check_at("other-ip", now));
    }

    #[test]
    fn window_slides() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at("ip", start));
        assert!(!limiter.check_at("ip", start + Duration::from_secs(30)));
        assert!(limiter.check_at("ip", start + Duration::from_secs(61)));
    }

    #[test]
    fn expired_clients_are_forgotten() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let start = Instant::now();
        for i in 0..100 {
            assert!(limiter.check_at(&format!("/login:10.0.0.{}", i), start));
        }
        assert_eq!(limiter.tracked_keys(), 100);

        assert!(limiter.check_at("/login:10.0.1.1", start + Duration::from_secs(61)));
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn forwarded_for_uses_the_proxy_appended_address() {
        let request = axum::http::Request::builder()
            .header("x-forwarded-for", "1.2.3.4, 203.0.113.7")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(client_id(&request), "203.0.113.7");

        let spoofed = axum::http::Request::builder()
            .header("x-forwarded-for", "9.9.9.9, 203.0.113.7")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(client_id(&spoofed), client_id(&request));
    }
}
