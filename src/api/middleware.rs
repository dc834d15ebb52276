//! Password gate and login rate limiting.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Cookie carrying the per-process session token.
pub const AUTH_COOKIE: &str = "dashboard-auth";

/// Seven days, in seconds.
const COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 7;

const DEFAULT_LOGIN_RATE_LIMIT: u32 = 10;

/// Paths reachable without a session.
const PUBLIC_PATHS: &[&str] = &["/api/auth", "/health"];

/// Authentication configuration loaded from environment variables.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared dashboard password (from DASHBOARD_PASSWORD). `None` disables the gate.
    pub password: Option<String>,
    /// Random token handed out in the auth cookie; regenerated on every start.
    pub session_token: String,
    /// Mark the cookie `Secure` (from DASHBOARD_SECURE_COOKIE)
    pub secure_cookie: bool,
    /// Limits login attempts per client
    pub login_limiter: Option<RateLimiter>,
}

impl AuthConfig {
    /// Load authentication configuration from environment variables.
    pub fn from_env() -> Self {
        let password = std::env::var("DASHBOARD_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty());

        let secure_cookie = std::env::var("DASHBOARD_SECURE_COOKIE")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let rate_limit = std::env::var("DASHBOARD_LOGIN_RATE_LIMIT")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_LOGIN_RATE_LIMIT);

        // Nothing to brute-force without a password
        let login_limiter = password
            .as_ref()
            .map(|_| RateLimiter::new(rate_limit, Duration::from_secs(60)));

        Self {
            password,
            session_token: Uuid::new_v4().to_string(),
            secure_cookie,
            login_limiter,
        }
    }

    /// No gate (for local development/testing).
    pub fn disabled() -> Self {
        Self {
            password: None,
            session_token: Uuid::new_v4().to_string(),
            secure_cookie: false,
            login_limiter: None,
        }
    }

    /// Gate enabled with the given password and no rate limit (for testing).
    pub fn with_password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            ..Self::disabled()
        }
    }

    pub fn with_login_rate_limit(mut self, max_attempts: u32) -> Self {
        self.login_limiter = Some(RateLimiter::new(max_attempts, Duration::from_secs(60)));
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password
            .as_deref()
            .is_some_and(|password| secrets_match(password, candidate))
    }

    /// A request is authorized by the session cookie, or by the password as a
    /// bearer token for scripted clients.
    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(password) = self.password.as_deref() else {
            return true;
        };

        if cookie_value(headers, AUTH_COOKIE)
            .is_some_and(|token| secrets_match(&self.session_token, token))
        {
            return true;
        }

        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .is_some_and(|token| secrets_match(password, token))
    }

    /// `Set-Cookie` value issued after a successful login.
    pub fn login_cookie(&self) -> String {
        self.cookie(&self.session_token, COOKIE_MAX_AGE)
    }

    /// `Set-Cookie` value that expires the auth cookie.
    pub fn logout_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            AUTH_COOKIE, value, max_age
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Simple in-memory rate limiter using sliding window.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    /// Maximum requests allowed per window
    max_requests: u32,
    /// Time window duration
    window: Duration,
    /// Request timestamps per IP
    requests: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns true if allowed, false if rate limited.
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let cutoff = now.checked_sub(self.window);

        // A poisoned lock only means another request panicked mid-update;
        // the timestamps are still usable.
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());

        // Idle clients drop out entirely so the map stays bounded.
        requests.retain(|_, timestamps| {
            timestamps.retain(|&t| cutoff.map_or(true, |c| t > c));
            !timestamps.is_empty()
        });

        let entry = requests.entry(ip).or_default();
        if entry.len() < self.max_requests as usize {
            entry.push(now);
            true
        } else {
            false
        }
    }
}

/// Rejects requests without a valid session unless the path is public.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if !auth.is_enabled()
        || PUBLIC_PATHS.contains(&request.uri().path())
        || auth.is_authorized(request.headers())
    {
        return Ok(next.run(request).await);
    }

    tracing::warn!("Unauthenticated request to {}", request.uri().path());
    Err(StatusCode::UNAUTHORIZED)
}

/// Rate limiting middleware for the login route.
pub async fn rate_limit_middleware(
    State(rate_limiter): State<RateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let ip = extract_client_ip(&request);

    if rate_limiter.check(ip) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Login rate limit exceeded for IP: {}", ip);
        Err(StatusCode::TOO_MANY_REQUESTS)
    }
}

/// Client IP for rate limiting.
///
/// The socket peer address wins when the server was started with connect
/// info; forwarded headers are only consulted without it.
fn extract_client_ip(request: &Request<Body>) -> IpAddr {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }

    let headers = request.headers();
    let forwarded = headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next());
    let real_ip = headers.get("X-Real-IP").and_then(|v| v.to_str().ok());

    forwarded
        .into_iter()
        .chain(real_ip)
        .find_map(|ip| ip.trim().parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Compare two secrets without an early exit on the first differing byte.
///
/// Both sides are hashed first so the comparison length never depends on the
/// candidate.
fn secrets_match(expected: &str, candidate: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let candidate = Sha256::digest(candidate.as_bytes());
    expected
        .iter()
        .zip(candidate.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn rate_limiter_allows_requests_under_limit() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let ip: IpAddr = "192.168.1.1".parse().unwrap();

        for _ in 0..5 {
            assert!(limiter.check(ip));
        }
    }

    #[test]
    fn rate_limiter_blocks_requests_over_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let ip: IpAddr = "192.168.1.1".parse().unwrap();

        assert!(limiter.check(ip));
        assert!(limiter.check(ip));
        assert!(limiter.check(ip));
        assert!(!limiter.check(ip));
    }

    #[test]
    fn rate_limiter_tracks_ips_independently() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let ip1: IpAddr = "192.168.1.1".parse().unwrap();
        let ip2: IpAddr = "192.168.1.2".parse().unwrap();

        assert!(limiter.check(ip1));
        assert!(limiter.check(ip1));
        assert!(!limiter.check(ip1));

        assert!(limiter.check(ip2));
        assert!(limiter.check(ip2));
        assert!(!limiter.check(ip2));
    }

    #[test]
    fn disabled_gate_authorizes_everything() {
        let auth = AuthConfig::disabled();
        assert!(!auth.is_enabled());
        assert!(auth.is_authorized(&HeaderMap::new()));
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let auth = AuthConfig::with_password("hunter2");
        let mut headers = HeaderMap::new();
        let cookie = format!("theme=dark; {}={}; lang=nl", AUTH_COOKIE, auth.session_token);
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());

        assert!(auth.is_authorized(&headers));
    }

    #[test]
    fn stale_cookie_is_rejected() {
        let auth = AuthConfig::with_password("hunter2");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("dashboard-auth=authenticated"),
        );

        assert!(!auth.is_authorized(&headers));
    }

    #[test]
    fn bearer_password_is_accepted() {
        let auth = AuthConfig::with_password("hunter2");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer hunter2"),
        );
        assert!(auth.is_authorized(&headers));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("hunter2"));
        assert!(!auth.is_authorized(&headers));
    }

    #[test]
    fn secrets_match_only_on_exact_equality() {
        assert!(secrets_match("hunter2", "hunter2"));
        assert!(!secrets_match("hunter2", "hunter3"));
        assert!(!secrets_match("hunter2", "hunter"));
        assert!(!secrets_match("hunter2", ""));
    }

    #[test]
    fn password_check_rejects_near_misses() {
        let auth = AuthConfig::with_password("hunter2");
        assert!(auth.password_matches("hunter2"));
        assert!(!auth.password_matches("hunter2 "));
        assert!(!AuthConfig::disabled().password_matches(""));
    }

    #[test]
    fn secure_flag_is_appended_when_configured() {
        let mut auth = AuthConfig::with_password("hunter2");
        assert!(!auth.login_cookie().contains("Secure"));

        auth.secure_cookie = true;
        let cookie = auth.login_cookie();
        assert!(cookie.starts_with(&format!("{}={}", AUTH_COOKIE, auth.session_token)));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn logout_cookie_expires_immediately() {
        let auth = AuthConfig::with_password("hunter2");
        assert!(auth.logout_cookie().starts_with("dashboard-auth=; "));
        assert!(auth.logout_cookie().contains("Max-Age=0"));
    }
}
