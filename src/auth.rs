//! Host authentication
//!
//! The host logs in with a shared password. Several credential sources are
//! accepted (a fixed master password, the rotating host password, an optional
//! SHA-256 digest) and checked in order. A successful login yields a session
//! token that is carried in the `host_session` cookie.

use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Name of the cookie carrying the host session token
pub const SESSION_COOKIE: &str = "host_session";

/// One accepted way of proving to be the host
#[derive(Debug, Clone)]
pub enum Credential {
    /// Fixed master password, always accepted
    Master(String),
    /// Host password that is rotated between events
    Rotating(String),
    /// Hex-encoded SHA-256 digest of an accepted password
    Sha256(String),
}

impl Credential {
    fn matches(&self, password: &str) -> bool {
        match self {
            Credential::Master(secret) | Credential::Rotating(secret) => {
                constant_time_eq(secret.as_bytes(), password.as_bytes())
            }
            Credential::Sha256(digest) => {
                let actual = hex::encode(Sha256::digest(password.as_bytes()));
                constant_time_eq(digest.to_lowercase().as_bytes(), actual.as_bytes())
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Credential::Master(_) => "master",
            Credential::Rotating(_) => "rotating",
            Credential::Sha256(_) => "sha256",
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Accepted credentials, checked in order
    pub credentials: Vec<Credential>,
}

impl AuthConfig {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self { credentials }
    }

    /// Load auth config from environment variables
    /// MASTER_PASSWORD, ADMIN_PASSWORD and ADMIN_PASSWORD_SHA256 are each optional
    pub fn from_env() -> Self {
        let var = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let mut credentials = Vec::new();
        if let Some(master) = var("MASTER_PASSWORD") {
            credentials.push(Credential::Master(master));
        }
        if let Some(host) = var("ADMIN_PASSWORD") {
            credentials.push(Credential::Rotating(host));
        }
        if let Some(digest) = var("ADMIN_PASSWORD_SHA256") {
            if digest.len() == 64 && hex::decode(&digest).is_ok() {
                credentials.push(Credential::Sha256(digest));
            } else {
                tracing::warn!("ADMIN_PASSWORD_SHA256 is not a hex SHA-256 digest, ignoring it");
            }
        }

        if credentials.is_empty() {
            tracing::warn!(
                "No host password configured - set MASTER_PASSWORD or ADMIN_PASSWORD, nobody can log in as host!"
            );
        } else {
            let labels: Vec<_> = credentials.iter().map(Credential::label).collect();
            tracing::info!("Host authentication enabled ({})", labels.join(", "));
        }

        Self { credentials }
    }

    /// Check a password against every credential source
    pub fn authorize(&self, password: &str) -> bool {
        if password.is_empty() {
            return false;
        }
        self.credentials.iter().any(|c| c.matches(password))
    }
}

/// Constant-time byte comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Most host sessions kept at once; the oldest is dropped past this
pub const MAX_HOST_SESSIONS: usize = 16;

/// Tokens of currently logged-in host sessions, oldest first
#[derive(Debug, Default)]
pub struct HostSessions {
    tokens: RwLock<VecDeque<String>>,
}

impl HostSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session and return its token
    pub async fn open(&self) -> String {
        let token = ulid::Ulid::new().to_string();
        let mut tokens = self.tokens.write().await;
        while tokens.len() >= MAX_HOST_SESSIONS {
            if let Some(expired) = tokens.pop_front() {
                tracing::debug!("Dropping oldest host session {}", expired);
            }
        }
        tokens.push_back(token.clone());
        token
    }

    pub async fn close(&self, token: &str) -> bool {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| t != token);
        tokens.len() != before
    }

    pub async fn contains(&self, token: &str) -> bool {
        self.tokens.read().await.iter().any(|t| t == token)
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

/// Extract the host session token from the Cookie header
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Set-Cookie value for a fresh session
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// Set-Cookie value that removes the session cookie
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
