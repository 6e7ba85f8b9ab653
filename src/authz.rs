//! Caller identity and the injected authorization interface.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use std::collections::HashSet;

/// Capability required to read or write site settings.
pub const CAP_MANAGE_SETTINGS: &str = "manage_settings";

/// The identity presented by a request: at most a bearer token.
#[derive(Clone, Default)]
pub struct Caller {
    token: Option<Secret<String>>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(Secret::new(token.into())),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.token.is_none()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret().as_str())
    }
}

impl std::fmt::Debug for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Caller")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Decides whether a caller holds a named capability. The facade depends on
/// this interface only, not on how capabilities are stored or evaluated.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn caller_can(&self, caller: &Caller, capability: &str) -> bool;
}

/// Grants every capability to callers presenting the configured admin token.
///
/// With no token configured, nothing is granted.
pub struct TokenAuthorizer {
    admin_token: Option<Secret<String>>,
}

impl TokenAuthorizer {
    pub fn new(admin_token: Option<Secret<String>>) -> Self {
        Self { admin_token }
    }
}

#[async_trait]
impl Authorizer for TokenAuthorizer {
    async fn caller_can(&self, caller: &Caller, _capability: &str) -> bool {
        let Some(expected) = self.admin_token.as_ref() else {
            return false;
        };
        let expected = expected.expose_secret();
        if expected.is_empty() {
            return false;
        }
        caller
            .token()
            .map(|token| secure_compare(token, expected))
            .unwrap_or(false)
    }
}

/// Authorizer with a fixed capability set, independent of the caller.
/// Useful for tests and trusted embedding.
pub struct StaticAuthorizer {
    granted: HashSet<String>,
}

impl StaticAuthorizer {
    pub fn allow_all() -> Self {
        Self::granting([CAP_MANAGE_SETTINGS])
    }

    pub fn deny_all() -> Self {
        Self::granting([])
    }

    pub fn granting<const N: usize>(capabilities: [&str; N]) -> Self {
        Self {
            granted: capabilities.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[async_trait]
impl Authorizer for StaticAuthorizer {
    async fn caller_can(&self, _caller: &Caller, capability: &str) -> bool {
        self.granted.contains(capability)
    }
}

/// Constant-time string comparison to prevent timing attacks
fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (byte_a, byte_b) in a.bytes().zip(b.bytes()) {
        result |= byte_a ^ byte_b;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_compare_rejects_length_mismatch() {
        assert!(!secure_compare("abc", "abcd"));
        assert!(secure_compare("abcd", "abcd"));
        assert!(!secure_compare("abcd", "abce"));
    }

    #[tokio::test]
    async fn token_authorizer_without_configured_token_denies() {
        let authz = TokenAuthorizer::new(None);
        let caller = Caller::with_token("anything");
        assert!(!authz.caller_can(&caller, CAP_MANAGE_SETTINGS).await);
    }

    #[tokio::test]
    async fn token_authorizer_matches_exact_token() {
        let authz = TokenAuthorizer::new(Some(Secret::new("s3cret".to_string())));
        assert!(
            authz
                .caller_can(&Caller::with_token("s3cret"), CAP_MANAGE_SETTINGS)
                .await
        );
        assert!(
            !authz
                .caller_can(&Caller::with_token("wrong"), CAP_MANAGE_SETTINGS)
                .await
        );
        assert!(
            !authz
                .caller_can(&Caller::anonymous(), CAP_MANAGE_SETTINGS)
                .await
        );
    }
}
