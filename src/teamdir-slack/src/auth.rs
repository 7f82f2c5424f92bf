//! Shared-secret check for inbound requests.

use tracing::error;

/// Reply text for requests that fail the token check.
pub const UNAUTHENTICATED_MESSAGE: &str = "unauthenticated request, tsk tsk!";

/// Result of checking a request's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// The token matches the shared secret.
    Authenticated,
    /// The token is missing or wrong.
    Rejected,
}

impl AuthDecision {
    /// Whether the request may proceed to search.
    pub fn is_authenticated(self) -> bool {
        self == AuthDecision::Authenticated
    }
}

/// Compare the request token with the configured secret, byte for byte.
pub fn authenticate(token: &str, shared_secret: &str) -> AuthDecision {
    if token.as_bytes() == shared_secret.as_bytes() {
        AuthDecision::Authenticated
    } else {
        error!("Token received from Slack does not match the expected token");
        AuthDecision::Rejected
    }
}
