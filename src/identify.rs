//! Capability seam over the external session/cookie identity mechanism.

use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

/// A response header to append, e.g. a `Set-Cookie` pair.
pub type HeaderPair = (HeaderName, HeaderValue);

/// Knobs forwarded to the identifier when remembering an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberOptions {
    /// Lifetime of the remembered identity, in seconds. `None` means
    /// session-scoped.
    #[serde(default)]
    pub max_age: Option<u64>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub secure: bool,
}

/// Persists and recalls "who is currently authenticated" across requests,
/// typically via a signed cookie. Implementations live outside this crate.
pub trait Identifier: Send + Sync {
    /// Return the remembered identity for the request, or `None`.
    fn identify(&self, request: &HeaderMap) -> Option<String>;

    /// Return the response headers that cause `identity` to be remembered.
    fn remember(
        &self,
        request: &HeaderMap,
        identity: &str,
        options: &RememberOptions,
    ) -> Vec<HeaderPair>;

    /// Return the response headers that cause any remembered identity to be
    /// forgotten.
    fn forget(&self, request: &HeaderMap) -> Vec<HeaderPair>;
}
