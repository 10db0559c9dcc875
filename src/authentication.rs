//! Authentication policy: resolves the current identity and expands it into
//! a set of principals (self, groups) against the database views.

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::identify::{HeaderPair, Identifier, RememberOptions};
use crate::principal::{Principal, AUTHENTICATED, EVERYONE};
use crate::store::ViewStore;

/// View names consumed by the authentication policy. An explicit config
/// value passed into the constructor; there is no ambient global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationViews {
    /// Maps usernames (key) to anything; only used to validate that a user
    /// exists.
    pub user_names: String,
    /// Maps usernames (key) to the names of groups they belong to (value).
    pub user_groups: String,
}

impl Default for AuthenticationViews {
    fn default() -> Self {
        Self {
            user_names: "pyramid/user_names".to_string(),
            user_groups: "pyramid/user_groups".to_string(),
        }
    }
}

/// The conventional shape of an authentication policy in a request pipeline.
pub trait AuthenticationPolicy: Send + Sync {
    /// The remembered identity, taken at face value. No validation.
    fn unauthenticated_identity(&self, request: &HeaderMap) -> Option<String>;

    /// The remembered identity, validated against the user-existence view.
    /// This is the sole point where a claimed identity is checked for
    /// continued existence.
    fn authenticated_identity(&self, request: &HeaderMap) -> anyhow::Result<Option<String>>;

    /// Every principal the request holds. Always contains [`EVERYONE`];
    /// duplicates never appear and order is not significant.
    fn effective_principals(&self, request: &HeaderMap) -> anyhow::Result<Vec<String>>;

    /// Response headers that remember `principal`. Accepts a bare username
    /// or a `kind:name` formatted string; only the bare name is forwarded
    /// to the identifier.
    fn remember(
        &self,
        request: &HeaderMap,
        principal: &str,
        options: &RememberOptions,
    ) -> Vec<HeaderPair>;

    /// Response headers that forget the current identity.
    fn forget(&self, request: &HeaderMap) -> Vec<HeaderPair>;
}

/// Authentication policy backed by a document database's views.
pub struct CouchAuthenticationPolicy {
    store: Arc<dyn ViewStore>,
    identifier: Arc<dyn Identifier>,
    views: AuthenticationViews,
}

impl CouchAuthenticationPolicy {
    pub fn new(store: Arc<dyn ViewStore>, identifier: Arc<dyn Identifier>) -> Self {
        Self::with_views(store, identifier, AuthenticationViews::default())
    }

    pub fn with_views(
        store: Arc<dyn ViewStore>,
        identifier: Arc<dyn Identifier>,
        views: AuthenticationViews,
    ) -> Self {
        Self { store, identifier, views }
    }

    /// Expand an identity into its principal set. A known identity yields
    /// the [`AUTHENTICATED`] marker, its own `user:` principal, and one
    /// `group:` principal per membership. An identity absent from the
    /// user-existence view contributes nothing, even though the identifier
    /// produced it: that models a revoked or deleted user still carrying a
    /// stale session.
    pub fn expand(&self, identity: &str) -> anyhow::Result<Vec<String>> {
        let users = self.store.query(&self.views.user_names, identity)?;
        if users.is_empty() {
            debug!("authn.expand identity={} unknown", identity);
            return Ok(Vec::new());
        }
        let mut principals = vec![
            AUTHENTICATED.to_string(),
            Principal::new("user", identity).to_string(),
        ];
        for group in self.store.query(&self.views.user_groups, identity)? {
            principals.push(Principal::new("group", group.value).to_string());
        }
        Ok(principals)
    }
}

impl AuthenticationPolicy for CouchAuthenticationPolicy {
    fn unauthenticated_identity(&self, request: &HeaderMap) -> Option<String> {
        self.identifier.identify(request)
    }

    fn authenticated_identity(&self, request: &HeaderMap) -> anyhow::Result<Option<String>> {
        let Some(identity) = self.unauthenticated_identity(request) else {
            return Ok(None);
        };
        let users = self.store.query(&self.views.user_names, &identity)?;
        if users.is_empty() {
            debug!("authn.identity identity={} not in {}", identity, self.views.user_names);
            Ok(None)
        } else {
            Ok(Some(identity))
        }
    }

    fn effective_principals(&self, request: &HeaderMap) -> anyhow::Result<Vec<String>> {
        let mut principals = vec![EVERYONE.to_string()];
        if let Some(identity) = self.unauthenticated_identity(request) {
            let mut seen: HashSet<String> = principals.iter().cloned().collect();
            for principal in self.expand(&identity)? {
                if seen.insert(principal.clone()) {
                    principals.push(principal);
                }
            }
        }
        Ok(principals)
    }

    fn remember(
        &self,
        request: &HeaderMap,
        principal: &str,
        options: &RememberOptions,
    ) -> Vec<HeaderPair> {
        let name = Principal::parse(principal).name.unwrap_or_default();
        self.identifier.remember(request, &name, options)
    }

    fn forget(&self, request: &HeaderMap) -> Vec<HeaderPair> {
        self.identifier.forget(request)
    }
}
