//! Authorization policy: decides whether a set of principals holds a
//! permission, and which principals hold a given permission.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::principal::{Principal, EVERYONE};
use crate::store::ViewStore;

/// View names consumed by the authorization policy. Each direction is
/// independently optional: `None` disables that mapping entirely, so a
/// deployment can choose user-level permissions, group-level permissions,
/// both, or neither without code changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationViews {
    /// Maps usernames (key) to permission names (value).
    #[serde(default)]
    pub user_perms: Option<String>,
    /// Maps group names (key) to permission names (value).
    #[serde(default)]
    pub group_perms: Option<String>,
    /// Maps permission names (key) to usernames (value).
    #[serde(default)]
    pub perm_users: Option<String>,
    /// Maps permission names (key) to group names (value).
    #[serde(default)]
    pub perm_groups: Option<String>,
}

impl Default for AuthorizationViews {
    fn default() -> Self {
        Self {
            user_perms: None,
            group_perms: Some("pyramid/group_perms".to_string()),
            perm_users: None,
            perm_groups: Some("pyramid/perm_groups".to_string()),
        }
    }
}

/// The context in which a permission check occurs. Carried for interface
/// compatibility; the decision logic has no per-resource ACL support and
/// does not consult it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub resource: Option<String>,
}

/// The conventional shape of an authorization policy.
pub trait AuthorizationPolicy: Send + Sync {
    /// True if any of `principals` holds `permission`.
    fn permits(
        &self,
        context: &Context,
        principals: &[String],
        permission: &str,
    ) -> anyhow::Result<bool>;

    /// The principal strings holding `permission`: users first, then groups,
    /// each in the view's natural return order.
    fn principals_allowed_by_permission(
        &self,
        context: &Context,
        permission: &str,
    ) -> anyhow::Result<Vec<String>>;
}

/// Authorization policy backed by a document database's views.
pub struct CouchAuthorizationPolicy {
    store: Arc<dyn ViewStore>,
    views: AuthorizationViews,
}

impl CouchAuthorizationPolicy {
    pub fn new(store: Arc<dyn ViewStore>) -> Self {
        Self::with_views(store, AuthorizationViews::default())
    }

    pub fn with_views(store: Arc<dyn ViewStore>, views: AuthorizationViews) -> Self {
        Self { store, views }
    }

    fn view_grants(&self, view: &str, key: &str, permission: &str) -> anyhow::Result<bool> {
        let rows = self.store.query(view, key)?;
        Ok(rows.iter().any(|row| row.value == permission))
    }
}

impl AuthorizationPolicy for CouchAuthorizationPolicy {
    fn permits(
        &self,
        _context: &Context,
        principals: &[String],
        permission: &str,
    ) -> anyhow::Result<bool> {
        for principal in principals {
            let pobj = if principal == EVERYONE {
                Principal::new("user", EVERYONE)
            } else {
                Principal::parse(principal)
            };
            let name = pobj.name.as_deref().unwrap_or("");
            let view = match pobj.kind.as_deref() {
                Some("user") => self.views.user_perms.as_deref(),
                Some("group") => self.views.group_perms.as_deref(),
                _ => None,
            };
            if let Some(view) = view {
                if self.view_grants(view, name, permission)? {
                    debug!("authz.permits principal={} permission={} granted", principal, permission);
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn principals_allowed_by_permission(
        &self,
        _context: &Context,
        permission: &str,
    ) -> anyhow::Result<Vec<String>> {
        let mut principals = Vec::new();
        if let Some(view) = &self.views.perm_users {
            for row in self.store.query(view, permission)? {
                principals.push(Principal::new("user", row.value).to_string());
            }
        }
        if let Some(view) = &self.views.perm_groups {
            for row in self.store.query(view, permission)? {
                principals.push(Principal::new("group", row.value).to_string());
            }
        }
        Ok(principals)
    }
}
