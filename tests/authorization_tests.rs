//! Authorization policy integration tests: grant decisions across the four
//! optional view directions and the permission-to-principal reverse lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use couchauth::{
    AuthorizationPolicy, AuthorizationViews, Context, CouchAuthorizationPolicy, ViewRow,
    ViewStore, EVERYONE,
};

// In-memory store that also records which views were consulted, so tests can
// assert that disabled directions are skipped rather than merely denied.
#[derive(Default)]
struct MemStore {
    rows: HashMap<(String, String), Vec<ViewRow>>,
    queried: Mutex<Vec<String>>,
}

impl MemStore {
    fn insert(&mut self, view: &str, key: &str, values: &[&str]) {
        let rows = values.iter().map(|v| ViewRow::new(key, *v)).collect();
        self.rows.insert((view.to_string(), key.to_string()), rows);
    }

    fn queried_views(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }
}

impl ViewStore for MemStore {
    fn query(&self, view: &str, key: &str) -> anyhow::Result<Vec<ViewRow>> {
        self.queried.lock().unwrap().push(view.to_string());
        Ok(self
            .rows
            .get(&(view.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

struct FailingStore;

impl ViewStore for FailingStore {
    fn query(&self, view: &str, _key: &str) -> anyhow::Result<Vec<ViewRow>> {
        Err(anyhow!("connection refused querying {view}"))
    }
}

fn group_perm_store() -> MemStore {
    let mut store = MemStore::default();
    store.insert("pyramid/group_perms", "administrators", &["superpowers"]);
    store
}

fn principals(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn group_permission_grants_access() {
    let policy = CouchAuthorizationPolicy::new(Arc::new(group_perm_store()));
    let ctx = Context::default();
    let held = principals(&["group:administrators"]);

    assert!(policy.permits(&ctx, &held, "superpowers").unwrap());
    assert!(!policy.permits(&ctx, &held, "godmode").unwrap());
}

#[test]
fn unknown_group_is_denied() {
    let policy = CouchAuthorizationPolicy::new(Arc::new(group_perm_store()));
    let held = principals(&["group:interns"]);
    assert!(!policy.permits(&Context::default(), &held, "superpowers").unwrap());
}

#[test]
fn user_permission_direction_when_enabled() {
    let mut store = MemStore::default();
    store.insert("pyramid/user_perms", "admin", &["superpowers"]);
    let views = AuthorizationViews {
        user_perms: Some("pyramid/user_perms".to_string()),
        ..Default::default()
    };
    let policy = CouchAuthorizationPolicy::with_views(Arc::new(store), views);

    let held = principals(&["user:admin"]);
    assert!(policy.permits(&Context::default(), &held, "superpowers").unwrap());
    assert!(!policy.permits(&Context::default(), &held, "godmode").unwrap());
}

#[test]
fn disabled_direction_is_never_consulted() {
    // The store would answer for the user direction, but user_perms is unset
    // in the default configuration.
    let mut store = MemStore::default();
    store.insert("pyramid/user_perms", "admin", &["superpowers"]);
    let store = Arc::new(store);
    let policy = CouchAuthorizationPolicy::new(store.clone());

    let held = principals(&["user:admin"]);
    assert!(!policy.permits(&Context::default(), &held, "superpowers").unwrap());
    assert!(store.queried_views().is_empty());
}

#[test]
fn everyone_marker_checks_user_direction() {
    let mut store = MemStore::default();
    store.insert("pyramid/user_perms", EVERYONE, &["read"]);
    let views = AuthorizationViews {
        user_perms: Some("pyramid/user_perms".to_string()),
        ..Default::default()
    };
    let policy = CouchAuthorizationPolicy::with_views(Arc::new(store), views);

    let held = principals(&[EVERYONE]);
    assert!(policy.permits(&Context::default(), &held, "read").unwrap());
    assert!(!policy.permits(&Context::default(), &held, "write").unwrap());
}

#[test]
fn untyped_principals_are_skipped_without_queries() {
    let store = Arc::new(group_perm_store());
    let policy = CouchAuthorizationPolicy::new(store.clone());

    // Bare marker strings parse with no kind and match no direction.
    let held = principals(&["system.Authenticated", "administrators"]);
    assert!(!policy.permits(&Context::default(), &held, "superpowers").unwrap());
    assert!(store.queried_views().is_empty());
}

#[test]
fn permits_short_circuits_on_first_grant() {
    let store = Arc::new(group_perm_store());
    let policy = CouchAuthorizationPolicy::new(store.clone());

    let held = principals(&["group:administrators", "group:staff"]);
    assert!(policy.permits(&Context::default(), &held, "superpowers").unwrap());
    assert_eq!(store.queried_views().len(), 1);
}

#[test]
fn principals_allowed_lists_users_then_groups() {
    let mut store = MemStore::default();
    store.insert("pyramid/perm_users", "superpowers", &["admin", "root"]);
    store.insert("pyramid/perm_groups", "superpowers", &["administrators"]);
    let views = AuthorizationViews {
        perm_users: Some("pyramid/perm_users".to_string()),
        ..Default::default()
    };
    let policy = CouchAuthorizationPolicy::with_views(Arc::new(store), views);

    let allowed = policy
        .principals_allowed_by_permission(&Context::default(), "superpowers")
        .unwrap();
    assert_eq!(allowed, principals(&["user:admin", "user:root", "group:administrators"]));
}

#[test]
fn principals_allowed_skips_disabled_directions() {
    let mut store = MemStore::default();
    store.insert("pyramid/perm_users", "superpowers", &["admin"]);
    store.insert("pyramid/perm_groups", "superpowers", &["administrators"]);
    // Default configuration leaves perm_users unset.
    let policy = CouchAuthorizationPolicy::new(Arc::new(store));

    let allowed = policy
        .principals_allowed_by_permission(&Context::default(), "superpowers")
        .unwrap();
    assert_eq!(allowed, principals(&["group:administrators"]));
}

#[test]
fn principals_allowed_for_unmapped_permission_is_empty() {
    let policy = CouchAuthorizationPolicy::new(Arc::new(group_perm_store()));
    let allowed = policy
        .principals_allowed_by_permission(&Context::default(), "godmode")
        .unwrap();
    assert!(allowed.is_empty());
}

#[test]
fn store_failures_propagate_unchanged() {
    let policy = CouchAuthorizationPolicy::new(Arc::new(FailingStore));
    let held = principals(&["group:administrators"]);

    assert!(policy.permits(&Context::default(), &held, "superpowers").is_err());
    assert!(policy
        .principals_allowed_by_permission(&Context::default(), "superpowers")
        .is_err());
}
