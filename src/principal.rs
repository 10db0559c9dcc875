//! Typed auth principals. Principals can be users, groups, or other entities;
//! the `kind:name` string form lets a principal carry its type with it.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Marker principal granted to every request, authenticated or not.
pub const EVERYONE: &str = "system.Everyone";

/// Marker principal granted to any request with a known remembered identity.
pub const AUTHENTICATED: &str = "system.Authenticated";

/// A typed identity reference serialized as `"<kind>:<name>"`.
///
/// Both fields are optional; an unset field renders as an empty string.
/// Equality is structural and the value is never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Principal {
    /// Construct with both fields set. `parse(p.to_string())` round-trips
    /// exactly for principals built this way.
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self { kind: Some(kind.into()), name: Some(name.into()) }
    }

    /// Parse a principal string, splitting at the first `:`.
    ///
    /// A string with no delimiter is the single-field convenience form: the
    /// whole input becomes `name` and `kind` stays unset. This is distinct
    /// from an explicit empty kind (`":bob"` parses to `kind = Some("")`),
    /// an asymmetry kept from the observed contract.
    pub fn parse(text: &str) -> Self {
        match text.split_once(':') {
            None => Self { kind: None, name: Some(text.to_string()) },
            Some((kind, name)) => Self {
                kind: Some(kind.to_string()),
                name: Some(name.to_string()),
            },
        }
    }

    /// Diagnostic form listing only the fields that are set, e.g.
    /// `Principal(kind='user', name='bob')`. Not for comparison or storage.
    pub fn debug_string(&self) -> String {
        let esc = |s: &str| s.replace('\'', "\\'");
        let mut params = Vec::new();
        if let Some(kind) = &self.kind {
            params.push(format!("kind='{}'", esc(kind)));
        }
        if let Some(name) = &self.name {
            params.push(format!("name='{}'", esc(name)));
        }
        format!("Principal({})", params.join(", "))
    }
}

impl Display for Principal {
    /// Canonical wire form. Always contains exactly one `:` so the format
    /// stays stable for round-tripping.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            self.kind.as_deref().unwrap_or(""),
            self.name.as_deref().unwrap_or("")
        )
    }
}

impl From<&str> for Principal {
    fn from(text: &str) -> Self {
        Principal::parse(text)
    }
}
