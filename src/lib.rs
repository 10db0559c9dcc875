//! Authentication and authorization policies backed by a document database's
//! indexed views, plus an independent multi-algorithm password hasher.
//!
//! The database client and the cookie/session identity mechanism stay outside
//! this crate; they are reached through the [`ViewStore`] and [`Identifier`]
//! capability traits. Keep the public surface thin and split implementation
//! across sub-modules.

pub mod authentication;
pub mod authorization;
pub mod error;
pub mod hasher;
pub mod identify;
pub mod principal;
pub mod store;

pub use authentication::{AuthenticationPolicy, AuthenticationViews, CouchAuthenticationPolicy};
pub use authorization::{AuthorizationPolicy, AuthorizationViews, Context, CouchAuthorizationPolicy};
pub use error::AuthError;
pub use hasher::{Argon2Hasher, BlowfishHasher, HashScheme, HasherOptions, PasswordHasher, ShaHasher};
pub use identify::{HeaderPair, Identifier, RememberOptions};
pub use principal::{Principal, AUTHENTICATED, EVERYONE};
pub use store::{ViewRow, ViewStore};
