//! Password hashing facility with pluggable, name-tagged algorithms.
//!
//! Hashes produced by [`PasswordHasher`] carry their generating algorithm
//! prepended in `{}`'s, so multiple algorithms can coexist in storage and be
//! migrated over time. The algorithm registry is a closed, explicit map;
//! extending it means adding an entry, not relying on naming conventions.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::collections::HashMap;
use tracing::warn;

use argon2::{Argon2, PasswordHasher as _, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::error::{AuthError, Result};

/// Capability set every concrete hashing algorithm implements.
///
/// `verify` never fails: a malformed body simply compares unequal.
pub trait HashScheme: Send + Sync {
    /// Produce fresh random salt material appropriate to the algorithm,
    /// in the algorithm's transport encoding.
    fn generate_salt(&self) -> Result<String>;

    /// Hash a password, generating a salt first when none is given.
    fn hash(&self, password: &str, salt: Option<&str>) -> Result<String>;

    /// Compare a hash body against a cleartext password.
    fn verify(&self, body: &str, password: &str) -> bool;
}

/// Knobs forwarded to the underlying algorithm constructors. Algorithms
/// ignore options they have no use for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HasherOptions {
    /// Blowfish cost factor. Defaults to the bcrypt default cost.
    #[serde(default)]
    pub log_rounds: Option<u32>,
}

/// SHA-512 salted digest hashing.
///
/// Body format: `base64(salt) + ":" + base64(sha512(salt || password))`.
pub struct ShaHasher;

const SHA_SALT_LEN: usize = 32;

impl ShaHasher {
    fn hash_with_salt_bytes(&self, password: &str, salt: &[u8]) -> String {
        let mut digest = Sha512::new();
        digest.update(salt);
        digest.update(password.as_bytes());
        format!("{}:{}", B64.encode(salt), B64.encode(digest.finalize()))
    }
}

impl HashScheme for ShaHasher {
    /// 32 characters drawn from the printable ASCII range 33..=126.
    fn generate_salt(&self) -> Result<String> {
        let mut buf = [0u8; SHA_SALT_LEN];
        getrandom::getrandom(&mut buf).map_err(|e| AuthError::Salt(e.to_string()))?;
        Ok(buf.iter().map(|b| char::from(33 + b % 94)).collect())
    }

    fn hash(&self, password: &str, salt: Option<&str>) -> Result<String> {
        let salt = match salt {
            Some(s) => s.to_string(),
            None => self.generate_salt()?,
        };
        Ok(self.hash_with_salt_bytes(password, salt.as_bytes()))
    }

    fn verify(&self, body: &str, password: &str) -> bool {
        let Some((b64salt, _)) = body.split_once(':') else {
            return false;
        };
        let Ok(salt) = B64.decode(b64salt) else {
            return false;
        };
        self.hash_with_salt_bytes(password, &salt) == body
    }
}

/// Blowfish (bcrypt) adaptive hashing. The native hash string embeds the
/// algorithm version, cost, and salt.
pub struct BlowfishHasher {
    log_rounds: u32,
}

impl BlowfishHasher {
    pub fn new(log_rounds: Option<u32>) -> Self {
        Self { log_rounds: log_rounds.unwrap_or(bcrypt::DEFAULT_COST) }
    }

    fn salt_bytes() -> Result<[u8; 16]> {
        let mut buf = [0u8; 16];
        getrandom::getrandom(&mut buf).map_err(|e| AuthError::Salt(e.to_string()))?;
        Ok(buf)
    }
}

impl HashScheme for BlowfishHasher {
    /// Base64 of the 16 raw bytes consumed by bcrypt's native salt input.
    /// The transport encoding never appears in stored hashes.
    fn generate_salt(&self) -> Result<String> {
        Ok(B64.encode(Self::salt_bytes()?))
    }

    fn hash(&self, password: &str, salt: Option<&str>) -> Result<String> {
        let salt = match salt {
            Some(s) => {
                let bytes = B64
                    .decode(s)
                    .map_err(|e| AuthError::Hash(format!("invalid blowfish salt: {e}")))?;
                <[u8; 16]>::try_from(bytes.as_slice())
                    .map_err(|_| AuthError::Hash("blowfish salt must be 16 bytes".into()))?
            }
            None => Self::salt_bytes()?,
        };
        bcrypt::hash_with_salt(password, self.log_rounds, salt)
            .map(|parts| parts.format_for_version(bcrypt::Version::TwoB))
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// Recomputes via bcrypt's own salt-reuse path.
    fn verify(&self, body: &str, password: &str) -> bool {
        bcrypt::verify(password, body).unwrap_or(false)
    }
}

/// Argon2id hashing producing PHC strings (version, parameters, and salt
/// are all embedded in the body).
pub struct Argon2Hasher;

impl HashScheme for Argon2Hasher {
    fn generate_salt(&self) -> Result<String> {
        let mut buf = [0u8; 16];
        getrandom::getrandom(&mut buf).map_err(|e| AuthError::Salt(e.to_string()))?;
        let salt = SaltString::encode_b64(&buf).map_err(|e| AuthError::Salt(e.to_string()))?;
        Ok(salt.as_str().to_string())
    }

    fn hash(&self, password: &str, salt: Option<&str>) -> Result<String> {
        let salt = match salt {
            Some(s) => SaltString::from_b64(s)
                .map_err(|e| AuthError::Hash(format!("invalid argon2 salt: {e}")))?,
            None => {
                let generated = self.generate_salt()?;
                SaltString::from_b64(&generated).map_err(|e| AuthError::Salt(e.to_string()))?
            }
        };
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|phc| phc.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    fn verify(&self, body: &str, password: &str) -> bool {
        if let Ok(parsed) = PasswordHash::new(body) {
            Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
        } else {
            false
        }
    }
}

type SchemeFactory = fn(&HasherOptions) -> Box<dyn HashScheme>;

// Closed registry, keyed by lowercase algorithm name.
static SCHEMES: Lazy<HashMap<&'static str, SchemeFactory>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, SchemeFactory> = HashMap::new();
    m.insert("sha", |_| Box::new(ShaHasher));
    m.insert("blowfish", |opts| Box::new(BlowfishHasher::new(opts.log_rounds)));
    m.insert("argon2", |_| Box::new(Argon2Hasher));
    m
});

fn find_scheme(name: &str, options: &HasherOptions) -> Option<Box<dyn HashScheme>> {
    SCHEMES
        .get(name.to_ascii_lowercase().as_str())
        .map(|factory| factory(options))
}

/// Facade that tags hashes with their algorithm name and routes verification
/// by the tag found on the stored hash.
pub struct PasswordHasher {
    algorithm: String,
    options: HasherOptions,
    scheme: Box<dyn HashScheme>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("algorithm", &self.algorithm)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Resolve `algorithm` (case-insensitive) against the registry. An
    /// unknown name fails here, not at first use.
    pub fn new(algorithm: &str, options: HasherOptions) -> Result<Self> {
        let name = algorithm.to_ascii_lowercase();
        let scheme = find_scheme(&name, &options)
            .ok_or_else(|| AuthError::UnsupportedAlgorithm(algorithm.to_string()))?;
        Ok(Self { algorithm: name, options, scheme })
    }

    /// The configured default algorithm name (lowercase, as tagged).
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn generate_salt(&self) -> Result<String> {
        self.scheme.generate_salt()
    }

    /// Hash a password, tagging the result with the configured algorithm.
    pub fn hash(&self, password: &str, salt: Option<&str>) -> Result<String> {
        Ok(format!("{{{}}}{}", self.algorithm, self.scheme.hash(password, salt)?))
    }

    /// Compare a tagged hash against a cleartext password.
    ///
    /// The tag on the stored hash is authoritative: a hash tagged with a
    /// different registered algorithm verifies with that algorithm, not the
    /// configured default. An unresolvable tag fails closed. A hash with no
    /// recognizable `{...}` prefix is legacy material verified with the
    /// configured default, the whole string taken as the body.
    pub fn verify(&self, crypthash: &str, password: &str) -> bool {
        if let Some(rest) = crypthash.strip_prefix('{') {
            if let Some((name, body)) = rest.split_once('}') {
                return match find_scheme(name, &self.options) {
                    Some(scheme) => scheme.verify(body, password),
                    None => {
                        warn!("hasher.verify unknown algorithm tag={}", name);
                        false
                    }
                };
            }
        }
        self.scheme.verify(crypthash, password)
    }
}
