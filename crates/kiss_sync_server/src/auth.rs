//! Credential derivation and verification.
//!
//! Both credentials are derived from the shared `APP_KEY`:
//!
//! ```text
//! token = hex(sha256(app_key || salt))
//! ```
//!
//! with a distinct salt per [`Purpose`], so the public rules-sharing token
//! reveals nothing about the sync token.
//!
//! Presented tokens are compared against the expected digest in constant
//! time.

use crate::error::{ServerError, ServerResult};
use hmac::digest::{CtOutput, Output};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::warn;

/// Salt for the `/sync` bearer token.
pub const SYNC_SALT: &str = "KISS-Translator-SYNC";

/// Salt for the `/rules` share token.
pub const SHARE_SALT: &str = "KISS-Translator-SHARE";

/// Prefix of the `Authorization` header value.
pub const BEARER_PREFIX: &str = "Bearer ";

/// What a derived credential is good for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Read/write access to `/sync`.
    Sync,
    /// Read access to the shared rules via `/rules`.
    Share,
}

impl Purpose {
    /// Returns the salt mixed into tokens for this purpose.
    #[must_use]
    pub fn salt(self) -> &'static str {
        match self {
            Purpose::Sync => SYNC_SALT,
            Purpose::Share => SHARE_SALT,
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Purpose::Sync => f.write_str("sync"),
            Purpose::Share => f.write_str("share"),
        }
    }
}

fn digest(secret: &str, purpose: Purpose) -> Output<Sha256> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(purpose.salt().as_bytes());
    hasher.finalize()
}

/// Derives the token for `purpose` from `secret`.
///
/// Returns the lowercase hex encoding of `sha256(secret || salt)`.
#[must_use]
pub fn derive_token(secret: &str, purpose: Purpose) -> String {
    hex::encode(digest(secret, purpose))
}

/// Verifies presented tokens against the configured secret.
///
/// Expected digests are computed once at construction.
#[derive(Clone)]
pub struct TokenValidator {
    sync: Output<Sha256>,
    share: Output<Sha256>,
}

impl TokenValidator {
    /// Creates a validator for `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            sync: digest(secret, Purpose::Sync),
            share: digest(secret, Purpose::Share),
        }
    }

    fn expected(&self, purpose: Purpose) -> &Output<Sha256> {
        match purpose {
            Purpose::Sync => &self.sync,
            Purpose::Share => &self.share,
        }
    }

    /// Returns the token a client must present for `purpose`.
    #[must_use]
    pub fn token(&self, purpose: Purpose) -> String {
        hex::encode(self.expected(purpose))
    }

    /// Checks a raw token for `purpose`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AuthenticationFailed`] if the token is missing,
    /// malformed, or does not match.
    pub fn verify(&self, purpose: Purpose, presented: Option<&str>) -> ServerResult<()> {
        let Some(presented) = presented else {
            warn!(%purpose, "missing credential");
            return Err(ServerError::AuthenticationFailed);
        };

        let matches = match hex::decode(presented) {
            Ok(bytes) if bytes.len() == <Sha256 as Digest>::output_size() => {
                let presented = CtOutput::<Sha256>::new(Output::<Sha256>::clone_from_slice(&bytes));
                presented == CtOutput::new(self.expected(purpose).clone())
            }
            _ => false,
        };

        if matches {
            Ok(())
        } else {
            warn!(%purpose, "invalid credential");
            Err(ServerError::AuthenticationFailed)
        }
    }

    /// Checks an `Authorization: Bearer <token>` header value for `purpose`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AuthenticationFailed`] if the header is
    /// missing, lacks the `Bearer ` prefix, or carries the wrong token.
    pub fn verify_bearer(&self, purpose: Purpose, header: Option<&str>) -> ServerResult<()> {
        let token = header.and_then(|value| value.strip_prefix(BEARER_PREFIX));
        if header.is_some() && token.is_none() {
            warn!(%purpose, "authorization header is not a bearer token");
            return Err(ServerError::AuthenticationFailed);
        }
        self.verify(purpose, token)
    }
}

impl fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenValidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic_hex() {
        let token = derive_token("123456", Purpose::Sync);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(token, derive_token("123456", Purpose::Sync));
    }

    #[test]
    fn derive_matches_concatenated_digest() {
        let expected = hex::encode(Sha256::digest(b"123456KISS-Translator-SYNC"));
        assert_eq!(derive_token("123456", Purpose::Sync), expected);

        let expected = hex::encode(Sha256::digest(b"123456KISS-Translator-SHARE"));
        assert_eq!(derive_token("123456", Purpose::Share), expected);
    }

    #[test]
    fn purposes_produce_different_tokens() {
        assert_ne!(
            derive_token("secret", Purpose::Sync),
            derive_token("secret", Purpose::Share)
        );
    }

    #[test]
    fn validator_accepts_own_tokens() {
        let validator = TokenValidator::new("secret");
        let sync = derive_token("secret", Purpose::Sync);
        let share = derive_token("secret", Purpose::Share);

        assert_eq!(validator.token(Purpose::Sync), sync);
        assert!(validator.verify(Purpose::Sync, Some(&sync)).is_ok());
        assert!(validator.verify(Purpose::Share, Some(&share)).is_ok());
    }

    #[test]
    fn reject_wrong_purpose() {
        let validator = TokenValidator::new("secret");
        let share = derive_token("secret", Purpose::Share);
        assert!(matches!(
            validator.verify(Purpose::Sync, Some(&share)),
            Err(ServerError::AuthenticationFailed)
        ));
    }

    #[test]
    fn reject_wrong_secret() {
        let validator = TokenValidator::new("secret");
        let other = derive_token("other", Purpose::Sync);
        assert!(validator.verify(Purpose::Sync, Some(&other)).is_err());
    }

    #[test]
    fn reject_malformed() {
        let validator = TokenValidator::new("secret");
        assert!(validator.verify(Purpose::Sync, None).is_err());
        assert!(validator.verify(Purpose::Sync, Some("")).is_err());
        assert!(validator.verify(Purpose::Sync, Some("zz")).is_err());
        assert!(validator.verify(Purpose::Sync, Some("abcd")).is_err());
    }

    #[test]
    fn bearer_header() {
        let validator = TokenValidator::new("secret");
        let token = validator.token(Purpose::Sync);

        let header = format!("Bearer {token}");
        assert!(validator.verify_bearer(Purpose::Sync, Some(&header)).is_ok());
        assert!(validator.verify_bearer(Purpose::Sync, Some(&token)).is_err());
        assert!(validator.verify_bearer(Purpose::Sync, None).is_err());
    }

    #[test]
    fn debug_hides_digests() {
        let validator = TokenValidator::new("secret");
        let debug = format!("{validator:?}");
        assert!(!debug.contains(&validator.token(Purpose::Sync)));
    }
}
