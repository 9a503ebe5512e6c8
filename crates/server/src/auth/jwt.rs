use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Map, Value};

use blobvault_core::Profile;

use super::error::AuthError;

/// The only accepted signing algorithm.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Verifies HS256 bearer tokens and extracts the embedded [`Profile`].
///
/// Checks run in a fixed order and the first failure wins: structure,
/// signature, issuer, expiry, then the `profile` claim.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    leeway_seconds: u64,
}

impl TokenVerifier {
    pub fn new(secret: &SecretString, issuer: impl Into<String>) -> Self {
        // Only the signature is checked by the library. Claims are checked
        // below so each failure maps to its own error kind.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
            issuer: issuer.into(),
            leeway_seconds: 0,
        }
    }

    /// Tolerate `leeway_seconds` of clock skew on `exp`.
    #[must_use]
    pub fn with_leeway(mut self, leeway_seconds: u64) -> Self {
        self.leeway_seconds = leeway_seconds;
        self
    }

    /// The issuer tokens must carry.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Verify `token` against the current time.
    pub fn verify(&self, token: &str) -> Result<Profile, AuthError> {
        self.verify_at(token, jsonwebtoken::get_current_timestamp())
    }

    /// Verify `token` as of `now` (seconds since the Unix epoch).
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Profile, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let claims = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::InvalidSignature
                }
                _ => AuthError::MalformedToken,
            })?
            .claims;

        if claims.get("iss").and_then(Value::as_str) != Some(self.issuer.as_str()) {
            return Err(AuthError::IssuerMismatch);
        }

        let exp = claims
            .get("exp")
            .and_then(Value::as_u64)
            .ok_or(AuthError::InvalidClaim)?;
        if exp.saturating_add(self.leeway_seconds) < now {
            return Err(AuthError::Expired);
        }

        let profile: Profile = claims
            .get("profile")
            .cloned()
            .ok_or(AuthError::InvalidClaim)
            .and_then(|v| serde_json::from_value(v).map_err(|_| AuthError::InvalidClaim))?;
        if !profile.has_valid_login() {
            return Err(AuthError::InvalidClaim);
        }

        Ok(profile)
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("issuer", &self.issuer)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct IssuedClaims<'a> {
    iss: &'a str,
    iat: u64,
    exp: u64,
    profile: &'a Profile,
}

/// Mints HS256 tokens carrying `iss`, `iat`, `exp` and `profile` claims.
///
/// Used by the `issue-token` subcommand and in tests. Not exposed over HTTP.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    issuer: String,
}

impl TokenIssuer {
    pub fn new(secret: &SecretString, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            issuer: issuer.into(),
        }
    }

    /// Issue a token for `profile` valid for `ttl` from now.
    pub fn issue(
        &self,
        profile: &Profile,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(profile, jsonwebtoken::get_current_timestamp(), ttl)
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        profile: &Profile,
        now: u64,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = IssuedClaims {
            iss: &self.issuer,
            iat: now,
            exp: now.saturating_add(ttl.as_secs()),
            profile,
        };
        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
    }
}
