use serde::Deserialize;

/// Bearer token verification settings.
///
/// `jwt_secret` may be stored as an `ENC[AES256-GCM,...]` envelope, in which
/// case it is decrypted at startup with `BLOBVAULT_MASTER_KEY`.
///
/// # Example
///
/// ```toml
/// [auth]
/// jwt_secret = "ENC[AES256-GCM,data:...,iv:...,tag:...]"
/// issuer = "OctoGallery"
/// ```
#[derive(Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 signing secret (plaintext or encrypted envelope).
    pub jwt_secret: Option<String>,
    /// Expected `iss` claim.
    pub issuer: Option<String>,
    /// Clock skew tolerated on `exp`, in seconds.
    #[serde(default)]
    pub leeway_seconds: u64,
    /// Lifetime of tokens minted by `issue-token`, in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("issuer", &self.issuer)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            issuer: None,
            leeway_seconds: 0,
            token_ttl_seconds: default_token_ttl(),
        }
    }
}

fn default_token_ttl() -> u64 {
    86_400
}
