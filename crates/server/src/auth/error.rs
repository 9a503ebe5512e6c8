use thiserror::Error;

/// Reasons a request failed authentication.
///
/// The variant is logged server-side only. Every kind yields the same 401
/// response so callers cannot tell which check rejected them.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token was presented.
    #[error("missing bearer credential")]
    MissingCredential,

    /// The token is not a well-formed compact JWT.
    #[error("malformed token")]
    MalformedToken,

    /// The signature does not verify with the configured secret and algorithm.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The `iss` claim is absent or differs from the expected issuer.
    #[error("token issuer mismatch")]
    IssuerMismatch,

    /// The `exp` claim is in the past.
    #[error("token expired")]
    Expired,

    /// The `exp` or `profile` claim is absent or cannot be decoded.
    #[error("invalid identity claim")]
    InvalidClaim,
}
