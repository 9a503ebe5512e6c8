//! Stateless bearer-token authentication.

pub mod error;
pub mod identity;
pub mod jwt;
pub mod middleware;

pub use error::AuthError;
pub use identity::IdentityContext;
pub use jwt::{TokenIssuer, TokenVerifier};
pub use middleware::AuthLayer;
