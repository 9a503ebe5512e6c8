//! Identity-scoped store/retrieve pipeline between the HTTP layer and an
//! [`ObjectBackend`](blobvault_backend::ObjectBackend).

pub mod builder;
pub mod error;
pub mod gateway;
pub mod retry;

pub use builder::GatewayBuilder;
pub use error::GatewayError;
pub use gateway::BlobGateway;
pub use retry::RetryPolicy;
