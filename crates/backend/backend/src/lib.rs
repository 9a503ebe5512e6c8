pub mod backend;
pub mod error;
pub mod testing;

pub use backend::ObjectBackend;
pub use error::BackendError;
