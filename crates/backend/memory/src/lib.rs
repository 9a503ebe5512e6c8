mod store;

pub use store::MemoryBackend;
