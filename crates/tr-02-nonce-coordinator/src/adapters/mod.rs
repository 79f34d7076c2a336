//! Storage adapters for the Nonce Coordinator

mod memory;
#[cfg(feature = "rocksdb")]
mod rocks;

pub use memory::MemoryNonceStorage;
#[cfg(feature = "rocksdb")]
pub use rocks::RocksNonceStorage;
