pub mod file;
pub mod kv;
pub mod memory;

pub use file::FileStore;
pub use kv::{keys, KeyValueStore, Storage, StoreError};
pub use memory::MemoryStore;
