//! Session-state, session and service-key stores

pub mod file;
pub mod memory;

pub use file::FileSessionStorage;
pub use memory::{InMemoryServiceKeyStore, InMemorySessionStorage, InMemorySessionStore};
