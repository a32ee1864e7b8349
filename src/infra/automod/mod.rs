// Infra AutoMod module - store implementations for the core port.

pub mod in_memory;
pub mod sqlite_automod_store;

pub use in_memory::InMemoryAutomodStore;
pub use sqlite_automod_store::SqliteAutomodStore;
