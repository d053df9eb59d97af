#![forbid(unsafe_code)]

pub mod persistence;
pub mod repository;
pub mod snapshot;
pub mod sqlite;

pub use persistence::{SESSION_KEY, SessionPersistence};
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
pub use snapshot::{SessionSnapshot, SnapshotError, restore_state};
