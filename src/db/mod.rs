pub mod kv;
pub mod repository;

pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};
pub use repository::{Preferences, SessionStore, schedule_key};
