//! Storage Engine
//!
//! In-memory key-value store with TTL support.

mod entry;
mod store;
mod sweeper;
mod value;

pub use entry::{now_nanos, unix_nanos, Entry};
pub use store::Store;
pub use value::Value;
