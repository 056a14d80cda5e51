//! TIDECACHE - In-Process TTL Cache
//!
//! A thread-safe key-value store with per-entry expiration, a cancellable
//! background sweeper and JSON snapshot dump/restore.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tidecache::{Store, Value};
//!
//! let store = Store::new(Duration::from_secs(300), Duration::from_secs(1));
//! store.set("hits", 0, Duration::ZERO);
//! store.increment("hits", 1).unwrap();
//! assert_eq!(store.get("hits"), Some(Value::Int(1)));
//! store.save_to_file("cache.json").unwrap();
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod persistence;
pub mod storage;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use metrics::{StatsSnapshot, StoreStats};
pub use storage::{Entry, Store, Value};
