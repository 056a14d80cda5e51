//! Persistence Module
//!
//! JSON snapshot dump and restore.

pub mod snapshot;
