//! TIDECACHE CLI
//!
//! Inspect and edit a snapshot file from the command line. The snapshot is
//! loaded into a store, the command runs against it, and mutating commands
//! write the snapshot back.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::time::Duration;
use tidecache::{Store, Value};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// TIDECACHE CLI - Snapshot Tool
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Snapshot file (created on first write)
    #[arg(short, long, default_value = "tidecache.json")]
    file: String,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the value at a key
    Get { key: String },
    /// Store a value (integer, JSON, or plain text)
    Set {
        key: String,
        value: String,
        /// Time-to-live in milliseconds (0 = never expire)
        #[arg(long, default_value_t = 0)]
        ttl_ms: u64,
    },
    /// Delete a key
    Del { key: String },
    /// Move a key to a new name
    Rename { old: String, new: String },
    /// Duplicate a key under <key>_copy
    Copy { key: String },
    /// Add to an integer value
    Incr {
        key: String,
        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        delta: i64,
    },
    /// Subtract from an integer value
    Decr {
        key: String,
        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        delta: i64,
    },
    /// Check whether any key holds a value
    Exists { value: String },
    /// Check whether a key is absent or expired
    Expired { key: String },
    /// Number of stored keys, including expired ones
    Count,
    /// List stored keys
    Keys,
    /// Remove every key
    Flush,
    /// Drop expired keys
    Sweep,
}

impl Cmd {
    fn mutates(&self) -> bool {
        matches!(
            self,
            Cmd::Set { .. }
                | Cmd::Del { .. }
                | Cmd::Rename { .. }
                | Cmd::Copy { .. }
                | Cmd::Incr { .. }
                | Cmd::Decr { .. }
                | Cmd::Flush
                | Cmd::Sweep
        )
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tidecache=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let path = Path::new(&args.file);

    let store = Store::default();
    if path.exists() {
        store
            .load_from_file(path)
            .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
    } else {
        info!("No snapshot at {}, starting empty", path.display());
    }

    let mutates = args.command.mutates();
    run(&store, args.command)?;

    if mutates {
        store
            .save_to_file(path)
            .with_context(|| format!("Failed to save snapshot {}", path.display()))?;
    }

    debug!("{}", store.stats().summary());
    Ok(())
}

fn run(store: &Store, cmd: Cmd) -> anyhow::Result<()> {
    match cmd {
        Cmd::Get { key } => match store.get(&key) {
            Some(value) => println!("{}", value),
            None => println!("(nil)"),
        },
        Cmd::Set { key, value, ttl_ms } => {
            store.set(key, parse_value(&value), Duration::from_millis(ttl_ms));
            println!("OK");
        }
        Cmd::Del { key } => {
            store.delete(&key)?;
            println!("OK");
        }
        Cmd::Rename { old, new } => {
            store.rename(&old, new)?;
            println!("OK");
        }
        Cmd::Copy { key } => {
            store.copy(&key)?;
            println!("OK");
        }
        Cmd::Incr { key, delta } => println!("{}", store.increment(&key, delta)?),
        Cmd::Decr { key, delta } => println!("{}", store.decrement(&key, delta)?),
        Cmd::Exists { value } => println!("{}", store.exist(&parse_value(&value))),
        Cmd::Expired { key } => println!("{}", store.expire(&key)),
        Cmd::Count => println!("{}", store.count()),
        Cmd::Keys => {
            let mut keys = store.keys();
            keys.sort();
            for key in keys {
                println!("{}", key);
            }
        }
        Cmd::Flush => {
            store.flush_all();
            println!("OK");
        }
        Cmd::Sweep => println!("{}", store.sweep_expired()),
    }
    Ok(())
}

/// Integer first, then JSON, then plain text
fn parse_value(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Int(i);
    }
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Value::from_json(json),
        Err(_) => Value::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), Value::Int(42));
        assert_eq!(parse_value("-3"), Value::Int(-3));
        assert_eq!(parse_value("hello"), Value::from("hello"));
        assert_eq!(parse_value("\"quoted\""), Value::from("quoted"));
        assert_eq!(parse_value("[1,2]"), Value::Data(json!([1, 2])));
        assert_eq!(parse_value("true"), Value::Data(json!(true)));
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from(["tidecache-cli", "--file", "x.json", "incr", "n", "-5"])
            .unwrap();
        assert_eq!(args.file, "x.json");
        assert!(matches!(args.command, Cmd::Incr { ref key, delta: -5 } if key == "n"));
        assert!(args.command.mutates());
    }
}
