//! Snapshot Persistence
//!
//! Point-in-time dump of the entry map for data recovery.
//!
//! File format: one JSON object keyed by cache key, each value being
//! `{"value": <value>, "created": <RFC 3339>, "expiration": <unix ns, 0 = never>}`.

use hashbrown::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::storage::Entry;

/// Write a snapshot, truncating any existing file at `path`
pub fn save(path: &Path, entries: &HashMap<String, Entry>) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, entries)?;
    writer.flush()?;

    debug!(path = %path.display(), entries = entries.len(), "Snapshot written");
    Ok(())
}

/// Read a snapshot file into a fresh map
pub fn load(path: &Path) -> Result<HashMap<String, Entry>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let entries: HashMap<String, Entry> = serde_json::from_reader(reader)?;

    debug!(path = %path.display(), entries = entries.len(), "Snapshot read");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::Value;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_snapshot_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut entries = HashMap::new();
        entries.insert("key1".to_string(), Entry::new(Value::from("value1"), Duration::ZERO));
        entries.insert(
            "key2".to_string(),
            Entry::new(Value::Int(2), Duration::from_secs(3600)),
        );
        entries.insert(
            "key3".to_string(),
            Entry::new(Value::from(json!({"nested": [1, 2.5]})), Duration::ZERO),
        );

        save(&path, &entries).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded["key1"].value, Value::from("value1"));
        assert_eq!(loaded["key2"].expiration, entries["key2"].expiration);
        assert_eq!(loaded["key3"].value, entries["key3"].value);
        assert_eq!(loaded["key2"].created, entries["key2"].created);
    }

    #[test]
    fn test_snapshot_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut entries = HashMap::new();
        entries.insert("a".to_string(), Entry::new(Value::Int(5), Duration::ZERO));
        save(&path, &entries).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["a"]["value"], json!(5));
        assert_eq!(raw["a"]["expiration"], json!(0));
        assert!(raw["a"]["created"].is_string());
    }

    #[test]
    fn test_load_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{\"a\": {\"value\": 1,").unwrap();

        assert!(matches!(load(&path), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
