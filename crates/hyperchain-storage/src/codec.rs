//! Record codec
//!
//! Records are bincode-encoded. A record that fails to decode means the
//! store is corrupt; that aborts the block instead of becoming a user error.

use crate::StateStore;
use hyperchain_core::{HyperchainError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode a record
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| HyperchainError::Codec(e.to_string()))
}

/// Decode a record, reporting failure as an error
pub fn try_decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| HyperchainError::Codec(e.to_string()))
}

/// Decode a stored record; corruption is fatal
pub fn decode_stored<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> T {
    match bincode::deserialize(bytes) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(key = ?key, error = %e, "corrupt record in module store");
            panic!("corrupt record under key {:?}: {}", key, e);
        }
    }
}

/// Load and decode the record under `key`
pub fn load<T: DeserializeOwned>(store: &dyn StateStore, key: &[u8]) -> Option<T> {
    store.get(key).map(|bytes| decode_stored(key, &bytes))
}

/// Encode and write `value` under `key`
pub fn save<T: Serialize>(store: &mut dyn StateStore, key: Vec<u8>, value: &T) -> Result<()> {
    let bytes = encode(value)?;
    store.put(key, bytes);
    Ok(())
}

/// Decode every record under `prefix`, in key order
pub fn load_prefix<T: DeserializeOwned>(store: &dyn StateStore, prefix: &[u8]) -> Vec<T> {
    store
        .prefix_iterate(prefix)
        .into_iter()
        .map(|(key, bytes)| decode_stored(&key, &bytes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        id: String,
        count: u64,
        tags: Vec<String>,
    }

    fn record(id: &str) -> Record {
        Record {
            id: id.to_string(),
            count: 7,
            tags: vec!["a".into(), "b".into()],
        }
    }

    #[test]
    fn test_save_load() {
        let mut store = MemStore::new();
        save(&mut store, b"r/1".to_vec(), &record("1")).unwrap();

        let loaded: Option<Record> = load(&store, b"r/1");
        assert_eq!(loaded, Some(record("1")));

        let missing: Option<Record> = load(&store, b"r/2");
        assert!(missing.is_none());
    }

    #[test]
    fn test_encoding_is_stable() {
        let bytes = encode(&record("x")).unwrap();
        let back: Record = try_decode(&bytes).unwrap();
        assert_eq!(encode(&back).unwrap(), bytes);
    }

    #[test]
    fn test_load_prefix() {
        let mut store = MemStore::new();
        save(&mut store, b"r/2".to_vec(), &record("2")).unwrap();
        save(&mut store, b"r/1".to_vec(), &record("1")).unwrap();

        let all: Vec<Record> = load_prefix(&store, b"r/");
        assert_eq!(all, vec![record("1"), record("2")]);
    }

    #[test]
    fn test_try_decode_rejects_garbage() {
        assert!(try_decode::<Record>(&[0xff]).is_err());
    }

    #[test]
    #[should_panic(expected = "corrupt record")]
    fn test_corrupt_record_is_fatal() {
        let mut store = MemStore::new();
        store.put(b"r/bad".to_vec(), vec![0xff]);
        let _: Option<Record> = load(&store, b"r/bad");
    }
}
