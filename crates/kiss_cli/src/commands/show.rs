//! Show command.

use kiss_storage::{FileStore, Record, RecordStore, StorageKey};
use kiss_sync_server::ServerConfig;

/// Prints the record stored under `key` as pretty JSON.
pub fn run(config: &ServerConfig, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    match load(config, key)? {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => println!("no record for key {key:?} in {}", config.data_dir.display()),
    }
    Ok(())
}

/// Reads a record without creating the data directory.
fn load(config: &ServerConfig, key: &str) -> Result<Option<Record>, Box<dyn std::error::Error>> {
    let key = StorageKey::new(key)?;
    if !config.data_dir.is_dir() {
        return Err(format!("data directory {} does not exist", config.data_dir.display()).into());
    }
    let store = FileStore::new(config.data_dir.clone());
    Ok(store.get(&key)?)
}
