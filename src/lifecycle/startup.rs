//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the song store described by the configuration
//! - Seed the sample catalogue into an empty store when asked to
//!
//! # Design Decisions
//! - Fail fast: an unreadable song file stops startup before anything binds

use crate::config::StoreConfig;
use crate::store::{MemorySongStore, StoreError};

/// Open the song store, loading the configured file and seeding if empty.
pub fn open_store(config: &StoreConfig) -> Result<MemorySongStore, StoreError> {
    let store = match &config.path {
        Some(path) => MemorySongStore::load_from_file(path)?,
        None => MemorySongStore::new(),
    };

    if config.seed_if_empty && store.prepopulate_if_empty() > 0 {
        store.save_to_file()?;
    }

    tracing::info!(songs = store.len(), path = ?config.path, "Song store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_is_seeded_by_default() {
        let store = open_store(&StoreConfig::default()).unwrap();
        assert!(!store.is_empty());
    }

    #[test]
    fn seeding_can_be_disabled() {
        let config = StoreConfig {
            path: None,
            seed_if_empty: false,
        };
        assert!(open_store(&config).unwrap().is_empty());
    }

    #[test]
    fn seeded_file_is_written_out() {
        let path = std::env::temp_dir().join(format!("bard-seed-{}.json", uuid::Uuid::new_v4()));
        let config = StoreConfig {
            path: Some(path.to_string_lossy().into_owned()),
            seed_if_empty: true,
        };
        let seeded = open_store(&config).unwrap().len();
        assert!(path.exists());

        let reopened = open_store(&config).unwrap();
        assert_eq!(reopened.len(), seeded);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn corrupt_file_fails_startup() {
        let path = std::env::temp_dir().join(format!("bard-bad-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "{ not json").unwrap();
        let config = StoreConfig {
            path: Some(path.to_string_lossy().into_owned()),
            seed_if_empty: true,
        };
        assert!(matches!(open_store(&config), Err(StoreError::Json(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
