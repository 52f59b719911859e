//! Shared test infrastructure
//!
//! Builds a full workshop service against the in-memory repository and a
//! temp-dir attachment store, so scenario tests exercise the real pipeline
//! without external services.

pub mod test_data;

use std::sync::Arc;

use tempfile::TempDir;

use skillhub::config::StorageConfig;
use skillhub::database::repositories::InMemoryWorkshopRepository;
use skillhub::services::{AttachmentStore, WorkshopService};

pub use test_data::*;

/// A complete service wired to throwaway backends.
pub struct TestContext {
    pub service: WorkshopService,
    pub repository: Arc<InMemoryWorkshopRepository>,
    pub store: AttachmentStore,
    // Held so the storage root outlives the test body.
    _temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp storage dir");
        let config = StorageConfig {
            root_dir: temp_dir.path().to_path_buf(),
            ..StorageConfig::default()
        };

        let repository = Arc::new(InMemoryWorkshopRepository::new());
        let store = AttachmentStore::new(config);
        let service = WorkshopService::new(repository.clone(), store.clone());

        Self {
            service,
            repository,
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Count of files currently present under the storage root, across
    /// all namespaces.
    pub fn files_on_disk(&self) -> usize {
        fn walk(dir: &std::path::Path) -> usize {
            let mut count = 0;
            if let Ok(entries) = std::fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.is_dir() {
                        count += walk(&path);
                    } else {
                        count += 1;
                    }
                }
            }
            count
        }
        walk(self._temp_dir.path())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
