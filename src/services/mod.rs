//! Services module
//!
//! This module contains business logic services

pub mod attachment;
pub mod workshop;

// Re-export commonly used services
pub use attachment::AttachmentStore;
pub use workshop::WorkshopService;

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::database::repositories::WorkshopRepository;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub workshop_service: WorkshopService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: Settings, repository: Arc<dyn WorkshopRepository>) -> Self {
        let attachment_store = AttachmentStore::new(settings.storage.clone());
        let workshop_service = WorkshopService::new(repository, attachment_store);

        Self { workshop_service }
    }
}
