//! Skillhub workshop subsystem
//!
//! The registration and attachment-lifecycle core of the Skillhub booking
//! platform: capacity-bounded workshop registration, ownership-gated
//! mutations, and attachment storage tied to entity lifecycles with
//! rollback-on-failure semantics. Transport, credential parsing, and
//! multipart handling live outside this crate and hand in already-shaped
//! requests and verified requester identities.

pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{Result, SkillhubError};

// Re-export main components for easy access
pub use database::{InMemoryWorkshopRepository, PgWorkshopRepository, WorkshopRepository};
pub use models::{ApiResponse, Workshop, WorkshopStatus};
pub use services::{AttachmentStore, ServiceFactory, WorkshopService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
