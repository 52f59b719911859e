//! Database repositories module
//!
//! This module contains the workshop persistence contract and its
//! implementations.

pub mod memory;
pub mod workshop;

// Re-export repositories
pub use memory::InMemoryWorkshopRepository;
pub use workshop::{PgWorkshopRepository, WorkshopRepository};
