//! Error handling for Skillhub
//!
//! This module defines the main error type used throughout the workshop
//! subsystem and the HTTP status mapping for user-facing failures.

use thiserror::Error;

use crate::models::ids::{UserId, WorkshopId};
use crate::models::workshop::WorkshopStatus;

/// Main error type for Skillhub workshop operations
#[derive(Error, Debug)]
pub enum SkillhubError {
    #[error("{0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Workshop not found: {workshop_id}")]
    WorkshopNotFound { workshop_id: WorkshopId },

    #[error("Workshop is full")]
    WorkshopFull { workshop_id: WorkshopId },

    #[error("Already registered for this workshop")]
    AlreadyRegistered {
        workshop_id: WorkshopId,
        user_id: UserId,
    },

    #[error("Not registered for this workshop")]
    NotRegistered {
        workshop_id: WorkshopId,
        user_id: UserId,
    },

    #[error("Workshop is {status}, expected {expected}")]
    InvalidState {
        status: WorkshopStatus,
        expected: WorkshopStatus,
    },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition {
        from: WorkshopStatus,
        to: WorkshopStatus,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for Skillhub operations
pub type Result<T> = std::result::Result<T, SkillhubError>;

impl SkillhubError {
    /// HTTP status code for the error.
    ///
    /// Business-rule rejections are 400, ownership failures 403, missing
    /// workshops 404, and infrastructure failures 500.
    pub fn status_code(&self) -> u16 {
        match self {
            SkillhubError::Validation(_) => 400,
            SkillhubError::WorkshopFull { .. } => 400,
            SkillhubError::AlreadyRegistered { .. } => 400,
            SkillhubError::NotRegistered { .. } => 400,
            SkillhubError::InvalidState { .. } => 400,
            SkillhubError::InvalidStateTransition { .. } => 400,
            SkillhubError::Authorization(_) => 403,
            SkillhubError::WorkshopNotFound { .. } => 404,
            SkillhubError::Storage(_) => 500,
            SkillhubError::Persistence(_) => 500,
            SkillhubError::Migration(_) => 500,
            SkillhubError::Config(_) => 500,
        }
    }

    /// Whether the failure is an expected, user-facing outcome (4xx)
    /// rather than an infrastructure fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
