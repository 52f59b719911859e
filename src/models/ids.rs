//! Opaque identifiers
//!
//! Workshops, users, and categories are referenced by opaque UUIDs wrapped
//! in distinct newtypes so that ownership checks are typed equality and an
//! id of one kind can never stand in for another.

use serde::{Deserialize, Serialize};
use sqlx::Type;
use uuid::Uuid;

/// Identity of a workshop, assigned at creation, immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(transparent)]
pub struct WorkshopId(pub Uuid);

/// Identity of a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(transparent)]
pub struct UserId(pub Uuid);

/// Identity of a workshop category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(transparent)]
pub struct CategoryId(pub Uuid);

impl WorkshopId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl CategoryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkshopId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorkshopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
