//! Workshop service implementation
//!
//! The mutation pipeline for workshops: validation, ownership
//! authorization, persistence, and attachment side effects, in that
//! order, with compensating attachment cleanup whenever a later step
//! fails. No uploaded file survives a failed mutation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::settings::AttachmentCategory;
use crate::database::repositories::WorkshopRepository;
use crate::models::ids::{UserId, WorkshopId};
use crate::models::workshop::{
    Attachment, CreateWorkshopRequest, UpdateWorkshopRequest, UploadedFile, Workshop,
    WorkshopStatus,
};
use crate::services::attachment::AttachmentStore;
use crate::utils::errors::{Result, SkillhubError};

/// Workshop service orchestrating repository and attachment store.
#[derive(Clone)]
pub struct WorkshopService {
    repository: Arc<dyn WorkshopRepository>,
    attachments: AttachmentStore,
}

impl WorkshopService {
    pub fn new(repository: Arc<dyn WorkshopRepository>, attachments: AttachmentStore) -> Self {
        Self {
            repository,
            attachments,
        }
    }

    /// Create a workshop owned by `requester`.
    ///
    /// Fields are validated before anything touches disk; staged files
    /// are discarded again if persistence fails afterwards.
    pub async fn create_workshop(
        &self,
        request: CreateWorkshopRequest,
        files: Vec<UploadedFile>,
        requester: UserId,
    ) -> Result<Workshop> {
        debug!(instructor = %requester, title = %request.title, "Creating workshop");
        request.validate()?;

        let staged = self
            .attachments
            .store(AttachmentCategory::Workshops, &files)
            .await?;

        let workshop = Workshop::from_request(request, requester, staged.clone());
        match self.repository.create(&workshop).await {
            Ok(created) => {
                info!(
                    workshop_id = %created.id,
                    instructor = %requester,
                    attachment_count = created.attachments.len(),
                    "Workshop created"
                );
                Ok(created)
            }
            Err(err) => {
                warn!(
                    workshop_id = %workshop.id,
                    error = %err,
                    "Workshop creation failed after staging, discarding staged attachments"
                );
                self.attachments.discard(&staged).await;
                Err(err)
            }
        }
    }

    /// Apply a partial update to a workshop owned by `requester`.
    ///
    /// When `files` is non-empty the new set replaces the previous
    /// attachments entirely; the previous binaries are only discarded
    /// after the new ones are safely staged.
    pub async fn update_workshop(
        &self,
        id: WorkshopId,
        request: UpdateWorkshopRequest,
        files: Vec<UploadedFile>,
        requester: UserId,
    ) -> Result<Workshop> {
        debug!(workshop_id = %id, requester = %requester, "Updating workshop");

        let workshop = self.load(id).await?;
        self.ensure_instructor(&workshop, requester, "update")?;
        request.validate()?;

        let replacement = if files.is_empty() {
            None
        } else {
            let staged = self
                .attachments
                .store(AttachmentCategory::Workshops, &files)
                .await?;
            // Replace, never merge: the old binaries go away only now
            // that the new set is on disk.
            self.attachments.discard(&workshop.attachments).await;
            Some(staged)
        };

        match self
            .repository
            .update(id, &request, replacement.as_deref())
            .await
        {
            Ok(updated) => {
                info!(
                    workshop_id = %id,
                    replaced_attachments = replacement.is_some(),
                    "Workshop updated"
                );
                Ok(updated)
            }
            Err(err) => {
                if let Some(ref staged) = replacement {
                    warn!(
                        workshop_id = %id,
                        error = %err,
                        "Workshop update failed after staging, discarding staged attachments"
                    );
                    self.attachments.discard(staged).await;
                }
                Err(err)
            }
        }
    }

    /// Delete a workshop owned by `requester`, cascading its attachments.
    ///
    /// Attachment cleanup is best-effort; the record deletion is the
    /// committed outcome even if a binary could not be removed.
    pub async fn delete_workshop(&self, id: WorkshopId, requester: UserId) -> Result<()> {
        debug!(workshop_id = %id, requester = %requester, "Deleting workshop");

        let workshop = self.load(id).await?;
        self.ensure_instructor(&workshop, requester, "delete")?;

        self.attachments.discard(&workshop.attachments).await;
        self.repository.delete(id).await?;

        info!(workshop_id = %id, instructor = %requester, "Workshop deleted");
        Ok(())
    }

    /// Register `user_id` for a workshop.
    ///
    /// Capacity, uniqueness, and status are enforced atomically by the
    /// repository; seats go in first-come-first-served order.
    pub async fn register(&self, id: WorkshopId, user_id: UserId) -> Result<Workshop> {
        let workshop = self.repository.register_participant(id, user_id).await?;
        info!(
            workshop_id = %id,
            user_id = %user_id,
            participants = workshop.participants.len(),
            max_participants = workshop.max_participants,
            "User registered for workshop"
        );
        Ok(workshop)
    }

    /// Cancel an existing registration.
    pub async fn cancel_registration(&self, id: WorkshopId, user_id: UserId) -> Result<Workshop> {
        let workshop = self.repository.remove_participant(id, user_id).await?;
        info!(
            workshop_id = %id,
            user_id = %user_id,
            participants = workshop.participants.len(),
            "Workshop registration cancelled"
        );
        Ok(workshop)
    }

    /// Move a workshop to a new lifecycle status (instructor only).
    pub async fn update_status(
        &self,
        id: WorkshopId,
        status: WorkshopStatus,
        requester: UserId,
    ) -> Result<Workshop> {
        let workshop = self.load(id).await?;
        self.ensure_instructor(&workshop, requester, "update")?;

        let updated = self.repository.set_status(id, status).await?;
        info!(workshop_id = %id, from = %workshop.status, to = %status, "Workshop status changed");
        Ok(updated)
    }

    /// Fetch a single workshop.
    pub async fn get_workshop(&self, id: WorkshopId) -> Result<Workshop> {
        self.load(id).await
    }

    /// Upcoming workshops, soonest first.
    pub async fn list_upcoming(&self) -> Result<Vec<Workshop>> {
        self.repository.list_upcoming().await
    }

    /// Workshops hosted by an instructor.
    pub async fn list_hosted_by(&self, instructor: UserId) -> Result<Vec<Workshop>> {
        self.repository.list_by_instructor(instructor).await
    }

    /// Attachment records currently retained for a workshop.
    pub async fn stored_attachments(&self, id: WorkshopId) -> Result<Vec<Attachment>> {
        Ok(self.load(id).await?.attachments)
    }

    async fn load(&self, id: WorkshopId) -> Result<Workshop> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(SkillhubError::WorkshopNotFound { workshop_id: id })
    }

    fn ensure_instructor(
        &self,
        workshop: &Workshop,
        requester: UserId,
        action: &str,
    ) -> Result<()> {
        if !workshop.is_instructor(requester) {
            warn!(
                workshop_id = %workshop.id,
                requester = %requester,
                instructor = %workshop.instructor,
                action = action,
                "Rejected mutation by non-instructor"
            );
            return Err(SkillhubError::Authorization(format!(
                "Not authorized to {} this workshop",
                action
            )));
        }
        Ok(())
    }
}
