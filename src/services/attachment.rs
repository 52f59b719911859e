//! Attachment storage service
//!
//! Maps uploaded binaries to files under a per-category namespace directory
//! and owns their whole lifecycle: staging before the owning record is
//! persisted, and best-effort discarding when a record is replaced, deleted,
//! or a pipeline step fails.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::settings::{AttachmentCategory, StorageConfig};
use crate::models::workshop::{Attachment, UploadedFile};
use crate::utils::errors::{Result, SkillhubError};

/// MIME types accepted for attachments: images, PDFs, and common
/// office document formats.
const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Filesystem-backed attachment store.
///
/// No other component writes under the configured root; everything the
/// store reports in an [`Attachment`] record exists on disk.
#[derive(Clone)]
pub struct AttachmentStore {
    config: StorageConfig,
}

impl AttachmentStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Persist uploaded buffers under the category's namespace.
    ///
    /// Upload constraints (count, size, MIME allow-list) are re-checked
    /// here even though the transport filters them too. Fails with
    /// `Storage` if the medium is unwritable; any files already written
    /// in this call are discarded before the error is returned.
    pub async fn store(
        &self,
        category: AttachmentCategory,
        files: &[UploadedFile],
    ) -> Result<Vec<Attachment>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        self.check_limits(files)?;

        let namespace = self.config.namespace(category);
        let dir = self.config.root_dir.join(namespace);
        fs::create_dir_all(&dir).await?;

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let generated = generate_filename(&file.filename);
            let disk_path = dir.join(&generated);

            if let Err(err) = fs::write(&disk_path, &file.data).await {
                warn!(
                    path = %disk_path.display(),
                    error = %err,
                    "Failed to write attachment, discarding files staged in this call"
                );
                self.discard(&stored).await;
                return Err(SkillhubError::Storage(err));
            }

            debug!(
                filename = %file.filename,
                path = %disk_path.display(),
                size = file.size(),
                "Attachment stored"
            );

            stored.push(Attachment {
                filename: file.filename.clone(),
                path: format!("{}/{}", namespace, generated),
                mimetype: file.mimetype.clone(),
                size: file.size(),
            });
        }

        info!(count = stored.len(), namespace = namespace, "Attachments staged");
        Ok(stored)
    }

    /// Delete the underlying binaries for the given records.
    ///
    /// Idempotent and best-effort: a missing file is success, and any
    /// other I/O failure is logged and swallowed so cleanup never becomes
    /// the reason a mutation fails.
    pub async fn discard(&self, records: &[Attachment]) {
        if records.is_empty() {
            return;
        }

        let removals = records.iter().map(|record| {
            let disk_path = self.resolve(&record.path);
            async move {
                match fs::remove_file(&disk_path).await {
                    Ok(()) => {
                        debug!(path = %disk_path.display(), "Attachment discarded");
                    }
                    Err(err) if err.kind() == ErrorKind::NotFound => {
                        debug!(path = %disk_path.display(), "Attachment already gone");
                    }
                    Err(err) => {
                        warn!(
                            path = %disk_path.display(),
                            error = %err,
                            "Failed to discard attachment"
                        );
                    }
                }
            }
        });

        futures::future::join_all(removals).await;
    }

    /// Whether a stored record's binary is currently present on disk.
    pub async fn exists(&self, record: &Attachment) -> bool {
        fs::try_exists(self.resolve(&record.path))
            .await
            .unwrap_or(false)
    }

    /// Absolute path for a storage-relative locator.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.config.root_dir.join(path)
    }

    fn check_limits(&self, files: &[UploadedFile]) -> Result<()> {
        if files.len() > self.config.max_files_per_request {
            return Err(SkillhubError::Validation(format!(
                "Too many files: at most {} per request",
                self.config.max_files_per_request
            )));
        }

        for file in files {
            if file.size() > self.config.max_file_size {
                return Err(SkillhubError::Validation(format!(
                    "File {} exceeds the {} byte limit",
                    file.filename, self.config.max_file_size
                )));
            }
            if !ALLOWED_MIME_TYPES.contains(&file.mimetype.as_str()) {
                return Err(SkillhubError::Validation(
                    "Invalid file type. Only images, PDFs, and common document formats are allowed."
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Generate a collision-resistant stored name, keeping the original
/// extension. The result never equals the original filename.
fn generate_filename(original: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let entropy: u32 = rand::random();
    match Path::new(original).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{}-{}.{}", timestamp, entropy, ext),
        None => format!("{}-{}", timestamp, entropy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> AttachmentStore {
        let config = StorageConfig {
            root_dir: dir.path().to_path_buf(),
            ..StorageConfig::default()
        };
        AttachmentStore::new(config)
    }

    fn pdf(name: &str, bytes: usize) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            mimetype: "application/pdf".to_string(),
            data: vec![0u8; bytes],
        }
    }

    #[tokio::test]
    async fn test_store_and_discard_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let records = store
            .store(AttachmentCategory::Workshops, &[pdf("syllabus.pdf", 64)])
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "syllabus.pdf");
        assert_ne!(records[0].path, "workshops/syllabus.pdf");
        assert!(records[0].path.starts_with("workshops/"));
        assert!(records[0].path.ends_with(".pdf"));
        assert_eq!(records[0].size, 64);
        assert!(store.exists(&records[0]).await);

        store.discard(&records).await;
        assert!(!store.exists(&records[0]).await);
    }

    #[tokio::test]
    async fn test_discard_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let records = store
            .store(AttachmentCategory::Workshops, &[pdf("notes.pdf", 16)])
            .await
            .unwrap();

        store.discard(&records).await;
        // Second discard of the same records must not fail or panic.
        store.discard(&records).await;
        assert!(!store.exists(&records[0]).await);
    }

    #[tokio::test]
    async fn test_namespaces_are_separate() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let workshop_records = store
            .store(AttachmentCategory::Workshops, &[pdf("a.pdf", 8)])
            .await
            .unwrap();
        let post_records = store
            .store(AttachmentCategory::Posts, &[pdf("b.pdf", 8)])
            .await
            .unwrap();

        assert!(workshop_records[0].path.starts_with("workshops/"));
        assert!(post_records[0].path.starts_with("posts/"));
    }

    #[tokio::test]
    async fn test_disallowed_mime_type_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let file = UploadedFile {
            filename: "payload.exe".to_string(),
            mimetype: "application/x-msdownload".to_string(),
            data: vec![0u8; 8],
        };

        let result = store.store(AttachmentCategory::Workshops, &[file]).await;
        assert_matches!(result, Err(SkillhubError::Validation(_)));
    }

    #[tokio::test]
    async fn test_too_many_files_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let files: Vec<UploadedFile> = (0..6).map(|i| pdf(&format!("f{}.pdf", i), 8)).collect();
        let result = store.store(AttachmentCategory::Workshops, &files).await;
        assert_matches!(result, Err(SkillhubError::Validation(_)));
    }

    #[tokio::test]
    async fn test_oversized_file_rejected() {
        let dir = TempDir::new().unwrap();
        let mut config = StorageConfig::default();
        config.root_dir = dir.path().to_path_buf();
        config.max_file_size = 100;
        let store = AttachmentStore::new(config);

        let result = store
            .store(AttachmentCategory::Workshops, &[pdf("big.pdf", 101)])
            .await;
        assert_matches!(result, Err(SkillhubError::Validation(_)));
    }

    #[test]
    fn test_generated_name_never_matches_original() {
        let name = generate_filename("syllabus.pdf");
        assert_ne!(name, "syllabus.pdf");
        assert!(name.ends_with(".pdf"));

        let bare = generate_filename("README");
        assert_ne!(bare, "README");
    }
}
