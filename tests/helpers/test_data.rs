//! Test data builders

use chrono::{Duration, Utc};
use fake::faker::lorem::en::{Sentence, Word};
use fake::Fake;

use skillhub::models::workshop::{CreateWorkshopRequest, UploadedFile, WorkshopLevel};

/// A valid creation request with a given capacity.
pub fn create_request(max_participants: i32) -> CreateWorkshopRequest {
    CreateWorkshopRequest {
        title: format!("{} workshop", Word().fake::<String>()),
        description: Sentence(4..9).fake(),
        date: Utc::now() + Duration::days(14),
        time: "18:30".to_string(),
        duration: "2h".to_string(),
        max_participants,
        price: 20.0,
        level: WorkshopLevel::Beginner,
        category_id: None,
        location: Some("Studio One".to_string()),
        requirements: vec!["Comfortable shoes".to_string()],
    }
}

/// An uploaded PDF buffer with the given display name.
pub fn uploaded_pdf(name: &str) -> UploadedFile {
    UploadedFile {
        filename: name.to_string(),
        mimetype: "application/pdf".to_string(),
        data: b"%PDF-1.4 test payload".to_vec(),
    }
}

/// An uploaded PNG buffer.
pub fn uploaded_png(name: &str) -> UploadedFile {
    UploadedFile {
        filename: name.to_string(),
        mimetype: "image/png".to_string(),
        data: vec![0x89, 0x50, 0x4E, 0x47, 0, 0, 0, 0],
    }
}
