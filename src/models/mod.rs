//! Data models module

pub mod ids;
pub mod response;
pub mod workshop;

pub use ids::{CategoryId, UserId, WorkshopId};
pub use response::ApiResponse;
pub use workshop::{
    Attachment, CreateWorkshopRequest, UpdateWorkshopRequest, UploadedFile, Workshop,
    WorkshopLevel, WorkshopStatus,
};
