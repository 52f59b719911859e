//! Outbound response envelope
//!
//! Every pipeline operation answers with the same stable shape, success or
//! failure, so clients never see partial state.

use serde::{Deserialize, Serialize};

use crate::utils::errors::SkillhubError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: &SkillhubError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }

    /// Fold a pipeline result into the envelope plus its HTTP status.
    ///
    /// `created` selects 201 over 200 for successful creation.
    pub fn from_result(
        result: Result<T, SkillhubError>,
        created: bool,
    ) -> (u16, Self) {
        match result {
            Ok(data) => (if created { 201 } else { 200 }, Self::ok(data)),
            Err(ref error) => (error.status_code(), Self::err(error)),
        }
    }
}
