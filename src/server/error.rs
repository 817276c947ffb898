//! Error envelope for request-parameter failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Endpoint family an error is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Internal,
    ImageSearch,
    ImageGeneration,
    Save,
}

impl ErrorStage {
    fn prefix(&self) -> &'static str {
        match self {
            ErrorStage::Internal => "Internal server",
            ErrorStage::ImageSearch => "Image search",
            ErrorStage::ImageGeneration => "Image generation",
            ErrorStage::Save => "Save",
        }
    }
}

/// Rendered as `500 {"detail": "<stage> error: <message>"}`.
#[derive(Debug)]
pub struct ApiError {
    stage: ErrorStage,
    message: String,
}

impl ApiError {
    pub fn new(stage: ErrorStage, message: impl fmt::Display) -> Self {
        Self {
            stage,
            message: message.to_string(),
        }
    }

    pub fn detail(&self) -> String {
        format!("{} error: {}", self.stage.prefix(), self.message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(detail = %self.detail(), "Rejected request");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": self.detail() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_carries_stage_prefix() {
        assert_eq!(
            ApiError::new(ErrorStage::Internal, "bad body").detail(),
            "Internal server error: bad body"
        );
        assert_eq!(
            ApiError::new(ErrorStage::ImageSearch, "x").detail(),
            "Image search error: x"
        );
        assert_eq!(
            ApiError::new(ErrorStage::ImageGeneration, "x").detail(),
            "Image generation error: x"
        );
        assert_eq!(ApiError::new(ErrorStage::Save, "x").detail(), "Save error: x");
    }

    #[tokio::test]
    async fn renders_500_json() {
        let response = ApiError::new(ErrorStage::Save, "nope").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "Save error: nope");
    }
}
