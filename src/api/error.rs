//! Unified API error handling
//!
//! Every analysis endpoint answers failures with the same `ErrorResponse` body.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::service::{AnalysisError, PipelineError};

/// Standard error response format
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Failure kind (validation_failure, acquisition_failure, ...)
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
    /// Suggestions the caller can act on
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Invalid caller input (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// No usable document could be acquired (422)
    #[error("{message}")]
    Acquisition { message: String, hints: Vec<String> },

    /// An analysis task failed (502)
    #[error("Analysis failed: {0}")]
    TaskFailure(String),

    /// Reasoning credential missing (503)
    #[error("{message}")]
    NotConfigured { message: String, hints: Vec<String> },

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "validation_failure",
            ApiError::Acquisition { .. } => "acquisition_failure",
            ApiError::TaskFailure(_) => "task_failure",
            ApiError::NotConfigured { .. } => "configuration_failure",
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn hints(&self) -> Vec<String> {
        match self {
            ApiError::Acquisition { hints, .. } | ApiError::NotConfigured { hints, .. } => {
                hints.clone()
            }
            _ => Vec::new(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Acquisition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TaskFailure(_) => StatusCode::BAD_GATEWAY,
            ApiError::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = self.error_type();
        let request_id = Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                error_type = error_type,
                status = status.as_u16(),
                request_id = %request_id,
                message = %self,
                "API error"
            );
        } else {
            tracing::warn!(
                error_type = error_type,
                status = status.as_u16(),
                request_id = %request_id,
                message = %self,
                "API request rejected"
            );
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            request_id,
            hints: self.hints(),
        })
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        let hints = err.hints();
        match err {
            AnalysisError::Validation(msg) => ApiError::BadRequest(msg),
            AnalysisError::Configuration(_) => ApiError::NotConfigured {
                message: err.to_string(),
                hints,
            },
            AnalysisError::Acquisition(e) => ApiError::Acquisition {
                message: e.to_string(),
                hints,
            },
            AnalysisError::Pipeline(e @ PipelineError::TaskFailure(_)) => {
                ApiError::TaskFailure(e.to_string())
            }
            AnalysisError::Pipeline(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::AcquisitionError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AnalysisError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AnalysisError::Configuration("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (
                AnalysisError::Acquisition(AcquisitionError::InvalidUrl("x".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AnalysisError::Pipeline(PipelineError::DependencyCycle(Vec::new())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_configuration_error_carries_hints() {
        let api = ApiError::from(AnalysisError::Configuration("missing key".into()));
        assert_eq!(api.error_type(), "configuration_failure");
        assert!(!api.hints().is_empty());
    }
}
