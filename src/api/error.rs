use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{debug, error};

use crate::error::{ErrorCode, ServiceError};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::TeamExists => StatusCode::BAD_REQUEST,
        ErrorCode::PullRequestExists => StatusCode::CONFLICT,
        ErrorCode::PullRequestMerged | ErrorCode::NotAssigned | ErrorCode::NoCandidate => {
            StatusCode::CONFLICT
        }
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(reason) => {
                debug!("Rejected malformed request: {}", reason);
                StatusCode::BAD_REQUEST.into_response()
            }
            ApiError::Service(err) => match err.code() {
                Some(code) => (
                    status_for(code),
                    Json(json!({
                        "error": {
                            "code": code,
                            "message": err.to_string(),
                        }
                    })),
                )
                    .into_response(),
                None => {
                    error!("Internal error: {}", err);
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorCode::TeamExists), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::PullRequestExists), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::NoCandidate), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_infrastructure_failure_is_opaque_500() {
        let response = ApiError::from(ServiceError::Internal("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_bad_request_is_400() {
        let response = ApiError::BadRequest("missing team_name".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
