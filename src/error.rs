use serde::Serialize;
use thiserror::Error;

/// Stable codes for business-rule rejections, surfaced to callers verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "TEAM_EXISTS")]
    TeamExists,
    #[serde(rename = "PR_EXISTS")]
    PullRequestExists,
    #[serde(rename = "PR_MERGED")]
    PullRequestMerged,
    #[serde(rename = "NOT_ASSIGNED")]
    NotAssigned,
    #[serde(rename = "NO_CANDIDATE")]
    NoCandidate,
    #[serde(rename = "NOT_FOUND")]
    NotFound,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TeamExists => "TEAM_EXISTS",
            ErrorCode::PullRequestExists => "PR_EXISTS",
            ErrorCode::PullRequestMerged => "PR_MERGED",
            ErrorCode::NotAssigned => "NOT_ASSIGNED",
            ErrorCode::NoCandidate => "NO_CANDIDATE",
            ErrorCode::NotFound => "NOT_FOUND",
        }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("team_name already exists")]
    TeamExists,

    #[error("PR id already exists")]
    PullRequestExists,

    #[error("cannot reassign on merged PR")]
    PullRequestMerged,

    #[error("reviewer is not assigned to this PR")]
    NotAssigned,

    #[error("no active replacement candidate in team")]
    NoCandidate,

    #[error("resource not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for ServiceError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl ServiceError {
    /// Domain code for business-rule rejections, `None` for infrastructure failures.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ServiceError::TeamExists => Some(ErrorCode::TeamExists),
            ServiceError::PullRequestExists => Some(ErrorCode::PullRequestExists),
            ServiceError::PullRequestMerged => Some(ErrorCode::PullRequestMerged),
            ServiceError::NotAssigned => Some(ErrorCode::NotAssigned),
            ServiceError::NoCandidate => Some(ErrorCode::NoCandidate),
            ServiceError::NotFound => Some(ErrorCode::NotFound),
            ServiceError::Database(_) | ServiceError::Config(_) | ServiceError::Internal(_) => None,
        }
    }

    pub fn is_domain(&self) -> bool {
        self.code().is_some()
    }

    pub fn assignment_vanished(pr_id: &str, reviewer_id: &str) -> Self {
        Self::Internal(format!(
            "reviewer {} no longer assigned to {} at write time",
            reviewer_id, pr_id
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_carry_codes() {
        assert_eq!(ServiceError::NoCandidate.code(), Some(ErrorCode::NoCandidate));
        assert_eq!(ServiceError::NotAssigned.code().unwrap().as_str(), "NOT_ASSIGNED");
        assert!(ServiceError::PullRequestMerged.is_domain());
    }

    #[test]
    fn test_infrastructure_errors_are_opaque() {
        let err = ServiceError::assignment_vanished("pr-1", "alice");
        assert!(err.code().is_none());
        assert!(err.to_string().contains("pr-1"));
        assert!(!ServiceError::Database(sqlx::Error::RowNotFound).is_domain());
    }

    #[test]
    fn test_error_code_serializes_to_wire_name() {
        let json = serde_json::to_string(&ErrorCode::PullRequestExists).unwrap();
        assert_eq!(json, "\"PR_EXISTS\"");
    }
}
