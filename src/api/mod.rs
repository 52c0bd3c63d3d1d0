pub mod error;
pub mod pull_requests;
pub mod stats;
pub mod teams;
pub mod users;

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::service::ReviewService;

pub use error::ApiError;

pub fn router(service: ReviewService) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/team/add", post(teams::add_team))
        .route("/team/get", get(teams::get_team))
        .route("/team/bulkDeactivate", post(teams::bulk_deactivate))
        .route("/users/setIsActive", post(users::set_is_active))
        .route("/users/getReview", get(users::get_review))
        .route("/pullRequest/create", post(pull_requests::create))
        .route("/pullRequest/merge", post(pull_requests::merge))
        .route("/pullRequest/reassign", post(pull_requests::reassign))
        .route("/stats/assignments", get(stats::assignments))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
        .with_state(service)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "reviewer-service",
        "timestamp": chrono::Utc::now()
    }))
}

/// Required string inputs must be present and non-blank.
pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}
