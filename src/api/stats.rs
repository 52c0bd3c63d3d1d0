use axum::{extract::State, response::Json};

use super::ApiError;
use crate::database::models::AssignmentStats;
use crate::service::ReviewService;

pub async fn assignments(
    State(service): State<ReviewService>,
) -> Result<Json<AssignmentStats>, ApiError> {
    Ok(Json(service.get_assignment_stats().await?))
}
