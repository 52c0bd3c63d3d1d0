use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{require, ApiError};
use crate::database::models::{NewPullRequest, Reassignment};
use crate::service::ReviewService;

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub pull_request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    pub pull_request_id: String,
    pub old_reviewer_id: String,
}

pub async fn create(
    State(service): State<ReviewService>,
    payload: Result<Json<NewPullRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    require("pull_request_id", &request.pull_request_id)?;
    require("pull_request_name", &request.pull_request_name)?;
    require("author_id", &request.author_id)?;

    let pr = service.create_pull_request(request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "pr": pr }))))
}

pub async fn merge(
    State(service): State<ReviewService>,
    payload: Result<Json<MergeRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    require("pull_request_id", &request.pull_request_id)?;

    let pr = service.merge_pull_request(&request.pull_request_id).await?;
    Ok(Json(json!({ "pr": pr })))
}

pub async fn reassign(
    State(service): State<ReviewService>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<Reassignment>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    require("pull_request_id", &request.pull_request_id)?;
    require("old_reviewer_id", &request.old_reviewer_id)?;

    let reassignment = service
        .reassign_reviewer(&request.pull_request_id, &request.old_reviewer_id)
        .await?;
    Ok(Json(reassignment))
}
