use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{require, ApiError};
use crate::database::models::UserReviews;
use crate::service::ReviewService;

#[derive(Debug, Deserialize)]
pub struct SetIsActiveRequest {
    pub user_id: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Option<String>,
}

pub async fn set_is_active(
    State(service): State<ReviewService>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    require("user_id", &request.user_id)?;
    let is_active = request
        .is_active
        .ok_or_else(|| ApiError::BadRequest("is_active is required".to_string()))?;

    let user = service.set_user_active(&request.user_id, is_active).await?;
    Ok(Json(json!({ "user": user })))
}

pub async fn get_review(
    State(service): State<ReviewService>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<Json<UserReviews>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let user_id = query.user_id.unwrap_or_default();
    require("user_id", &user_id)?;

    Ok(Json(service.get_user_reviews(&user_id).await?))
}
