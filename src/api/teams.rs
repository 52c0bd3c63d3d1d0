use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{require, ApiError};
use crate::database::models::{BulkDeactivateResult, Team};
use crate::service::ReviewService;

#[derive(Debug, Deserialize)]
pub struct TeamNameQuery {
    pub team_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeactivateRequest {
    pub team_name: String,
    pub user_ids: Vec<String>,
}

pub async fn add_team(
    State(service): State<ReviewService>,
    payload: Result<Json<Team>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(team) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    require("team_name", &team.team_name)?;
    for member in &team.members {
        require("members.user_id", &member.user_id)?;
    }

    let team = service.create_team(team).await?;
    Ok((StatusCode::CREATED, Json(json!({ "team": team }))))
}

pub async fn get_team(
    State(service): State<ReviewService>,
    query: Result<Query<TeamNameQuery>, QueryRejection>,
) -> Result<Json<Team>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let team_name = query.team_name.unwrap_or_default();
    require("team_name", &team_name)?;

    Ok(Json(service.get_team(&team_name).await?))
}

pub async fn bulk_deactivate(
    State(service): State<ReviewService>,
    payload: Result<Json<BulkDeactivateRequest>, JsonRejection>,
) -> Result<Json<BulkDeactivateResult>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    require("team_name", &request.team_name)?;

    let result = service
        .bulk_deactivate_team_users(&request.team_name, &request.user_ids)
        .await?;
    Ok(Json(result))
}
