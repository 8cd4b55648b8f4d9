/// Competency endpoints
///
/// `GET /competency/titles` is open to specialists for the profile editor;
/// everything else is admin-only.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Json,
};
use projectdesk_shared::{
    models::competency::{Competency, CreateCompetency, UpdateCompetency},
    services::{competency::CompetencyDetail, CompetencyService},
};
use validator::Validate;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Competency>>> {
    Ok(Json(CompetencyService::new(&state.db).all().await?))
}

pub async fn titles(State(state): State<AppState>) -> ApiResult<Json<Vec<Competency>>> {
    Ok(Json(CompetencyService::new(&state.db).titles().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<CompetencyDetail>> {
    Ok(Json(CompetencyService::new(&state.db).get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(dto): Json<CreateCompetency>,
) -> ApiResult<Json<Competency>> {
    dto.validate()?;
    Ok(Json(CompetencyService::new(&state.db).create(dto).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(dto): Json<UpdateCompetency>,
) -> ApiResult<Json<CompetencyDetail>> {
    dto.validate()?;
    Ok(Json(CompetencyService::new(&state.db).update(id, dto).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<bool>> {
    Ok(Json(CompetencyService::new(&state.db).delete(id).await?))
}
