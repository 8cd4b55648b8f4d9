/// Project endpoints
///
/// Listings are scoped to the caller: admins see every project, customers
/// the projects of organizations they are the contact person of, everyone
/// else the projects they are a member of.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use projectdesk_shared::{
    auth::middleware::Identity,
    models::project::{CreateProject, UpdateProject},
    query::ListParams,
    services::{project::ProjectDetail, ProjectService},
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct TitleQuery {
    pub title: Option<String>,
}

/// `GET /project?fields=&order_desc=&search=&stage=`
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    Ok(Json(ProjectService::new(&state.db).list(&params, &identity).await?))
}

/// `GET /project/list?title=`
pub async fn list_titles(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<TitleQuery>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    let rows = ProjectService::new(&state.db)
        .list_titles(query.title.as_deref(), &identity)
        .await?;
    Ok(Json(rows))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<ProjectDetail>> {
    Ok(Json(ProjectService::new(&state.db).get_by_id(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(dto): Json<CreateProject>,
) -> ApiResult<Json<ProjectDetail>> {
    dto.validate()?;
    Ok(Json(ProjectService::new(&state.db).create(dto).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(dto): Json<UpdateProject>,
) -> ApiResult<Json<ProjectDetail>> {
    dto.validate()?;
    Ok(Json(ProjectService::new(&state.db).update(id, dto).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<bool>> {
    Ok(Json(ProjectService::new(&state.db).delete(id).await?))
}
