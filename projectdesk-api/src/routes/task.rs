/// Task endpoints
///
/// `GET /task/by-project/:id?onlyMyTasks=true` narrows a project's task list
/// to tasks the caller executes or reviews. `GET /task/export/:project_id`
/// uploads the project's tasks as CSV and returns the file URL.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use projectdesk_shared::{
    auth::middleware::Identity,
    models::task::{CreateTask, UpdateTask},
    query::ListParams,
    services::{
        task::{ExportLink, TaskDetail},
        TaskService,
    },
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct ByProjectQuery {
    pub fields: Option<String>,
    pub order_desc: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "onlyMyTasks", default)]
    pub only_my_tasks: Option<String>,
}

impl ByProjectQuery {
    /// Only the literal `true` enables the filter.
    fn only_mine(&self) -> bool {
        self.only_my_tasks
            .as_deref()
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    fn list_params(&self) -> ListParams {
        ListParams {
            fields: self.fields.clone(),
            order_desc: self.order_desc.clone(),
            search: self.search.clone(),
            stage: None,
        }
    }
}

/// `GET /task?fields=&order_desc=&search=`
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    Ok(Json(TaskService::new(&state.db).list(&params, &identity).await?))
}

pub async fn by_project(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<i32>,
    Query(query): Query<ByProjectQuery>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    let rows = TaskService::new(&state.db)
        .by_project(project_id, &query.list_params(), query.only_mine(), &identity)
        .await?;
    Ok(Json(rows))
}

pub async fn export(State(state): State<AppState>, Path(project_id): Path<i32>) -> ApiResult<Json<ExportLink>> {
    let link = TaskService::new(&state.db)
        .export(project_id, state.store.as_ref())
        .await?;
    Ok(Json(link))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<TaskDetail>> {
    Ok(Json(TaskService::new(&state.db).get(id).await?))
}

pub async fn create(State(state): State<AppState>, Json(dto): Json<CreateTask>) -> ApiResult<Json<TaskDetail>> {
    dto.validate()?;
    Ok(Json(TaskService::new(&state.db).create(dto).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(dto): Json<UpdateTask>,
) -> ApiResult<Json<TaskDetail>> {
    dto.validate()?;
    Ok(Json(TaskService::new(&state.db).update(id, dto).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<bool>> {
    Ok(Json(TaskService::new(&state.db).delete(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(qs: &str) -> ByProjectQuery {
        let uri: axum::http::Uri = format!("/task/by-project/1?{}", qs).parse().unwrap();
        Query::<ByProjectQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_only_my_tasks_flag() {
        assert!(query("onlyMyTasks=true").only_mine());
        assert!(query("onlyMyTasks=TRUE").only_mine());
        assert!(!query("onlyMyTasks=false").only_mine());
        assert!(!query("onlyMyTasks=1").only_mine());
        assert!(!query("fields=id").only_mine());
    }

    #[test]
    fn test_by_project_query_has_no_stage() {
        let params = query("fields=id,title&search=api&onlyMyTasks=true").list_params();
        assert_eq!(params.fields.as_deref(), Some("id,title"));
        assert_eq!(params.search.as_deref(), Some("api"));
        assert!(params.stage.is_none());
    }
}
