/// User endpoints
///
/// Account creation (`POST /user`) is public and mails the generated
/// password; the remaining routes need a session. A caller updating their
/// own profile through `PATCH /user` cannot change their role.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use projectdesk_shared::{
    auth::middleware::Identity,
    models::user::{CreateUser, Role, UpdateUser, User},
    query::ListParams,
    services::{
        user::{ChangePassword, ConfirmPassword, UpdatedUser, UserDetail, UserListQuery, Welcome},
        UserService,
    },
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleQuery {
    pub role: Option<String>,
    pub fields: Option<String>,
    pub order_desc: Option<String>,
}

/// Sender and sign-in link for account mails.
pub(crate) fn welcome(state: &AppState) -> Welcome {
    Welcome {
        from: state.config.mail.from.clone(),
        platform_url: state.config.mail.platform_url.clone(),
    }
}

fn service(state: &AppState) -> UserService<'_> {
    UserService::new(&state.db, state.config.password_cost())
}

/// `GET /user/status?status=&fields=&order_desc=&stage=&search=&competencies=`
pub async fn list_by_status(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    Ok(Json(service(&state).list_by_status(&query).await?))
}

/// `GET /user/list?search=`
pub async fn list_names(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    Ok(Json(service(&state).list_names(query.search.as_deref()).await?))
}

/// `GET /user/role?role=&fields=&order_desc=`
pub async fn list_by_role(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    let role: Role = query
        .role
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(ApiError::BadRequest)?;

    let params = ListParams {
        fields: query.fields,
        order_desc: query.order_desc,
        ..Default::default()
    };
    Ok(Json(service(&state).list_by_role(role, &params).await?))
}

pub async fn profile(State(state): State<AppState>, identity: Identity) -> ApiResult<Json<serde_json::Value>> {
    Ok(Json(service(&state).profile(&identity).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<UserDetail>> {
    Ok(Json(service(&state).get_by_id(id).await?))
}

pub async fn create(State(state): State<AppState>, Json(dto): Json<CreateUser>) -> ApiResult<Json<User>> {
    dto.validate()?;
    let user = service(&state)
        .create(dto, state.mailer.as_ref(), &welcome(&state))
        .await?;
    Ok(Json(user))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(dto): Json<UpdateUser>,
) -> ApiResult<Json<UpdatedUser>> {
    dto.validate()?;
    Ok(Json(service(&state).update(id, dto).await?))
}

pub async fn update_self(
    State(state): State<AppState>,
    identity: Identity,
    Json(mut dto): Json<UpdateUser>,
) -> ApiResult<Json<UpdatedUser>> {
    dto.validate()?;
    if dto.role.take().is_some() {
        tracing::debug!(user_id = identity.id, "Ignoring role change in self update");
    }
    Ok(Json(service(&state).update(identity.id, dto).await?))
}

pub async fn confirm_password(
    State(state): State<AppState>,
    identity: Identity,
    Json(dto): Json<ConfirmPassword>,
) -> ApiResult<Json<bool>> {
    dto.validate()?;
    Ok(Json(service(&state).confirm_password(identity.id, dto).await?))
}

pub async fn change_password(
    State(state): State<AppState>,
    identity: Identity,
    Json(dto): Json<ChangePassword>,
) -> ApiResult<Json<bool>> {
    dto.validate()?;
    Ok(Json(service(&state).change_password(identity.id, dto).await?))
}
