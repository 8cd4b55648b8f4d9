/// Authentication endpoints
///
/// - `POST /auth/login`: `{login, password}` to a session token and profile
/// - `POST /auth/register`: self-service account creation
/// - `GET /auth/data`: the caller's token payload
///
/// # Errors
///
/// - `400 INVALID USER`: unknown login
/// - `400 ERROR USER DATA`: wrong password
/// - `400 USER ALREADY EXISTS`: registration with a taken login

use crate::{app::AppState, error::ApiResult, routes::user::welcome};
use axum::{extract::State, Json};
use projectdesk_shared::{
    auth::middleware::Identity,
    models::user::{CreateUser, User},
    services::{
        auth::{LoginRequest, SignIn},
        AuthService,
    },
};
use validator::Validate;

fn service(state: &AppState) -> AuthService<'_> {
    AuthService::new(&state.db, state.jwt_secret(), state.config.token_lifetime())
}

pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> ApiResult<Json<SignIn>> {
    req.validate()?;
    Ok(Json(service(&state).sign_in(req).await?))
}

pub async fn register(State(state): State<AppState>, Json(req): Json<CreateUser>) -> ApiResult<Json<User>> {
    req.validate()?;

    let user = service(&state)
        .register(req, state.config.password_cost(), state.mailer.as_ref(), &welcome(&state))
        .await?;
    Ok(Json(user))
}

pub async fn data(identity: Identity) -> Json<Identity> {
    Json(identity)
}
