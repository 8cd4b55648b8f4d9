/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use projectdesk_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        guard::{guard, Guard},
        security::SecurityHeadersLayer,
    },
    routes,
};
use axum::{
    handler::Handler,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use projectdesk_shared::{
    auth::authorization::{ADMIN_ONLY, ADMIN_OR_SPECIALIST, ANY_ROLE, STAFF},
    export::{DisabledStore, HttpObjectStore, ObjectStore},
    models::user::Role,
    notify::{LogMailer, Mailer},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub mailer: Arc<dyn Mailer>,
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    /// State with the adapters the configuration selects: a logging mailer,
    /// and HTTP object storage when `STORAGE_ENDPOINT` is set.
    pub fn new(db: PgPool, config: Config) -> Self {
        let store: Arc<dyn ObjectStore> = match &config.storage.endpoint {
            Some(endpoint) => match HttpObjectStore::new(
                endpoint,
                &config.storage.bucket,
                config.storage.access_token.clone(),
            ) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::error!(error = %e, "Object storage client unavailable, exports disabled");
                    Arc::new(DisabledStore)
                }
            },
            None => Arc::new(DisabledStore),
        };

        Self {
            db,
            config: Arc::new(config),
            mailer: Arc::new(LogMailer),
            store,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the router with every route, its guard and the global layers.
///
/// ```text
/// /health                                   public
/// /auth      POST login, register           public
///            GET  data                      any role
/// /project   GET  /, list, :id              any role
///            PATCH :id                      any role
///            POST /, DELETE :id             admin
/// /task      all routes                     admin, customer, specialist
/// /user      POST /                         public
///            GET profile, POST confirm-password,
///            PATCH /, PATCH password        admin, customer, specialist
///            GET status, list, role, :id,
///            PATCH :id                      admin
/// /competency GET titles                    admin, specialist
///            everything else                admin
/// ```
pub fn build_router(state: AppState) -> Router {
    let secret: Arc<str> = Arc::from(state.jwt_secret());
    let only = |roles: &'static [Role]| from_fn_with_state(Guard::roles(secret.clone(), roles), guard);

    let any = only(ANY_ROLE);
    let staff = only(STAFF);
    let admin = only(ADMIN_ONLY);
    let admin_or_specialist = only(ADMIN_OR_SPECIALIST);

    let auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/register", post(routes::auth::register))
        .route("/data", get(routes::auth::data.layer(any.clone())));

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::project::list.layer(any.clone())).post(routes::project::create.layer(admin.clone())),
        )
        .route("/list", get(routes::project::list_titles.layer(any.clone())))
        .route(
            "/:id",
            get(routes::project::get.layer(any.clone()))
                .patch(routes::project::update.layer(any.clone()))
                .delete(routes::project::delete.layer(admin.clone())),
        );

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::task::list.layer(staff.clone())).post(routes::task::create.layer(staff.clone())),
        )
        .route("/by-project/:id", get(routes::task::by_project.layer(staff.clone())))
        .route("/export/:project_id", get(routes::task::export.layer(staff.clone())))
        .route(
            "/:id",
            get(routes::task::get.layer(staff.clone()))
                .patch(routes::task::update.layer(staff.clone()))
                .delete(routes::task::delete.layer(staff.clone())),
        );

    let user_routes = Router::new()
        .route(
            "/",
            post(routes::user::create).patch(routes::user::update_self.layer(staff.clone())),
        )
        .route("/status", get(routes::user::list_by_status.layer(admin.clone())))
        .route("/list", get(routes::user::list_names.layer(admin.clone())))
        .route("/role", get(routes::user::list_by_role.layer(admin.clone())))
        .route("/profile", get(routes::user::profile.layer(staff.clone())))
        .route(
            "/confirm-password",
            post(routes::user::confirm_password.layer(staff.clone())),
        )
        .route("/password", patch(routes::user::change_password.layer(staff.clone())))
        .route(
            "/:id",
            get(routes::user::get.layer(admin.clone())).patch(routes::user::update.layer(admin.clone())),
        );

    let competency_routes = Router::new()
        .route(
            "/",
            get(routes::competency::list.layer(admin.clone())).post(routes::competency::create.layer(admin.clone())),
        )
        .route("/titles", get(routes::competency::titles.layer(admin_or_specialist)))
        .route(
            "/:id",
            get(routes::competency::get.layer(admin.clone()))
                .patch(routes::competency::update.layer(admin.clone()))
                .delete(routes::competency::delete.layer(admin)),
        );

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .nest("/project", project_routes)
        .nest("/task", task_routes)
        .nest("/user", user_routes)
        .nest("/competency", competency_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}
