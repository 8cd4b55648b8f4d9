/// Shared fixtures for the database-backed integration tests.
///
/// Tests run only when `DATABASE_URL` is set (directly or through `.env`);
/// otherwise each test returns early. Fixtures use unique logins and titles
/// so tests can run in parallel against one database.

use chrono::{Duration, Utc};
use projectdesk_shared::auth::middleware::Identity;
use projectdesk_shared::db::migrations::{ensure_database_exists, run_migrations};
use projectdesk_shared::db::pool::{create_pool, DatabaseConfig};
use projectdesk_shared::models::organization::Organization;
use projectdesk_shared::models::project::{CreateProject, Project};
use projectdesk_shared::models::user::{NewUser, Role, User};
use projectdesk_shared::services::auth::identity_of;
use sqlx::PgPool;
use uuid::Uuid;

pub fn database_url() -> Option<String> {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").ok()
}

/// A migrated pool, or `None` when no database is configured.
pub async fn test_pool() -> Option<PgPool> {
    let url = database_url()?;

    // Parallel tests may race to create the database; the loser's error is harmless.
    let _ = ensure_database_exists(&url).await;

    let pool = create_pool(DatabaseConfig {
        url,
        max_connections: 5,
        ..Default::default()
    })
    .await
    .expect("Failed to create pool");

    run_migrations(&pool).await.expect("Failed to run migrations");
    Some(pool)
}

pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// Inserts a user with `role` and returns it with its token identity.
pub async fn user_with_role(pool: &PgPool, role: Role) -> (User, Identity) {
    let user = User::insert(
        pool,
        NewUser {
            login: format!("{}@example.com", unique("user")),
            password_hash: "not-a-real-hash".to_string(),
            first_name: Some("Test".to_string()),
            last_name: Some(role.as_str().to_string()),
            middle_name: None,
        },
    )
    .await
    .expect("Failed to insert user");

    sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
        .bind(user.id)
        .bind(role)
        .execute(pool)
        .await
        .expect("Failed to set role");

    let user = User::find_by_id(pool, user.id)
        .await
        .expect("Failed to reload user")
        .expect("User vanished");
    let identity = identity_of(&user);
    (user, identity)
}

pub fn project_dto(title: &str) -> CreateProject {
    CreateProject {
        title: title.to_string(),
        owner_id: None,
        customer: "ACME".to_string(),
        contact_person: "Jane Roe".to_string(),
        contact_data: "+1 555 0100".to_string(),
        description: "Integration fixture".to_string(),
        start_date: Some(Utc::now() - Duration::days(30)),
        end_date: Some(Utc::now() + Duration::days(30)),
        contract: None,
        contract_date: None,
        status: None,
        director: None,
        service_name: None,
        document_number: None,
        technical_task: None,
        comment: None,
        organization_id: None,
        tasks: Vec::new(),
        users: Vec::new(),
    }
}

/// Inserts a project directly through the model.
pub async fn insert_project(pool: &PgPool, dto: CreateProject) -> Project {
    let project = Project::insert(pool, &dto).await.expect("Failed to insert project");
    Project::connect_users(pool, project.id, &dto.users)
        .await
        .expect("Failed to connect users");
    project
}

pub async fn organization_for(pool: &PgPool, contact_person_id: i32) -> Organization {
    Organization::insert(pool, &unique("org"), Some(contact_person_id))
        .await
        .expect("Failed to insert organization")
}

/// Ids of listed rows.
pub fn ids(rows: &[serde_json::Value]) -> Vec<i64> {
    rows.iter().filter_map(|row| row["id"].as_i64()).collect()
}
