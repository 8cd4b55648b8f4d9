/// Integration tests for the entity services
///
/// These tests require a running PostgreSQL database and are skipped when
/// `DATABASE_URL` is not set.
/// Run with: cargo test --test services_tests

#[allow(dead_code)]
mod common;

use chrono::{Duration, Utc};
use common::*;
use projectdesk_shared::auth::password::PasswordCost;
use projectdesk_shared::models::organization::Organization;
use projectdesk_shared::models::project::{Project, UpdateProject};
use projectdesk_shared::models::task::{CreateTask, Task};
use projectdesk_shared::models::internship::{Internship, NewInternship};
use projectdesk_shared::models::user::{CreateUser, Role, User, UserStatus};
use projectdesk_shared::services::auth::LoginRequest;
use projectdesk_shared::services::{AuthService, ProjectService, ServiceError, TaskService, UserService};
use projectdesk_shared::services::user::{UserListQuery, Welcome};
use projectdesk_shared::notify::{Mail, MailError, Mailer};
use projectdesk_shared::query::ListParams;

fn stage(stage: &str) -> ListParams {
    ListParams {
        stage: Some(stage.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_specialist_sees_only_member_projects() {
    let Some(pool) = test_pool().await else { return };
    let (specialist, identity) = user_with_role(&pool, Role::Specialist).await;

    let mut member = project_dto(&unique("member"));
    member.users = vec![specialist.id];
    let member = insert_project(&pool, member).await;
    let outsider = insert_project(&pool, project_dto(&unique("outsider"))).await;

    let rows = ProjectService::new(&pool)
        .list(&ListParams::default(), &identity)
        .await
        .expect("Listing failed");

    let listed = ids(&rows);
    assert!(listed.contains(&(member.id as i64)));
    assert!(!listed.contains(&(outsider.id as i64)));

    for row in &rows {
        let users = row["users"].as_array().expect("users is an array");
        assert!(
            users.iter().any(|u| u["id"].as_i64() == Some(specialist.id as i64)),
            "project {} listed without membership",
            row["id"]
        );
    }
}

#[tokio::test]
async fn test_customer_sees_only_own_organization_projects() {
    let Some(pool) = test_pool().await else { return };
    let (customer, identity) = user_with_role(&pool, Role::Customer).await;
    let (other, _) = user_with_role(&pool, Role::Customer).await;

    let own_org = organization_for(&pool, customer.id).await;
    let other_org = organization_for(&pool, other.id).await;

    let mut own = project_dto(&unique("own"));
    own.organization_id = Some(own_org.id);
    let own = insert_project(&pool, own).await;

    let mut foreign = project_dto(&unique("foreign"));
    foreign.organization_id = Some(other_org.id);
    let foreign = insert_project(&pool, foreign).await;

    let rows = ProjectService::new(&pool)
        .list(&ListParams::default(), &identity)
        .await
        .expect("Listing failed");

    let listed = ids(&rows);
    assert!(listed.contains(&(own.id as i64)));
    assert!(!listed.contains(&(foreign.id as i64)));

    for id in listed {
        let project = Project::find_by_id(&pool, id as i32).await.unwrap().unwrap();
        let org = Organization::find_by_id(&pool, project.organization_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(org.contact_person_id, Some(customer.id));
    }
}

#[tokio::test]
async fn test_narrow_projection_returns_requested_fields() {
    let Some(pool) = test_pool().await else { return };
    let (_, admin) = user_with_role(&pool, Role::Admin).await;
    insert_project(&pool, project_dto(&unique("narrow"))).await;

    let params = ListParams {
        fields: Some("id,title,bogus".to_string()),
        ..Default::default()
    };
    let rows = ProjectService::new(&pool).list(&params, &admin).await.unwrap();

    assert!(!rows.is_empty());
    for row in &rows {
        let mut keys: Vec<_> = row.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["id", "title"]);
    }
}

#[tokio::test]
async fn test_delete_project_removes_tasks() {
    let Some(pool) = test_pool().await else { return };
    let project = insert_project(&pool, project_dto(&unique("doomed"))).await;

    for n in 0..2 {
        Task::insert(
            &pool,
            &CreateTask {
                title: format!("task {}", n),
                project_id: project.id,
                ..Default::default()
            },
        )
        .await
        .expect("Failed to insert task");
    }

    let service = ProjectService::new(&pool);
    assert!(service.delete(project.id).await.unwrap());

    assert!(matches!(
        service.get_by_id(project.id).await,
        Err(ServiceError::NotFound { .. })
    ));
    assert!(Task::by_project(&pool, project.id).await.unwrap().is_empty());

    // Second delete reports not found.
    assert!(matches!(
        service.delete(project.id).await,
        Err(ServiceError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_project_stages() {
    let Some(pool) = test_pool().await else { return };
    let (_, admin) = user_with_role(&pool, Role::Admin).await;
    let now = Utc::now();

    let active = insert_project(&pool, project_dto(&unique("active"))).await;

    let mut finished = project_dto(&unique("finished"));
    finished.end_date = Some(now - Duration::days(1));
    let finished = insert_project(&pool, finished).await;

    let mut potential = project_dto(&unique("potential"));
    potential.start_date = None;
    potential.end_date = None;
    let potential = insert_project(&pool, potential).await;

    let service = ProjectService::new(&pool);
    let active_ids = ids(&service.list(&stage("ACTIVE"), &admin).await.unwrap());
    let finished_ids = ids(&service.list(&stage("FINISHED"), &admin).await.unwrap());
    let potential_ids = ids(&service.list(&stage("POTENCIAL"), &admin).await.unwrap());

    assert!(active_ids.contains(&(active.id as i64)));
    assert!(!active_ids.contains(&(finished.id as i64)));
    assert!(!active_ids.contains(&(potential.id as i64)));

    assert!(finished_ids.contains(&(finished.id as i64)));
    assert!(!finished_ids.contains(&(active.id as i64)));

    assert!(potential_ids.contains(&(potential.id as i64)));
    assert!(!potential_ids.contains(&(active.id as i64)));
    assert!(!potential_ids.contains(&(finished.id as i64)));

    for id in &active_ids {
        let project = Project::find_by_id(&pool, *id as i32).await.unwrap().unwrap();
        assert!(project.end_date.unwrap() >= now - Duration::minutes(1));
    }
    for id in &potential_ids {
        let project = Project::find_by_id(&pool, *id as i32).await.unwrap().unwrap();
        assert!(project.start_date.is_none());
    }
}

#[tokio::test]
async fn test_update_replaces_members() {
    let Some(pool) = test_pool().await else { return };
    let mut users = Vec::new();
    for _ in 0..4 {
        users.push(user_with_role(&pool, Role::Specialist).await.0.id);
    }

    let mut dto = project_dto(&unique("members"));
    dto.users = users[..3].to_vec();
    let project = insert_project(&pool, dto).await;

    let detail = ProjectService::new(&pool)
        .update(
            project.id,
            UpdateProject {
                users: Some(users[1..].to_vec()),
                comment: Some(Some("reassigned".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let members: Vec<i32> = detail.users.iter().map(|u| u.id).collect();
    assert_eq!(members, users[1..].to_vec());
    assert_eq!(detail.project.comment.as_deref(), Some("reassigned"));
}

#[tokio::test]
async fn test_only_my_tasks() {
    let Some(pool) = test_pool().await else { return };
    let (_, admin) = user_with_role(&pool, Role::Admin).await;
    let (reviewer, _) = user_with_role(&pool, Role::Specialist).await;

    let project = insert_project(&pool, project_dto(&unique("tasks"))).await;
    let mine = Task::insert(
        &pool,
        &CreateTask {
            title: "review me".to_string(),
            project_id: project.id,
            reviewer_id: Some(admin.id),
            executor_id: Some(reviewer.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let theirs = Task::insert(
        &pool,
        &CreateTask {
            title: "not mine".to_string(),
            project_id: project.id,
            executor_id: Some(reviewer.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let service = TaskService::new(&pool);
    let all = ids(&service
        .by_project(project.id, &ListParams::default(), false, &admin)
        .await
        .unwrap());
    let own = ids(&service
        .by_project(project.id, &ListParams::default(), true, &admin)
        .await
        .unwrap());

    assert_eq!(all.len(), 2);
    assert_eq!(own, vec![mine.id as i64]);
    assert!(!own.contains(&(theirs.id as i64)));
}

#[tokio::test]
async fn test_sign_in_with_unknown_login() {
    let Some(pool) = test_pool().await else { return };
    let service = AuthService::new(&pool, "test-secret-of-at-least-thirty-two-bytes", Duration::days(1));

    let result = service
        .sign_in(LoginRequest {
            login: format!("{}@example.com", unique("nobody")),
            password: "whatever".to_string(),
        })
        .await;

    match result {
        Err(err @ ServiceError::InvalidUser) => assert_eq!(err.to_string(), "INVALID USER"),
        other => panic!("expected INVALID USER, got {:?}", other.map(|s| s.identity.id)),
    }
}

#[tokio::test]
async fn test_change_password_then_sign_in() {
    let Some(pool) = test_pool().await else { return };
    let (user, _) = user_with_role(&pool, Role::Specialist).await;

    let users = UserService::new(&pool, PasswordCost::default());
    users
        .change_password(
            user.id,
            serde_json::from_value(serde_json::json!({
                "newPassword": "n3w-pass",
                "newPasswordConfirm": "n3w-pass",
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    let auth = AuthService::new(&pool, "test-secret-of-at-least-thirty-two-bytes", Duration::days(1));
    let wrong = auth
        .sign_in(LoginRequest {
            login: user.login.clone(),
            password: "old-pass".to_string(),
        })
        .await;
    assert!(matches!(wrong, Err(ServiceError::WrongCredentials)));

    let signed_in = auth
        .sign_in(LoginRequest {
            login: user.login.clone(),
            password: "n3w-pass".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(signed_in.identity.id, user.id);
    assert_eq!(signed_in.identity.role, Role::Specialist);
    assert!(!signed_in.access_token.is_empty());
}

async fn intern(pool: &sqlx::PgPool, end_in_days: i64) -> i32 {
    let (user, _) = user_with_role(pool, Role::Specialist).await;
    sqlx::query("UPDATE users SET status = $2 WHERE id = $1")
        .bind(user.id)
        .bind(UserStatus::Internship)
        .execute(pool)
        .await
        .unwrap();
    Internship::insert(
        pool,
        NewInternship {
            user_id: user.id,
            is_practice: false,
            status: None,
            start_date: Some(Utc::now() - Duration::days(60)),
            end_date: Some(Utc::now() + Duration::days(end_in_days)),
        },
    )
    .await
    .unwrap();
    user.id
}

#[tokio::test]
async fn test_intern_listing_by_stage() {
    let Some(pool) = test_pool().await else { return };
    let current = intern(&pool, 10).await as i64;
    let former = intern(&pool, -10).await as i64;

    let users = UserService::new(&pool, PasswordCost::default());
    let listing = |stage: &str| UserListQuery {
        status: Some("INTERNSHIP".to_string()),
        stage: Some(stage.to_string()),
        ..Default::default()
    };

    let active = ids(&users.list_by_status(&listing("ACTIVE")).await.unwrap());
    assert!(active.contains(&current));
    assert!(!active.contains(&former));

    let finished = ids(&users.list_by_status(&listing("FINISHED")).await.unwrap());
    assert!(finished.contains(&former));
    assert!(!finished.contains(&current));

    let all = ids(&users.list_by_status(&listing("ALL")).await.unwrap());
    assert!(all.contains(&current) && all.contains(&former));
}

#[tokio::test]
async fn test_update_does_not_move_foreign_tasks() {
    let Some(pool) = test_pool().await else { return };
    let owner = insert_project(&pool, project_dto(&unique("owner"))).await;
    let other = insert_project(&pool, project_dto(&unique("other"))).await;
    let task = Task::insert(
        &pool,
        &CreateTask {
            title: "stay put".to_string(),
            project_id: owner.id,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let dto: UpdateProject = serde_json::from_value(serde_json::json!({ "tasks": [task.id] })).unwrap();
    let detail = ProjectService::new(&pool).update(other.id, dto).await.unwrap();

    assert!(detail.tasks.is_empty());
    let task = Task::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(task.project_id, owner.id);
}

#[tokio::test]
async fn test_clearing_start_date_makes_project_potential() {
    let Some(pool) = test_pool().await else { return };
    let (_, admin) = user_with_role(&pool, Role::Admin).await;
    let project = insert_project(&pool, project_dto(&unique("potential"))).await;

    let service = ProjectService::new(&pool);
    assert!(!ids(&service.list(&stage("POTENCIAL"), &admin).await.unwrap()).contains(&(project.id as i64)));

    let dto: UpdateProject = serde_json::from_value(serde_json::json!({ "start_date": null })).unwrap();
    let detail = service.update(project.id, dto).await.unwrap();
    assert_eq!(detail.project.start_date, None);
    assert!(detail.project.end_date.is_some());

    assert!(ids(&service.list(&stage("POTENCIAL"), &admin).await.unwrap()).contains(&(project.id as i64)));
}

#[tokio::test]
async fn test_null_executor_unassigns() {
    let Some(pool) = test_pool().await else { return };
    let (executor, _) = user_with_role(&pool, Role::Specialist).await;
    let (reviewer, _) = user_with_role(&pool, Role::Specialist).await;
    let project = insert_project(&pool, project_dto(&unique("unassign"))).await;
    let task = Task::insert(
        &pool,
        &CreateTask {
            title: "hand over".to_string(),
            project_id: project.id,
            executor_id: Some(executor.id),
            reviewer_id: Some(reviewer.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let dto = serde_json::from_value(serde_json::json!({ "executor_id": null })).unwrap();
    let detail = TaskService::new(&pool).update(task.id, dto).await.unwrap();

    assert_eq!(detail.task.executor_id, None);
    assert_eq!(detail.task.reviewer_id, Some(reviewer.id));
}

struct UnreachableMailer;

#[async_trait::async_trait]
impl Mailer for UnreachableMailer {
    async fn send(&self, _mail: Mail) -> Result<(), MailError> {
        Err(MailError::Delivery("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_failed_welcome_mail_rolls_back_account() {
    let Some(pool) = test_pool().await else { return };
    let login = format!("{}@example.com", unique("unmailed"));
    let welcome = Welcome {
        from: "noreply@localhost".to_string(),
        platform_url: "http://localhost:3000".to_string(),
    };

    let result = UserService::new(&pool, PasswordCost::default())
        .create(
            CreateUser {
                login: login.clone(),
                first_name: None,
                last_name: None,
                middle_name: None,
            },
            &UnreachableMailer,
            &welcome,
        )
        .await;

    assert!(matches!(result, Err(ServiceError::Mail(_))));
    assert!(User::find_by_login(&pool, &login).await.unwrap().is_none());
}
