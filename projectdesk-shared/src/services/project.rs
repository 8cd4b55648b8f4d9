/// Projects: role-scoped listings, details and transactional writes.

use super::association::{diff, Mode};
use super::{ServiceError, ServiceResult};
use crate::auth::middleware::Identity;
use crate::models::organization::Organization;
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::task::Task;
use crate::models::user::UserSummary;
use crate::query::catalog::{PROJECTS, PROJECT_LIST_ITEM};
use crate::query::search::{search_predicate, SearchField};
use crate::query::visibility::project_visibility;
use crate::query::{ListParams, ListQuery, OrderBy, Predicate, ProjectStage, Shaped};
use serde::Serialize;
use sqlx::PgPool;

static TITLE_SEARCH: &[SearchField] = &[SearchField::Column("title")];

/// A project with owner, organization, tasks and members.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub owner: Option<UserSummary>,
    pub organization: Option<Organization>,
    pub tasks: Vec<Task>,
    pub users: Vec<UserSummary>,
}

pub struct ProjectService<'a> {
    pool: &'a PgPool,
}

impl<'a> ProjectService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Projects visible to `identity`, filtered by stage and search.
    pub async fn list(&self, params: &ListParams, identity: &Identity) -> ServiceResult<Vec<serde_json::Value>> {
        let shaped = Shaped::from_params(params, &PROJECTS);
        let filter = Predicate::and([
            project_visibility(identity),
            ProjectStage::parse(params.stage.as_deref()).predicate(),
        ]);

        Ok(shaped.fetch(self.pool, &PROJECTS, filter).await?)
    }

    /// `{id, title}` of visible projects whose title contains `title`.
    pub async fn list_titles(&self, title: Option<&str>, identity: &Identity) -> ServiceResult<Vec<serde_json::Value>> {
        let fields: Vec<_> = PROJECT_LIST_ITEM.iter().collect();
        let predicate = Predicate::and([project_visibility(identity), search_predicate(title, TITLE_SEARCH)]);

        let rows = ListQuery {
            table: PROJECTS.table,
            alias: PROJECTS.alias,
            fields: &fields,
            predicate: &predicate,
            order: &OrderBy::default(),
        }
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> ServiceResult<ProjectDetail> {
        let project = Project::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))?;

        let owner = match project.owner_id {
            Some(owner_id) => UserSummary::find_by_id(self.pool, owner_id).await?,
            None => None,
        };
        let organization = match project.organization_id {
            Some(organization_id) => Organization::find_by_id(self.pool, organization_id).await?,
            None => None,
        };

        Ok(ProjectDetail {
            owner,
            organization,
            tasks: Task::by_project(self.pool, id).await?,
            users: UserSummary::for_project(self.pool, id).await?,
            project,
        })
    }

    /// Inserts the project, its members and re-parented tasks atomically.
    pub async fn create(&self, dto: CreateProject) -> ServiceResult<ProjectDetail> {
        let mut tx = self.pool.begin().await?;

        let project = Project::insert(&mut *tx, &dto).await?;
        Project::connect_users(&mut *tx, project.id, &dto.users).await?;
        Project::attach_tasks(&mut *tx, project.id, &dto.tasks).await?;

        tx.commit().await?;

        tracing::info!(project_id = project.id, "Project created");
        self.get_by_id(project.id).await
    }

    /// Applies scalar changes and reconciles members in one transaction.
    ///
    /// A non-empty `users` list is the complete new member set; an absent or
    /// empty one leaves members untouched. Tasks never change project here.
    pub async fn update(&self, id: i32, dto: UpdateProject) -> ServiceResult<ProjectDetail> {
        let mut tx = self.pool.begin().await?;

        Project::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))?;

        if let Some(users) = dto.users.as_deref().filter(|u| !u.is_empty()) {
            let current = Project::user_ids(&mut *tx, id).await?;
            let changes = diff(&current, users, Mode::Replace);

            Project::connect_users(&mut *tx, id, &changes.connect).await?;
            Project::disconnect_users(&mut *tx, id, &changes.disconnect).await?;

            tracing::debug!(
                project_id = id,
                connected = ?changes.connect,
                disconnected = ?changes.disconnect,
                "Reconciled project members"
            );
        }

        Project::update(&mut *tx, id, &dto).await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Deletes the project's tasks, then the project, atomically.
    pub async fn delete(&self, id: i32) -> ServiceResult<bool> {
        let mut tx = self.pool.begin().await?;

        let tasks = Task::delete_by_project(&mut *tx, id).await?;
        if !Project::delete(&mut *tx, id).await? {
            return Err(ServiceError::not_found("Project", id));
        }

        tx.commit().await?;

        tracing::info!(project_id = id, tasks_deleted = tasks, "Project deleted");
        Ok(true)
    }
}
