/// Tasks: role-scoped listings, CRUD and spreadsheet export.

use super::{ServiceError, ServiceResult};
use crate::auth::middleware::Identity;
use crate::export::{csv, ObjectStore};
use crate::models::project::ProjectSummary;
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::UserSummary;
use crate::query::catalog::TASKS;
use crate::query::visibility::{own_tasks, task_visibility};
use crate::query::{ListParams, Predicate, Shaped, Value};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// A task with executor, reviewer and project resolved.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub executor: Option<UserSummary>,
    pub reviewer: Option<UserSummary>,
    pub project: Option<ProjectSummary>,
}

/// Where an export was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportLink {
    pub url: String,
}

pub struct TaskService<'a> {
    pool: &'a PgPool,
}

impl<'a> TaskService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, params: &ListParams, identity: &Identity) -> ServiceResult<Vec<serde_json::Value>> {
        let shaped = Shaped::from_params(params, &TASKS);
        Ok(shaped.fetch(self.pool, &TASKS, task_visibility(identity)).await?)
    }

    /// Visible tasks of one project. With `only_mine`, further restricted to
    /// tasks the caller executes or reviews, whatever their role.
    pub async fn by_project(
        &self,
        project_id: i32,
        params: &ListParams,
        only_mine: bool,
        identity: &Identity,
    ) -> ServiceResult<Vec<serde_json::Value>> {
        let shaped = Shaped::from_params(params, &TASKS);
        let filter = Predicate::and([
            task_visibility(identity),
            Predicate::eq("project_id", Value::Int(project_id)),
            if only_mine {
                own_tasks(identity.id)
            } else {
                Predicate::All
            },
        ]);

        Ok(shaped.fetch(self.pool, &TASKS, filter).await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<TaskDetail> {
        let task = Task::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", id))?;
        self.detail(task).await
    }

    pub async fn create(&self, dto: CreateTask) -> ServiceResult<TaskDetail> {
        let task = Task::insert(self.pool, &dto).await?;
        tracing::info!(task_id = task.id, project_id = task.project_id, "Task created");
        self.detail(task).await
    }

    pub async fn update(&self, id: i32, dto: UpdateTask) -> ServiceResult<TaskDetail> {
        let task = Task::update(self.pool, id, dto)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", id))?;
        self.detail(task).await
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<bool> {
        if !Task::delete(self.pool, id).await? {
            return Err(ServiceError::not_found("Task", id));
        }
        Ok(true)
    }

    /// Renders a project's tasks to CSV and uploads the file.
    pub async fn export(&self, project_id: i32, store: &dyn ObjectStore) -> ServiceResult<ExportLink> {
        ProjectSummary::find_by_id(self.pool, project_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", project_id))?;

        let rows = Task::export_rows(self.pool, project_id).await?;
        let body = csv::render_tasks(&rows).await?;

        let key = format!("tasks/project-{}-{}.csv", project_id, Uuid::new_v4());
        let url = store.put(&key, csv::CONTENT_TYPE, body).await?;

        tracing::info!(project_id, rows = rows.len(), "Tasks exported");
        Ok(ExportLink { url })
    }

    async fn detail(&self, task: Task) -> ServiceResult<TaskDetail> {
        let executor = match task.executor_id {
            Some(id) => UserSummary::find_by_id(self.pool, id).await?,
            None => None,
        };
        let reviewer = match task.reviewer_id {
            Some(id) => UserSummary::find_by_id(self.pool, id).await?,
            None => None,
        };
        let project = ProjectSummary::find_by_id(self.pool, task.project_id).await?;

        Ok(TaskDetail {
            task,
            executor,
            reviewer,
            project,
        })
    }
}
