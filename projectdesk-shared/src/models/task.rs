/// Project tasks
///
/// Every task belongs to exactly one project and optionally names an
/// executor and a reviewer. The schema has no cascading delete from projects;
/// [`Task::delete_by_project`] must run before the project row is removed.
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::models::task::{CreateTask, Task};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let task = Task::insert(&pool, &CreateTask {
///     title: "Draft the estimate".to_string(),
///     project_id: 3,
///     executor_id: Some(12),
///     ..Default::default()
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```

use super::{nullable, push_set};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_done: bool,
    pub status: Option<String>,
    pub hours: Option<f64>,
    pub comment: Option<String>,
    pub project_id: i32,
    pub executor_id: Option<i32>,
    pub reviewer_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub project_id: i32,
    pub reviewer_id: Option<i32>,
    pub executor_id: Option<i32>,
    pub status: Option<String>,
    #[validate(range(min = 0.0))]
    pub hours: Option<f64>,
    pub comment: Option<String>,
}

/// Partial update. `null` clears a nullable column, e.g. unassigns the
/// executor; an absent field is left as is.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub is_done: Option<bool>,
    pub project_id: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub reviewer_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub executor_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Option<Option<String>>,
    #[validate(range(min = 0.0))]
    #[serde(default, deserialize_with = "nullable")]
    pub hours: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub comment: Option<Option<String>>,
}

/// One spreadsheet line of a project export.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TaskExportRow {
    pub id: i32,
    pub title: String,
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub hours: Option<f64>,
    pub is_done: bool,
    pub executor: Option<String>,
    pub reviewer: Option<String>,
    pub comment: Option<String>,
}

impl Task {
    pub async fn insert<'e, E>(executor: E, data: &CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (
                title, description, start_date, end_date, project_id,
                reviewer_id, executor_id, status, hours, comment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.project_id)
        .bind(data.reviewer_id)
        .bind(data.executor_id)
        .bind(&data.status)
        .bind(data.hours)
        .bind(&data.comment)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn update<'e, E>(executor: E, id: i32, data: UpdateTask) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE tasks SET updated_at = NOW()");

        push_set(&mut qb, "title", data.title);
        push_set(&mut qb, "description", data.description);
        push_set(&mut qb, "start_date", data.start_date);
        push_set(&mut qb, "end_date", data.end_date);
        push_set(&mut qb, "is_done", data.is_done);
        push_set(&mut qb, "project_id", data.project_id);
        push_set(&mut qb, "reviewer_id", data.reviewer_id);
        push_set(&mut qb, "executor_id", data.executor_id);
        push_set(&mut qb, "status", data.status);
        push_set(&mut qb, "hours", data.hours);
        push_set(&mut qb, "comment", data.comment);

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Task>().fetch_optional(executor).await
    }

    pub async fn delete<'e, E>(executor: E, id: i32) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes every task of a project, returning how many went.
    pub async fn delete_by_project<'e, E>(executor: E, project_id: i32) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn by_project<'e, E>(executor: E, project_id: i32) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE project_id = $1 ORDER BY id")
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    pub async fn by_executor<'e, E>(executor: E, user_id: i32) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE executor_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    pub async fn by_reviewer<'e, E>(executor: E, user_id: i32) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE reviewer_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// Export lines for a project with executor and reviewer names resolved.
    pub async fn export_rows<'e, E>(executor: E, project_id: i32) -> Result<Vec<TaskExportRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskExportRow>(
            r#"
            SELECT t.id, t.title, t.status, t.start_date, t.end_date, t.hours, t.is_done,
                   NULLIF(CONCAT_WS(' ', ex.last_name, ex.first_name, ex.middle_name), '') AS executor,
                   NULLIF(CONCAT_WS(' ', rv.last_name, rv.first_name, rv.middle_name), '') AS reviewer,
                   t.comment
            FROM tasks t
            LEFT JOIN users ex ON ex.id = t.executor_id
            LEFT JOIN users rv ON rv.id = t.reviewer_id
            WHERE t.project_id = $1
            ORDER BY t.id
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_requires_title() {
        let dto = CreateTask {
            title: String::new(),
            project_id: 1,
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_negative_hours_rejected() {
        let dto = UpdateTask {
            hours: Some(Some(-1.0)),
            ..Default::default()
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("hours"));
    }
}
