/// Projects and their member list
///
/// A project with no `start_date` is a *potential* project; one whose
/// `end_date` lies in the past is *finished*. Members live in the
/// `project_users` link table; tasks point at their project through
/// `tasks.project_id`.
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, dto: CreateProject) -> Result<(), sqlx::Error> {
/// let mut tx = pool.begin().await?;
/// let project = Project::insert(&mut *tx, &dto).await?;
/// Project::connect_users(&mut *tx, project.id, &[1, 2]).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use super::{nullable, push_set};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Project {
    pub id: i32,
    pub title: String,
    pub owner_id: Option<i32>,
    pub organization_id: Option<i32>,
    pub customer: Option<String>,
    pub contact_person: Option<String>,
    pub contact_data: Option<String>,
    pub director: Option<String>,
    pub description: Option<String>,
    pub technical_task: Option<String>,
    pub contract: Option<String>,
    pub contract_date: Option<DateTime<Utc>>,
    pub service_name: Option<String>,
    pub document_number: Option<String>,
    pub comment: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `{id, title}` pair used by drop-down lists and embedded references.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProjectSummary {
    pub id: i32,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub owner_id: Option<i32>,
    #[validate(length(min = 1))]
    pub customer: String,
    #[validate(length(min = 1))]
    pub contact_person: String,
    #[validate(length(min = 1))]
    pub contact_data: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub contract: Option<String>,
    pub contract_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub director: Option<String>,
    pub service_name: Option<String>,
    pub document_number: Option<String>,
    pub technical_task: Option<String>,
    pub comment: Option<String>,
    pub organization_id: Option<i32>,
    /// Existing task ids to move under the new project.
    #[serde(default)]
    pub tasks: Vec<i32>,
    /// Member user ids.
    #[serde(default)]
    pub users: Vec<i32>,
}

/// Partial update. `users` replaces the member set when non-empty.
///
/// Nullable columns take `null` to clear them; an absent field is left as is.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub owner_id: Option<Option<i32>>,
    pub customer: Option<String>,
    pub contact_person: Option<String>,
    pub contact_data: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub director: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub technical_task: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub contract: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub contract_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub service_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub document_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub comment: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub organization_id: Option<Option<i32>>,
    pub users: Option<Vec<i32>>,
}

impl Project {
    pub async fn insert<'e, E>(executor: E, data: &CreateProject) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (
                title, owner_id, organization_id, customer, contact_person, contact_data,
                director, description, technical_task, contract, contract_date,
                service_name, document_number, comment, status, start_date, end_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(data.owner_id)
        .bind(data.organization_id)
        .bind(&data.customer)
        .bind(&data.contact_person)
        .bind(&data.contact_data)
        .bind(&data.director)
        .bind(&data.description)
        .bind(&data.technical_task)
        .bind(&data.contract)
        .bind(data.contract_date)
        .bind(&data.service_name)
        .bind(&data.document_number)
        .bind(&data.comment)
        .bind(&data.status)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Writes the scalar columns of a partial update; associations are
    /// handled separately by the caller.
    pub async fn update<'e, E>(
        executor: E,
        id: i32,
        data: &UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE projects SET updated_at = NOW()");

        push_set(&mut qb, "title", data.title.clone());
        push_set(&mut qb, "owner_id", data.owner_id);
        push_set(&mut qb, "customer", data.customer.clone());
        push_set(&mut qb, "contact_person", data.contact_person.clone());
        push_set(&mut qb, "contact_data", data.contact_data.clone());
        push_set(&mut qb, "director", data.director.clone());
        push_set(&mut qb, "status", data.status.clone());
        push_set(&mut qb, "start_date", data.start_date);
        push_set(&mut qb, "end_date", data.end_date);
        push_set(&mut qb, "description", data.description.clone());
        push_set(&mut qb, "technical_task", data.technical_task.clone());
        push_set(&mut qb, "contract", data.contract.clone());
        push_set(&mut qb, "contract_date", data.contract_date);
        push_set(&mut qb, "service_name", data.service_name.clone());
        push_set(&mut qb, "document_number", data.document_number.clone());
        push_set(&mut qb, "comment", data.comment.clone());
        push_set(&mut qb, "organization_id", data.organization_id);

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Project>().fetch_optional(executor).await
    }

    /// Deletes the project row only. Tasks must be removed beforehand.
    pub async fn delete<'e, E>(executor: E, id: i32) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Member ids in ascending order.
    pub async fn user_ids<'e, E>(executor: E, id: i32) -> Result<Vec<i32>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            "SELECT user_id FROM project_users WHERE project_id = $1 ORDER BY user_id",
        )
        .bind(id)
        .fetch_all(executor)
        .await
    }

    pub async fn connect_users<'e, E>(executor: E, id: i32, users: &[i32]) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if users.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO project_users (project_id, user_id)
            SELECT $1, UNNEST($2::int4[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(users)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn disconnect_users<'e, E>(
        executor: E,
        id: i32,
        users: &[i32],
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if users.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "DELETE FROM project_users WHERE project_id = $1 AND user_id = ANY($2)",
        )
        .bind(id)
        .bind(users)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Re-parents existing tasks onto this project.
    pub async fn attach_tasks<'e, E>(executor: E, id: i32, tasks: &[i32]) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if tasks.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("UPDATE tasks SET project_id = $1, updated_at = NOW() WHERE id = ANY($2)")
            .bind(id)
            .bind(tasks)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Projects the user is a member of.
    pub async fn for_member<'e, E>(executor: E, user_id: i32) -> Result<Vec<ProjectSummary>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ProjectSummary>(
            r#"
            SELECT p.id, p.title
            FROM projects p
            JOIN project_users pu ON pu.project_id = p.id
            WHERE pu.user_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }
}

impl ProjectSummary {
    pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ProjectSummary>("SELECT id, title FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_rejects_blank_required_fields() {
        let dto: CreateProject = serde_json::from_value(serde_json::json!({
            "title": "",
            "customer": "ACME",
            "contact_person": "Olga",
            "contact_data": "+7 900 000 00 00",
            "description": "CRM rollout"
        }))
        .unwrap();

        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_create_project_defaults_empty_associations() {
        let dto: CreateProject = serde_json::from_value(serde_json::json!({
            "title": "Portal",
            "customer": "ACME",
            "contact_person": "Olga",
            "contact_data": "olga@acme.test",
            "description": "Customer portal"
        }))
        .unwrap();

        assert!(dto.validate().is_ok());
        assert!(dto.users.is_empty());
        assert!(dto.tasks.is_empty());
    }

    #[test]
    fn test_update_project_distinguishes_absent_users() {
        let absent: UpdateProject = serde_json::from_value(serde_json::json!({"title": "x"})).unwrap();
        let given: UpdateProject = serde_json::from_value(serde_json::json!({"users": [2, 3]})).unwrap();

        assert!(absent.users.is_none());
        assert_eq!(given.users, Some(vec![2, 3]));
    }

    #[test]
    fn test_update_project_null_clears_dates() {
        let dto: UpdateProject =
            serde_json::from_value(serde_json::json!({"start_date": null, "comment": "kept"})).unwrap();

        assert_eq!(dto.start_date, Some(None));
        assert_eq!(dto.end_date, None);
        assert_eq!(dto.comment, Some(Some("kept".to_string())));
    }
}
