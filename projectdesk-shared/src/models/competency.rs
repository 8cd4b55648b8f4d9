/// Competencies: unique skill labels linked to users through
/// `competency_users`.

use super::user::UserSummary;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Competency {
    pub id: i32,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCompetency {
    #[validate(length(min = 1, max = 255))]
    pub text: String,
    #[serde(default)]
    pub users: Vec<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCompetency {
    #[validate(length(min = 1, max = 255))]
    pub text: Option<String>,
    /// Users to add; existing links are kept.
    #[serde(default)]
    pub users: Vec<i32>,
}

impl Competency {
    pub async fn all<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Competency>("SELECT id, text FROM competencies ORDER BY id")
            .fetch_all(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Competency>("SELECT id, text FROM competencies WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn insert<'e, E>(executor: E, text: &str) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Competency>("INSERT INTO competencies (text) VALUES ($1) RETURNING id, text")
            .bind(text)
            .fetch_one(executor)
            .await
    }

    /// Returns the competency labelled `text`, creating it if needed.
    pub async fn find_or_create<'e, E>(executor: E, text: &str) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Competency>(
            r#"
            INSERT INTO competencies (text) VALUES ($1)
            ON CONFLICT (text) DO UPDATE SET text = EXCLUDED.text
            RETURNING id, text
            "#,
        )
        .bind(text)
        .fetch_one(executor)
        .await
    }

    pub async fn rename<'e, E>(executor: E, id: i32, text: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Competency>("UPDATE competencies SET text = $2 WHERE id = $1 RETURNING id, text")
            .bind(id)
            .bind(text)
            .fetch_optional(executor)
            .await
    }

    pub async fn delete<'e, E>(executor: E, id: i32) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM competencies WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn users<'e, E>(executor: E, id: i32) -> Result<Vec<UserSummary>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.email, u.first_name, u.last_name, u.middle_name, u.role
            FROM users u
            JOIN competency_users cu ON cu.user_id = u.id
            WHERE cu.competency_id = $1
            ORDER BY u.id
            "#,
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
            INSERT INTO competency_users (competency_id, user_id)
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

    /// Competencies held by a user, ordered by id.
    pub async fn for_user<'e, E>(executor: E, user_id: i32) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Competency>(
            r#"
            SELECT c.id, c.text
            FROM competencies c
            JOIN competency_users cu ON cu.competency_id = c.id
            WHERE cu.user_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    pub async fn link_user<'e, E>(executor: E, id: i32, user_id: i32) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO competency_users (competency_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn unlink_user<'e, E>(executor: E, ids: &[i32], user_id: i32) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "DELETE FROM competency_users WHERE user_id = $1 AND competency_id = ANY($2)",
        )
        .bind(user_id)
        .bind(ids)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
