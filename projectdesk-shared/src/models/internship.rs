/// Internship and practice periods.
///
/// `is_practice` separates the two programmes; a user with status
/// `PRACTICE` is tracked through practice rows, an `INTERNSHIP` user through
/// the others. Stage filters compare `end_date` against the current time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Internship {
    pub id: i32,
    pub user_id: i32,
    #[serde(rename = "isPractice")]
    pub is_practice: bool,
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInternship {
    pub user_id: i32,
    pub is_practice: bool,
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Internship {
    pub async fn insert<'e, E>(executor: E, data: NewInternship) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Internship>(
            r#"
            INSERT INTO internships (user_id, is_practice, status, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.is_practice)
        .bind(data.status)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(executor)
        .await
    }

    pub async fn for_user<'e, E>(executor: E, user_id: i32) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Internship>(
            "SELECT * FROM internships WHERE user_id = $1 ORDER BY start_date NULLS LAST, id",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }
}
