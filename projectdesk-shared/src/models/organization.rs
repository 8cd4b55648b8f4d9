/// Customer organizations.
///
/// Organizations are managed outside this service; they are read here only
/// to scope what a customer may see. A customer sees a project when they are
/// the contact person of the project's organization.

use serde::Serialize;
use sqlx::PgExecutor;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Organization {
    pub id: i32,
    pub title: String,
    pub contact_person_id: Option<i32>,
}

impl Organization {
    pub async fn insert<'e, E>(
        executor: E,
        title: &str,
        contact_person_id: Option<i32>,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (title, contact_person_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(title)
        .bind(contact_person_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}
