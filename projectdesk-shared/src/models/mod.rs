/// Persistent entities and their storage operations
///
/// Each model is a `sqlx::FromRow` struct with associated functions that
/// take any Postgres executor, so the same call works against the pool or
/// inside an open transaction (`&mut *tx`).
///
/// # Models
///
/// - `user`: accounts, roles and profile attributes
/// - `organization`: customer organizations and their contact person
/// - `project`: projects and their assigned users
/// - `task`: project tasks with executor and reviewer
/// - `competency`: skill labels linked to users
/// - `internship`: internship and practice periods of a user
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::models::project::Project;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// if let Some(project) = Project::find_by_id(&pool, 7).await? {
///     let members = Project::user_ids(&pool, project.id).await?;
///     println!("{} has {} members", project.title, members.len());
/// }
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Deserializer};
use sqlx::{Postgres, QueryBuilder};

pub mod competency;
pub mod internship;
pub mod organization;
pub mod project;
pub mod task;
pub mod user;

/// Appends `, column = $n` to an `UPDATE ... SET` statement when the partial
/// update carries a value for `column`. For a nullable column `T` is itself
/// an `Option`, and `Some(None)` writes NULL.
pub(crate) fn push_set<'args, T>(
    qb: &mut QueryBuilder<'args, Postgres>,
    column: &str,
    value: Option<T>,
) where
    T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send,
{
    if let Some(value) = value {
        qb.push(", ").push(column).push(" = ").push_bind(value);
    }
}

/// Field deserializer for nullable columns in partial updates: `null` becomes
/// `Some(None)`. Use with `#[serde(default)]` so an absent field stays `None`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        executor_id: Option<Option<i32>>,
    }

    #[test]
    fn test_nullable_separates_absent_from_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"executor_id": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"executor_id": 4}"#).unwrap();

        assert_eq!(absent.executor_id, None);
        assert_eq!(cleared.executor_id, Some(None));
        assert_eq!(set.executor_id, Some(Some(4)));
    }

    #[test]
    fn test_push_set_binds_null_for_cleared_column() {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE tasks SET updated_at = NOW()");
        push_set(&mut qb, "reviewer_id", None::<Option<i32>>);
        push_set(&mut qb, "executor_id", Some(None::<i32>));

        assert_eq!(qb.sql(), "UPDATE tasks SET updated_at = NOW(), executor_id = $1");
    }

    #[test]
    fn test_push_set_skips_absent_values() {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = NOW()");
        push_set(&mut qb, "phone", None::<String>);
        push_set(&mut qb, "telegram", Some("@desk".to_string()));
        push_set(&mut qb, "rate", Some(12.5_f64));

        assert_eq!(
            qb.sql(),
            "UPDATE users SET updated_at = NOW(), telegram = $1, rate = $2"
        );
    }
}
