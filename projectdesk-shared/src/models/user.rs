/// User accounts
///
/// A user's `role` decides what they may access; their `status` decides which
/// profile shape they have (specialists carry projects and tasks, interns and
/// practicants carry internships).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('ADMIN', 'CUSTOMER', 'SPECIALIST', 'GUEST');
/// CREATE TYPE user_status AS ENUM ('SPECIALIST', 'INTERNSHIP', 'PRACTICE');
///
/// CREATE TABLE users (
///     id SERIAL PRIMARY KEY,
///     login TEXT NOT NULL UNIQUE,
///     password TEXT NOT NULL,
///     role user_role NOT NULL DEFAULT 'GUEST',
///     status user_status NOT NULL DEFAULT 'SPECIALIST',
///     ... profile columns ...
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::models::user::{NewUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::insert(&pool, NewUser {
///     login: "ivan@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: Some("Ivan".to_string()),
///     last_name: None,
///     middle_name: None,
/// })
/// .await?;
///
/// assert!(User::find_by_login(&pool, "ivan@example.com").await?.is_some());
/// # Ok(())
/// # }
/// ```

use super::push_set;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use std::{fmt, str::FromStr};
use validator::Validate;

/// Access role carried in the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Customer,
    Specialist,
    Guest,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Customer, Role::Specialist, Role::Guest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Customer => "CUSTOMER",
            Role::Specialist => "SPECIALIST",
            Role::Guest => "GUEST",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role: {}", s))
    }
}

/// Employment status. Independent of [`Role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    #[default]
    Specialist,
    Internship,
    Practice,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Specialist => "SPECIALIST",
            UserStatus::Internship => "INTERNSHIP",
            UserStatus::Practice => "PRACTICE",
        }
    }

    /// Whether this status is tracked through practice-type internships.
    pub fn is_practice(&self) -> bool {
        matches!(self, UserStatus::Practice)
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SPECIALIST" => Ok(UserStatus::Specialist),
            "INTERNSHIP" => Ok(UserStatus::Internship),
            "PRACTICE" => Ok(UserStatus::Practice),
            other => Err(format!("unknown user status: {}", other)),
        }
    }
}

/// Full user row. The password hash is never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub login: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub email: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "middleName")]
    pub middle_name: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub direction: Option<String>,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub rate: Option<f64>,
    pub study_group: Option<String>,
    pub plans: Option<String>,
    pub position: Option<String>,
    pub about: Option<String>,
    pub portfolio: Option<String>,
    pub note: Option<String>,
    pub inn: Option<String>,
    pub snils: Option<String>,
    pub birthday: Option<String>,
    pub passport_data: Option<String>,
    pub registration_address: Option<String>,
    pub living_address: Option<String>,
    pub requisites: Option<String>,
    pub npd_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact user reference embedded in project, task and competency details.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i32,
    pub email: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "middleName")]
    pub middle_name: Option<String>,
    pub role: Role,
}

/// Public registration payload. The login doubles as the e-mail address.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(email(message = "login must be an e-mail address"))]
    pub login: String,
    #[serde(rename = "firstName")]
    #[validate(length(max = 255))]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    #[validate(length(max = 255))]
    pub last_name: Option<String>,
    #[serde(rename = "middleName")]
    #[validate(length(max = 255))]
    pub middle_name: Option<String>,
}

/// Row values for [`User::insert`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
}

/// Partial profile update. Absent fields stay untouched.
///
/// `competencies` is a `", "`-separated list of labels and is applied by the
/// user service, not stored on the row.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "middleName")]
    pub middle_name: Option<String>,
    #[validate(length(min = 5, max = 32))]
    pub phone: Option<String>,
    pub telegram: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub login: Option<String>,
    pub role: Option<Role>,
    #[validate(range(min = 0.0))]
    pub rate: Option<f64>,
    pub status: Option<UserStatus>,
    pub direction: Option<String>,
    pub competencies: Option<String>,
    pub study_group: Option<String>,
    pub plans: Option<String>,
    pub position: Option<String>,
    pub about: Option<String>,
    pub portfolio: Option<String>,
    pub note: Option<String>,
    pub inn: Option<String>,
    pub snils: Option<String>,
    pub birthday: Option<String>,
    pub passport_data: Option<String>,
    pub registration_address: Option<String>,
    pub living_address: Option<String>,
    pub requisites: Option<String>,
    pub npd_reference: Option<String>,
}

impl User {
    /// Inserts a guest account whose e-mail equals its login.
    pub async fn insert<'e, E>(executor: E, data: NewUser) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, password, email, first_name, last_name, middle_name, role)
            VALUES ($1, $2, $1, $3, $4, $5, 'GUEST')
            RETURNING *
            "#,
        )
        .bind(data.login)
        .bind(data.password_hash)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.middle_name)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_login<'e, E>(executor: E, login: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE login = $1")
            .bind(login)
            .fetch_optional(executor)
            .await
    }

    /// Applies the scalar part of a partial update.
    ///
    /// Returns `None` when no user has the given id.
    pub async fn update<'e, E>(
        executor: E,
        id: i32,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = NOW()");

        push_set(&mut qb, "first_name", data.first_name);
        push_set(&mut qb, "last_name", data.last_name);
        push_set(&mut qb, "middle_name", data.middle_name);
        push_set(&mut qb, "phone", data.phone);
        push_set(&mut qb, "telegram", data.telegram);
        push_set(&mut qb, "email", data.email);
        push_set(&mut qb, "login", data.login);
        push_set(&mut qb, "role", data.role);
        push_set(&mut qb, "rate", data.rate);
        push_set(&mut qb, "status", data.status);
        push_set(&mut qb, "direction", data.direction);
        push_set(&mut qb, "study_group", data.study_group);
        push_set(&mut qb, "plans", data.plans);
        push_set(&mut qb, "position", data.position);
        push_set(&mut qb, "about", data.about);
        push_set(&mut qb, "portfolio", data.portfolio);
        push_set(&mut qb, "note", data.note);
        push_set(&mut qb, "inn", data.inn);
        push_set(&mut qb, "snils", data.snils);
        push_set(&mut qb, "birthday", data.birthday);
        push_set(&mut qb, "passport_data", data.passport_data);
        push_set(&mut qb, "registration_address", data.registration_address);
        push_set(&mut qb, "living_address", data.living_address);
        push_set(&mut qb, "requisites", data.requisites);
        push_set(&mut qb, "npd_reference", data.npd_reference);

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<User>().fetch_optional(executor).await
    }

    /// Replaces the stored password hash. `false` if the user does not exist.
    pub async fn set_password<'e, E>(executor: E, id: i32, hash: &str) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("UPDATE users SET password = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            middle_name: self.middle_name.clone(),
            role: self.role,
        }
    }
}

impl UserSummary {
    pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, email, first_name, last_name, middle_name, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Members of a project, ordered by id.
    pub async fn for_project<'e, E>(executor: E, project_id: i32) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.email, u.first_name, u.last_name, u.middle_name, u.role
            FROM users u
            JOIN project_users pu ON pu.user_id = u.id
            WHERE pu.project_id = $1
            ORDER BY u.id
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await
    }
}
