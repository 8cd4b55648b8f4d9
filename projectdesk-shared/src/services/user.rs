/// User accounts and profiles
///
/// Listings are shaped by status ([`UserShape`]) and profiles by role and
/// status ([`ProfileShape`]); both variants carry a static field template so
/// the password hash is never selected. Account creation generates an initial
/// password, stores only its hash and mails the plain value to the new user.
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::services::user::{UserListQuery, UserService};
/// use projectdesk_shared::auth::password::PasswordCost;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let service = UserService::new(&pool, PasswordCost::default());
/// let interns = service
///     .list_by_status(&UserListQuery {
///         status: Some("INTERNSHIP".into()),
///         stage: Some("ACTIVE".into()),
///         ..Default::default()
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```

use super::association::{diff, Mode};
use super::{blocking, ServiceError, ServiceResult};
use crate::auth::middleware::Identity;
use crate::auth::password::{generate_password, hash_password, verify_password, PasswordCost};
use crate::models::competency::Competency;
use crate::models::internship::Internship;
use crate::models::project::{Project, ProjectSummary};
use crate::models::task::Task;
use crate::models::user::{CreateUser, NewUser, Role, UpdateUser, User, UserStatus};
use crate::notify::{Mail, Mailer};
use crate::query::catalog::{USER_ALIAS, USER_LIST_ITEM, USER_NAME_SEARCH, USER_TABLE};
use crate::query::predicate::{Predicate, Relation, Value};
use crate::query::projection::split_list;
use crate::query::search::search_predicate;
use crate::query::{InternshipStage, ListParams, ListQuery, OrderBy, ProfileShape, Shaped, UserShape};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

/// Query string of the status listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub status: Option<String>,
    pub fields: Option<String>,
    pub order_desc: Option<String>,
    pub stage: Option<String>,
    pub search: Option<String>,
    /// Comma-separated competency labels.
    pub competencies: Option<String>,
}

impl UserListQuery {
    fn list_params(&self) -> ListParams {
        ListParams {
            fields: self.fields.clone(),
            order_desc: self.order_desc.clone(),
            search: self.search.clone(),
            stage: self.stage.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConfirmPassword {
    #[serde(rename = "oldPassword")]
    #[validate(length(min = 1))]
    pub old_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePassword {
    #[serde(rename = "newPassword")]
    #[validate(length(min = 1))]
    pub new_password: String,
    #[serde(rename = "newPasswordConfirm")]
    #[validate(length(min = 1))]
    pub new_password_confirm: String,
}

/// Where account e-mails come from and point to.
#[derive(Debug, Clone)]
pub struct Welcome {
    pub from: String,
    pub platform_url: String,
}

/// A user with every relation resolved.
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub competencies: Vec<Competency>,
    pub projects: Vec<ProjectSummary>,
    pub tasks: Vec<Task>,
    pub review_tasks: Vec<Task>,
    pub internships: Vec<Internship>,
}

/// A user after an update, with the resulting competency set.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedUser {
    #[serde(flatten)]
    pub user: User,
    pub competencies: Vec<Competency>,
}

/// Splits the `", "`-separated competency text of an update.
pub fn competency_labels(input: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for label in input.split(", ").map(str::trim).filter(|l| !l.is_empty()) {
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    labels
}

pub struct UserService<'a> {
    pool: &'a PgPool,
    cost: PasswordCost,
}

impl<'a> UserService<'a> {
    pub fn new(pool: &'a PgPool, cost: PasswordCost) -> Self {
        Self { pool, cost }
    }

    /// Specialist-role users of one status. Unknown statuses list specialists.
    pub async fn list_by_status(&self, query: &UserListQuery) -> ServiceResult<Vec<serde_json::Value>> {
        let status: UserStatus = query
            .status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let catalog = UserShape::for_status(status).catalog();
        let shaped = Shaped::from_params(&query.list_params(), &catalog);

        let mut filter = vec![
            Predicate::eq("role", Value::Role(Role::Specialist)),
            Predicate::eq("status", Value::Status(status)),
        ];
        if status != UserStatus::Specialist {
            filter.push(InternshipStage::parse(query.stage.as_deref()).predicate(status));
        }

        let competencies: Vec<String> = split_list(query.competencies.as_deref())
            .map(String::from)
            .collect();
        if !competencies.is_empty() && shaped.projection.includes("competencies", catalog.wide) {
            filter.push(Predicate::some(
                Relation::UserCompetencies,
                Predicate::In {
                    column: "text",
                    values: competencies,
                },
            ));
        }

        Ok(shaped.fetch(self.pool, &catalog, Predicate::and(filter)).await?)
    }

    /// `{id, firstName, lastName, middleName, role}` for name drop-downs.
    pub async fn list_names(&self, search: Option<&str>) -> ServiceResult<Vec<serde_json::Value>> {
        let fields: Vec<_> = USER_LIST_ITEM.iter().collect();
        let predicate = search_predicate(search, USER_NAME_SEARCH);

        let rows = ListQuery {
            table: USER_TABLE,
            alias: USER_ALIAS,
            fields: &fields,
            predicate: &predicate,
            order: &OrderBy::default(),
        }
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Users holding `role`, with projection and sort.
    pub async fn list_by_role(&self, role: Role, params: &ListParams) -> ServiceResult<Vec<serde_json::Value>> {
        let catalog = UserShape::Specialist.catalog();
        let shaped = Shaped {
            search: Predicate::All,
            ..Shaped::from_params(params, &catalog)
        };

        Ok(shaped
            .fetch(self.pool, &catalog, Predicate::eq("role", Value::Role(role)))
            .await?)
    }

    /// The caller's own profile in the shape their role and status call for.
    pub async fn profile(&self, identity: &Identity) -> ServiceResult<serde_json::Value> {
        let shape = ProfileShape::for_identity(identity.role, identity.status);
        let fields: Vec<_> = shape.fields().iter().collect();
        let predicate = Predicate::eq("id", Value::Int(identity.id));

        ListQuery {
            table: USER_TABLE,
            alias: USER_ALIAS,
            fields: &fields,
            predicate: &predicate,
            order: &OrderBy::default(),
        }
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("User", identity.id))
    }

    pub async fn get_by_id(&self, id: i32) -> ServiceResult<UserDetail> {
        let user = User::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        Ok(UserDetail {
            competencies: Competency::for_user(self.pool, id).await?,
            projects: Project::for_member(self.pool, id).await?,
            tasks: Task::by_executor(self.pool, id).await?,
            review_tasks: Task::by_reviewer(self.pool, id).await?,
            internships: Internship::for_user(self.pool, id).await?,
            user,
        })
    }

    /// Creates a guest account and mails its generated password. The account
    /// is committed only once the mail has gone out.
    pub async fn create(&self, dto: CreateUser, mailer: &dyn Mailer, welcome: &Welcome) -> ServiceResult<User> {
        if User::find_by_login(self.pool, &dto.login).await?.is_some() {
            return Err(ServiceError::UserExists);
        }

        let password = generate_password();
        let cost = self.cost;
        let plain = password.clone();
        let password_hash = blocking(move || hash_password(&plain, &cost)).await?;

        let mut tx = self.pool.begin().await?;

        let user = User::insert(
            &mut *tx,
            NewUser {
                login: dto.login,
                password_hash,
                first_name: dto.first_name,
                last_name: dto.last_name,
                middle_name: dto.middle_name,
            },
        )
        .await?;

        mailer
            .send(Mail::login_details(
                &welcome.from,
                &user.login,
                user.first_name.as_deref(),
                &password,
                &welcome.platform_url,
            ))
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Partial update. A non-empty competency list replaces the user's
    /// competencies by label within the same transaction.
    pub async fn update(&self, id: i32, mut dto: UpdateUser) -> ServiceResult<UpdatedUser> {
        let labels = dto
            .competencies
            .take()
            .map(|text| competency_labels(&text))
            .unwrap_or_default();

        let mut tx = self.pool.begin().await?;

        if !labels.is_empty() {
            let current = Competency::for_user(&mut *tx, id).await?;
            let current_labels: Vec<String> = current.iter().map(|c| c.text.clone()).collect();
            let changes = diff(&current_labels, &labels, Mode::Replace);

            for label in &changes.connect {
                let competency = Competency::find_or_create(&mut *tx, label).await?;
                Competency::link_user(&mut *tx, competency.id, id).await?;
            }

            let removed: Vec<i32> = current
                .iter()
                .filter(|c| changes.disconnect.contains(&c.text))
                .map(|c| c.id)
                .collect();
            Competency::unlink_user(&mut *tx, &removed, id).await?;

            tracing::debug!(
                user_id = id,
                added = changes.connect.len(),
                removed = removed.len(),
                "Reconciled competencies"
            );
        }

        let user = User::update(&mut *tx, id, dto)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        let competencies = Competency::for_user(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(UpdatedUser { user, competencies })
    }

    /// Whether `old_password` matches the stored hash.
    pub async fn confirm_password(&self, id: i32, dto: ConfirmPassword) -> ServiceResult<bool> {
        let user = User::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        let hash = user.password;
        blocking(move || verify_password(&dto.old_password, &hash)).await
    }

    pub async fn change_password(&self, id: i32, dto: ChangePassword) -> ServiceResult<bool> {
        if dto.new_password != dto.new_password_confirm {
            return Err(ServiceError::PasswordConfirmation);
        }

        let cost = self.cost;
        let hash = blocking(move || hash_password(&dto.new_password, &cost)).await?;

        if !User::set_password(self.pool, id, &hash).await? {
            return Err(ServiceError::not_found("User", id));
        }

        tracing::info!(user_id = id, "Password changed");
        Ok(true)
    }
}
