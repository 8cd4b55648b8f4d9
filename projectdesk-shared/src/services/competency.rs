/// Competency labels and their holders.

use super::association::{diff, Mode};
use super::{ServiceError, ServiceResult};
use crate::models::competency::{Competency, CreateCompetency, UpdateCompetency};
use crate::models::user::UserSummary;
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize)]
pub struct CompetencyDetail {
    #[serde(flatten)]
    pub competency: Competency,
    pub users: Vec<UserSummary>,
}

pub struct CompetencyService<'a> {
    pool: &'a PgPool,
}

impl<'a> CompetencyService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn all(&self) -> ServiceResult<Vec<Competency>> {
        Ok(Competency::all(self.pool).await?)
    }

    /// `{id, text}` pairs. Same rows as [`all`](Self::all); kept as its own
    /// call for the drop-down endpoint.
    pub async fn titles(&self) -> ServiceResult<Vec<Competency>> {
        Ok(Competency::all(self.pool).await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<CompetencyDetail> {
        let competency = Competency::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Competency", id))?;

        Ok(CompetencyDetail {
            users: Competency::users(self.pool, id).await?,
            competency,
        })
    }

    pub async fn create(&self, dto: CreateCompetency) -> ServiceResult<Competency> {
        let mut tx = self.pool.begin().await?;

        let competency = Competency::insert(&mut *tx, dto.text.trim()).await?;
        Competency::connect_users(&mut *tx, competency.id, &dto.users).await?;

        tx.commit().await?;
        Ok(competency)
    }

    /// Renames and adds holders; existing holders are never removed.
    pub async fn update(&self, id: i32, dto: UpdateCompetency) -> ServiceResult<CompetencyDetail> {
        let mut tx = self.pool.begin().await?;

        let competency = match dto.text.as_deref() {
            Some(text) => Competency::rename(&mut *tx, id, text.trim()).await?,
            None => Competency::find_by_id(&mut *tx, id).await?,
        }
        .ok_or_else(|| ServiceError::not_found("Competency", id))?;

        let holders: Vec<i32> = Competency::users(&mut *tx, id)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();
        let changes = diff(&holders, &dto.users, Mode::Merge);
        Competency::connect_users(&mut *tx, id, &changes.connect).await?;

        let users = Competency::users(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(CompetencyDetail { competency, users })
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<bool> {
        if !Competency::delete(self.pool, id).await? {
            return Err(ServiceError::not_found("Competency", id));
        }
        Ok(true)
    }
}
