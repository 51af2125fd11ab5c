use std::collections::HashSet;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    EngineError, JobExperience, LevelProgress, ResultEngine, job_experience,
    leveling::level_for_experience,
};

use super::{Engine, MAX_WRITE_ATTEMPTS, with_tx};

impl Engine {
    /// Experience row of an account for one job.
    ///
    /// The row must have been provisioned (at account creation, via
    /// [`create_experience_rows`](Engine::create_experience_rows)); a
    /// missing row is `KeyNotFound`.
    pub async fn experience(&self, account_id: Uuid, job_id: Uuid) -> ResultEngine<JobExperience> {
        self.jobs().job(job_id)?;

        let model = self.find_experience_row(account_id, job_id).await?;
        JobExperience::try_from(model)
    }

    /// All experience rows of an account, one per provisioned job.
    pub async fn all_experience(&self, account_id: Uuid) -> ResultEngine<Vec<JobExperience>> {
        let models = job_experience::Entity::find()
            .filter(job_experience::Column::AccountId.eq(account_id.to_string()))
            .order_by_asc(job_experience::Column::JobId)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(JobExperience::try_from(model)?);
        }
        Ok(out)
    }

    /// Apply a non-negative experience delta and report level movement.
    ///
    /// The write is optimistic: read the current total, compute the new one,
    /// then update only if the row still holds the value that was read,
    /// retrying on conflict. Level-before and level-after derive from that
    /// same snapshot, so a concurrent add can never make a level-up
    /// disappear or double-report.
    pub async fn add_experience(
        &self,
        account_id: Uuid,
        job_id: Uuid,
        delta: i64,
    ) -> ResultEngine<LevelProgress> {
        if delta < 0 {
            return Err(EngineError::InvalidAmount(
                "experience delta must be >= 0".to_string(),
            ));
        }
        self.jobs().job(job_id)?;

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let model = self.find_experience_row(account_id, job_id).await?;
            let current = model.experience;
            let updated = current.checked_add(delta).ok_or_else(|| {
                EngineError::InvalidAmount("experience overflows the counter".to_string())
            })?;

            let level_before = level_for_experience(current);
            let level_after = level_for_experience(updated);

            let result = job_experience::Entity::update_many()
                .col_expr(job_experience::Column::Experience, Expr::value(updated))
                .filter(job_experience::Column::Id.eq(model.id.clone()))
                .filter(job_experience::Column::Experience.eq(current))
                .exec(&self.database)
                .await?;

            if result.rows_affected == 1 {
                return Ok(LevelProgress {
                    experience: updated,
                    level: level_after,
                    leveled_up: level_after > level_before,
                });
            }
        }

        Err(EngineError::WriteConflict(format!(
            "add experience (account: {account_id}, job: {job_id})"
        )))
    }

    /// Seed one zero-experience row per catalog job for an account.
    ///
    /// Idempotent: jobs that already have a row are left untouched, so
    /// calling this again (or after new jobs were added to the catalog)
    /// only fills the gaps.
    pub async fn create_experience_rows(&self, account_id: Uuid) -> ResultEngine<()> {
        if !self.has_account(account_id).await? {
            return Err(EngineError::KeyNotFound(format!("account {account_id}")));
        }

        with_tx!(self, |db_tx| {
            let existing: HashSet<String> = job_experience::Entity::find()
                .filter(job_experience::Column::AccountId.eq(account_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| model.job_id)
                .collect();

            for job in self.jobs().jobs() {
                if existing.contains(&job.id.to_string()) {
                    continue;
                }
                let row = JobExperience::new(account_id, job.id);
                job_experience::ActiveModel::from(&row).insert(&db_tx).await?;
            }

            Ok(())
        })
    }

    async fn find_experience_row(
        &self,
        account_id: Uuid,
        job_id: Uuid,
    ) -> ResultEngine<job_experience::Model> {
        job_experience::Entity::find()
            .filter(job_experience::Column::AccountId.eq(account_id.to_string()))
            .filter(job_experience::Column::JobId.eq(job_id.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| {
                EngineError::KeyNotFound(format!(
                    "job experience (account: {account_id}, job: {job_id})"
                ))
            })
    }
}
