use std::collections::HashMap;

use sea_orm::{DatabaseConnection, QueryOrder, prelude::*};

use crate::{
    Currency, CurrencyRegistry, Job, JobAction, JobCatalog, JobReward, Money, ResultEngine,
    currency, default_balances, job_actions, job_rewards, jobs,
};

mod accounts;
mod balances;
mod experience;
mod rewards;

pub use rewards::ActionOutcome;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Attempts before an optimistic read-compute-write loop gives up.
///
/// Conflicts only happen when two writers race on the *same* row; one retry
/// is almost always enough, the bound just keeps a pathological storm from
/// spinning forever.
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// The ledger and progression engine.
///
/// Owns no mutable in-process state: balances and experience live in the
/// database and every read goes to the store, so a committed write is
/// immediately visible to the next reader, whichever worker thread it runs
/// on. The currency registry and job catalog are immutable startup data.
///
/// Operations are safe to invoke concurrently for different accounts;
/// writes touching the same row serialize through conditional updates (see
/// the balance and experience ops).
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    currencies: CurrencyRegistry,
    jobs: JobCatalog,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The immutable currency registry loaded at startup.
    #[must_use]
    pub fn currencies(&self) -> &CurrencyRegistry {
        &self.currencies
    }

    /// The immutable job catalog loaded at startup.
    #[must_use]
    pub fn jobs(&self) -> &JobCatalog {
        &self.jobs
    }
}

/// The builder for `Engine`.
///
/// `build` loads the static catalogs (currencies, starting balances, jobs,
/// actions, rewards) from the database and validates them; a misconfigured
/// catalog (no default currency, duplicate rewards, dangling references)
/// fails here at startup rather than mid-game.
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let currency_models = currency::Entity::find()
            .order_by_asc(currency::Column::Id)
            .all(&self.database)
            .await?;
        let mut currencies = Vec::with_capacity(currency_models.len());
        for model in currency_models {
            currencies.push(Currency::try_from(model)?);
        }

        let default_models = default_balances::Entity::find().all(&self.database).await?;
        let mut starting_balances = HashMap::with_capacity(default_models.len());
        for model in default_models {
            starting_balances.insert(model.currency_id, Money::from_minor(model.amount_minor));
        }

        let registry = CurrencyRegistry::new(currencies, starting_balances)?;

        let job_models = jobs::Entity::find()
            .order_by_asc(jobs::Column::Name)
            .all(&self.database)
            .await?;
        let mut job_list = Vec::with_capacity(job_models.len());
        for model in job_models {
            job_list.push(Job::try_from(model)?);
        }

        let action_models = job_actions::Entity::find().all(&self.database).await?;
        let mut actions = Vec::with_capacity(action_models.len());
        for model in action_models {
            actions.push(JobAction::try_from(model)?);
        }

        let reward_models = job_rewards::Entity::find().all(&self.database).await?;
        let mut rewards = Vec::with_capacity(reward_models.len());
        for model in reward_models {
            let reward = JobReward::try_from(model)?;
            // Rewards are currency-denominated; a dangling currency id is a
            // configuration error.
            registry.currency(reward.currency_id)?;
            rewards.push(reward);
        }

        let catalog = JobCatalog::new(job_list, actions, rewards)?;

        Ok(Engine {
            database: self.database,
            currencies: registry,
            jobs: catalog,
        })
    }
}
