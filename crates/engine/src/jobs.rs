//! Jobs and the process-lifetime job catalog.

use std::collections::HashMap;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, JobAction, JobReward, ResultEngine,
    util::parse_uuid,
};

/// A trackable in-game role (miner, lumberjack, ...) with its own
/// experience/level track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub name: String,
}

/// Immutable lookup table over jobs, job actions and the reward table.
///
/// Built once by the engine builder from the `job`, `job_action` and
/// `job_reward` tables; read-only for the lifetime of the server session.
/// The reward table is keyed by (action, material): most materials grant
/// nothing, so a miss is the common case and not an error.
#[derive(Debug)]
pub struct JobCatalog {
    jobs: Vec<Job>,
    actions: Vec<JobAction>,
    rewards: HashMap<(Uuid, String), JobReward>,
}

impl JobCatalog {
    pub(crate) fn new(
        mut jobs: Vec<Job>,
        actions: Vec<JobAction>,
        rewards: Vec<JobReward>,
    ) -> ResultEngine<Self> {
        jobs.sort_by(|a, b| a.name.cmp(&b.name));

        let mut reward_table = HashMap::with_capacity(rewards.len());
        for reward in rewards {
            if !jobs.iter().any(|job| job.id == reward.job_id) {
                return Err(EngineError::KeyNotFound(format!(
                    "job {} (referenced by reward {})",
                    reward.job_id, reward.id
                )));
            }
            if !actions.iter().any(|action| action.id == reward.job_action_id) {
                return Err(EngineError::KeyNotFound(format!(
                    "job action {} (referenced by reward {})",
                    reward.job_action_id, reward.id
                )));
            }
            if reward.money.is_negative() || reward.experience < 0 {
                return Err(EngineError::InvalidAmount(format!(
                    "reward {} must not grant negative money or experience",
                    reward.id
                )));
            }

            let key = (reward.job_action_id, reward.material.clone());
            if reward_table.insert(key, reward).is_some() {
                return Err(EngineError::ExistingKey(
                    "duplicate reward for the same action and material".to_string(),
                ));
            }
        }

        Ok(Self {
            jobs,
            actions,
            rewards: reward_table,
        })
    }

    /// Look up a job by id.
    pub fn job(&self, id: Uuid) -> ResultEngine<&Job> {
        self.jobs
            .iter()
            .find(|job| job.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("job {id}")))
    }

    /// Look up a job by name.
    pub fn job_by_name(&self, name: &str) -> ResultEngine<&Job> {
        self.jobs
            .iter()
            .find(|job| job.name == name)
            .ok_or_else(|| EngineError::KeyNotFound(format!("job '{name}'")))
    }

    /// Look up an action kind ("break", "place", "kill", "fish") by name.
    ///
    /// A miss means the action kind is not tracked at all; the reward
    /// orchestrator treats that as "nothing to do", not as a fault.
    pub fn action_by_name(&self, name: &str) -> ResultEngine<&JobAction> {
        self.actions
            .iter()
            .find(|action| action.name == name)
            .ok_or_else(|| EngineError::KeyNotFound(format!("job action '{name}'")))
    }

    /// Reward configured for an action on a material, if any.
    #[must_use]
    pub fn reward_for(&self, action_id: Uuid, material: &str) -> Option<&JobReward> {
        self.rewards.get(&(action_id, material.to_string()))
    }

    /// All known jobs, ordered by name.
    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "job")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::job_rewards::Entity")]
    Rewards,
    #[sea_orm(has_many = "super::job_experience::Entity")]
    Experience,
}

impl Related<super::job_rewards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rewards.def()
    }
}

impl Related<super::job_experience::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Experience.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Job {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "job")?,
            name: model.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Money;

    use super::*;

    fn catalog() -> JobCatalog {
        let miner = Job {
            id: Uuid::new_v4(),
            name: "miner".to_string(),
        };
        let break_action = JobAction {
            id: Uuid::new_v4(),
            name: "break".to_string(),
        };
        let reward = JobReward {
            id: Uuid::new_v4(),
            job_id: miner.id,
            job_action_id: break_action.id,
            currency_id: 1,
            material: "coal_ore".to_string(),
            money: Money::from_minor(25),
            experience: 5,
        };
        JobCatalog::new(vec![miner], vec![break_action], vec![reward]).unwrap()
    }

    #[test]
    fn reward_lookup_misses_are_not_errors() {
        let catalog = catalog();
        let action = catalog.action_by_name("break").unwrap();
        assert!(catalog.reward_for(action.id, "coal_ore").is_some());
        assert!(catalog.reward_for(action.id, "dirt").is_none());
    }

    #[test]
    fn unknown_action_is_key_not_found() {
        let catalog = catalog();
        assert!(matches!(
            catalog.action_by_name("swim"),
            Err(EngineError::KeyNotFound(_))
        ));
    }

    #[test]
    fn duplicate_rewards_are_rejected() {
        let miner = Job {
            id: Uuid::new_v4(),
            name: "miner".to_string(),
        };
        let break_action = JobAction {
            id: Uuid::new_v4(),
            name: "break".to_string(),
        };
        let reward = JobReward {
            id: Uuid::new_v4(),
            job_id: miner.id,
            job_action_id: break_action.id,
            currency_id: 1,
            material: "coal_ore".to_string(),
            money: Money::from_minor(25),
            experience: 5,
        };
        let mut duplicate = reward.clone();
        duplicate.id = Uuid::new_v4();

        let err = JobCatalog::new(vec![miner], vec![break_action], vec![reward, duplicate])
            .unwrap_err();
        assert!(matches!(err, EngineError::ExistingKey(_)));
    }

    #[test]
    fn rewards_must_reference_known_jobs() {
        let break_action = JobAction {
            id: Uuid::new_v4(),
            name: "break".to_string(),
        };
        let reward = JobReward {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            job_action_id: break_action.id,
            currency_id: 1,
            material: "coal_ore".to_string(),
            money: Money::from_minor(25),
            experience: 5,
        };
        let err = JobCatalog::new(Vec::new(), vec![break_action], vec![reward]).unwrap_err();
        assert!(matches!(err, EngineError::KeyNotFound(_)));
    }
}
