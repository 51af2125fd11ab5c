//! Per-account, per-job experience rows.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    leveling::{experience_for_level, level_for_experience, next_level_experience},
    util::parse_uuid,
};

/// Snapshot of one experience row.
///
/// `experience` only ever grows. The level is derived, never stored; see
/// [`level_for_experience`](crate::level_for_experience).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobExperience {
    pub id: Uuid,
    pub account_id: Uuid,
    pub job_id: Uuid,
    pub experience: i64,
}

impl JobExperience {
    pub(crate) fn new(account_id: Uuid, job_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            job_id,
            experience: 0,
        }
    }

    /// Current level for this row's experience total.
    #[must_use]
    pub fn level(&self) -> u32 {
        level_for_experience(self.experience)
    }

    /// Experience total at which the next level is reached.
    #[must_use]
    pub fn next_level_experience(&self) -> i64 {
        next_level_experience(self.level())
    }

    /// Experience floor of the current level (for progress bars).
    #[must_use]
    pub fn level_base_experience(&self) -> i64 {
        experience_for_level(self.level())
    }
}

/// Result of applying an experience delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Experience total after the write.
    pub experience: i64,
    /// Level derived from the new total.
    pub level: u32,
    /// Whether the delta crossed at least one level boundary.
    pub leveled_up: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "job_experience")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub job_id: String,
    pub experience: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::jobs::Entity",
        from = "Column::JobId",
        to = "super::jobs::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Jobs,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Jobs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for JobExperience {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "job experience")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            job_id: parse_uuid(&model.job_id, "job")?,
            experience: model.experience,
        })
    }
}

impl From<&JobExperience> for ActiveModel {
    fn from(value: &JobExperience) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            account_id: ActiveValue::Set(value.account_id.to_string()),
            job_id: ActiveValue::Set(value.job_id.to_string()),
            experience: ActiveValue::Set(value.experience),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_level_tracks_experience() {
        let mut row = JobExperience::new(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(row.level(), 1);
        assert_eq!(row.level_base_experience(), 0);
        assert_eq!(row.next_level_experience(), 50);

        row.experience = 50;
        assert_eq!(row.level(), 2);
        assert_eq!(row.level_base_experience(), 50);
        assert_eq!(row.next_level_experience(), 197);
    }
}
