//! The reward table: money + experience payouts per (job, action, material).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, util::parse_uuid};

/// Payout configured for one job action on one target material.
///
/// `material` is an opaque key supplied by the event-detection layer (a
/// block, entity or item name); the engine never interprets it. At most one
/// reward exists per (job, action, material) triple.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReward {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_action_id: Uuid,
    pub currency_id: i32,
    pub material: String,
    pub money: Money,
    pub experience: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "job_reward")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub job_id: String,
    pub job_action_id: String,
    pub currency_id: i32,
    pub material: String,
    pub money_minor: i64,
    pub experience: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::jobs::Entity",
        from = "Column::JobId",
        to = "super::jobs::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Jobs,
    #[sea_orm(
        belongs_to = "super::job_actions::Entity",
        from = "Column::JobActionId",
        to = "super::job_actions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Actions,
}

impl Related<super::jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Jobs.def()
    }
}

impl Related<super::job_actions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for JobReward {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "job reward")?,
            job_id: parse_uuid(&model.job_id, "job")?,
            job_action_id: parse_uuid(&model.job_action_id, "job action")?,
            currency_id: model.currency_id,
            material: model.material,
            money: Money::from_minor(model.money_minor),
            experience: model.experience,
        })
    }
}
