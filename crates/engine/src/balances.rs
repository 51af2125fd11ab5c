//! Per-account, per-currency balance rows.
//!
//! A `Balance` is the exact amount one account holds in one currency. There
//! is at most one row per (account, currency) pair; the ledger ops in
//! [`ops`](crate::ops) are the only code that mutates `amount`.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, util::parse_uuid};

/// Snapshot of one balance row.
///
/// Amounts are integer minor units ([`Money`]); the scale comes from the
/// owning currency's `fraction_digits`. Never negative once persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub id: Uuid,
    pub account_id: Uuid,
    pub currency_id: i32,
    pub amount: Money,
}

impl Balance {
    pub(crate) fn new(account_id: Uuid, currency_id: i32, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            currency_id,
            amount,
        }
    }
}

/// Receipt for a completed deposit.
///
/// `notify` is a pass-through hint for the presentation layer (whether the
/// player should be told about the credit); the engine records it and does
/// nothing else with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub account_id: Uuid,
    pub currency_id: i32,
    pub amount: Money,
    pub new_balance: Money,
    pub notify: bool,
}

/// Receipt for a completed transfer: both post-transfer balances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub currency_id: i32,
    pub amount: Money,
    pub from_balance: Money,
    pub to_balance: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "balance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub currency_id: i32,
    pub amount_minor: i64,
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
        belongs_to = "super::currency::Entity",
        from = "Column::CurrencyId",
        to = "super::currency::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Currency,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::currency::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currency.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Balance {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "balance")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            currency_id: model.currency_id,
            amount: Money::from_minor(model.amount_minor),
        })
    }
}

impl From<&Balance> for ActiveModel {
    fn from(value: &Balance) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            account_id: ActiveValue::Set(value.account_id.to_string()),
            currency_id: ActiveValue::Set(value.currency_id),
            amount_minor: ActiveValue::Set(value.amount.minor()),
        }
    }
}
