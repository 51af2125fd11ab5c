//! Initial schema migration - creates all tables from scratch.
//!
//! The complete schema for the economy engine:
//!
//! - `currency`: known currencies and their display format
//! - `default_balance`: configured starting amount per currency
//! - `account`: one ledger identity per player
//! - `balance`: one row per (account, currency), integer minor units
//! - `job`: trackable in-game roles
//! - `job_action`: trackable action kinds (break, place, kill, fish)
//! - `job_reward`: money/experience payout per (job, action, material)
//! - `job_experience`: one experience counter per (account, job)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Currency {
    Table,
    Id,
    NameSingular,
    NamePlural,
    Symbol,
    FractionDigits,
    IsDefault,
}

#[derive(Iden)]
enum DefaultBalance {
    Table,
    Id,
    CurrencyId,
    AmountMinor,
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
    CreatedAt,
}

#[derive(Iden)]
enum Balance {
    Table,
    Id,
    AccountId,
    CurrencyId,
    AmountMinor,
}

#[derive(Iden)]
enum Job {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum JobAction {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum JobReward {
    Table,
    Id,
    JobId,
    JobActionId,
    CurrencyId,
    Material,
    MoneyMinor,
    Experience,
}

#[derive(Iden)]
enum JobExperience {
    Table,
    Id,
    AccountId,
    JobId,
    Experience,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Currency + starting balances
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Currency::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Currency::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Currency::NameSingular).string().not_null())
                    .col(ColumnDef::new(Currency::NamePlural).string().not_null())
                    .col(ColumnDef::new(Currency::Symbol).string().not_null())
                    .col(
                        ColumnDef::new(Currency::FractionDigits)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Currency::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DefaultBalance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DefaultBalance::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DefaultBalance::CurrencyId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DefaultBalance::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-default_balance-currency_id")
                            .from(DefaultBalance::Table, DefaultBalance::CurrencyId)
                            .to(Currency::Table, Currency::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-default_balance-currency_id-unique")
                    .table(DefaultBalance::Table)
                    .col(DefaultBalance::CurrencyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Account::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Account::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Balances
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Balance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Balance::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Balance::AccountId).string().not_null())
                    .col(ColumnDef::new(Balance::CurrencyId).integer().not_null())
                    .col(
                        ColumnDef::new(Balance::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balance-account_id")
                            .from(Balance::Table, Balance::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balance-currency_id")
                            .from(Balance::Table, Balance::CurrencyId)
                            .to(Currency::Table, Currency::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-balance-account_id-currency_id-unique")
                    .table(Balance::Table)
                    .col(Balance::AccountId)
                    .col(Balance::CurrencyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Jobs + actions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Job::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Job::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Job::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-job-name-unique")
                    .table(Job::Table)
                    .col(Job::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JobAction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobAction::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobAction::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-job_action-name-unique")
                    .table(JobAction::Table)
                    .col(JobAction::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Reward table
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(JobReward::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobReward::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobReward::JobId).string().not_null())
                    .col(ColumnDef::new(JobReward::JobActionId).string().not_null())
                    .col(ColumnDef::new(JobReward::CurrencyId).integer().not_null())
                    .col(ColumnDef::new(JobReward::Material).string().not_null())
                    .col(
                        ColumnDef::new(JobReward::MoneyMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JobReward::Experience)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-job_reward-job_id")
                            .from(JobReward::Table, JobReward::JobId)
                            .to(Job::Table, Job::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-job_reward-job_action_id")
                            .from(JobReward::Table, JobReward::JobActionId)
                            .to(JobAction::Table, JobAction::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-job_reward-currency_id")
                            .from(JobReward::Table, JobReward::CurrencyId)
                            .to(Currency::Table, Currency::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-job_reward-job-action-material-unique")
                    .table(JobReward::Table)
                    .col(JobReward::JobId)
                    .col(JobReward::JobActionId)
                    .col(JobReward::Material)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Experience counters
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(JobExperience::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobExperience::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobExperience::AccountId).string().not_null())
                    .col(ColumnDef::new(JobExperience::JobId).string().not_null())
                    .col(
                        ColumnDef::new(JobExperience::Experience)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-job_experience-account_id")
                            .from(JobExperience::Table, JobExperience::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-job_experience-job_id")
                            .from(JobExperience::Table, JobExperience::JobId)
                            .to(Job::Table, Job::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-job_experience-account_id-job_id-unique")
                    .table(JobExperience::Table)
                    .col(JobExperience::AccountId)
                    .col(JobExperience::JobId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobExperience::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobReward::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobAction::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Job::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Balance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DefaultBalance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Currency::Table).to_owned())
            .await?;

        Ok(())
    }
}
