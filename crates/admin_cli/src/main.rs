//! Operator tool for the economy engine.
//!
//! Everything here is glue: parse arguments, call the engine, print the
//! result. Ledger and leveling rules live in the `engine` crate only. The
//! `seed` subcommand is the bootstrap path that loads the static catalogs
//! (currencies, jobs, rewards) from a JSON file into the database; the
//! engine treats those tables as already-validated startup data.

use std::{collections::HashMap, error::Error, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use engine::{Engine, Money, PlayerHandle};
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, ActiveValue, Database, DatabaseConnection, EntityTrait};
use serde::Deserialize;
use uuid::Uuid;

/// Local entity definitions for catalog seeding.
///
/// The engine keeps its entities private and its catalogs read-only; seeding
/// writes the tables directly, so the table shapes are mirrored here.
mod tables {
    pub mod currency {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
        #[sea_orm(table_name = "currency")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: i32,
            pub name_singular: String,
            pub name_plural: String,
            pub symbol: String,
            pub fraction_digits: i32,
            pub is_default: bool,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    pub mod default_balance {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
        #[sea_orm(table_name = "default_balance")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: String,
            pub currency_id: i32,
            pub amount_minor: i64,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    pub mod job {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
        #[sea_orm(table_name = "job")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: String,
            pub name: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    pub mod job_action {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
        #[sea_orm(table_name = "job_action")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: String,
            pub name: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    pub mod job_reward {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
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
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }
}

#[derive(Parser, Debug)]
#[command(name = "lootledger_admin")]
#[command(about = "Admin utilities for the economy engine (accounts, balances, jobs)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./lootledger.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the static catalogs from a JSON file.
    Seed(SeedArgs),
    /// Create or inspect a player account.
    Account(AccountArgs),
    /// Show a player's balances.
    Balance(BalanceArgs),
    /// Overwrite one balance.
    SetBalance(SetBalanceArgs),
    /// Transfer funds between two players (default currency).
    Pay(PayArgs),
    /// Show a player's job levels.
    Jobs(JobsArgs),
    /// Simulate a tracked in-game action and apply its reward.
    Action(ActionArgs),
}

#[derive(Args, Debug)]
struct SeedArgs {
    #[arg(long)]
    file: PathBuf,
}

#[derive(Args, Debug)]
struct AccountArgs {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(PlayerArg),
    Show(PlayerArg),
}

#[derive(Args, Debug)]
struct PlayerArg {
    #[arg(long)]
    player: Uuid,
}

#[derive(Args, Debug)]
struct BalanceArgs {
    #[arg(long)]
    player: Uuid,
    #[arg(long)]
    currency: Option<i32>,
}

#[derive(Args, Debug)]
struct SetBalanceArgs {
    #[arg(long)]
    player: Uuid,
    #[arg(long)]
    currency: Option<i32>,
    #[arg(long)]
    amount: String,
}

#[derive(Args, Debug)]
struct PayArgs {
    #[arg(long)]
    from: Uuid,
    #[arg(long)]
    to: Uuid,
    #[arg(long)]
    amount: String,
}

#[derive(Args, Debug)]
struct JobsArgs {
    #[arg(long)]
    player: Uuid,
}

#[derive(Args, Debug)]
struct ActionArgs {
    #[arg(long)]
    player: Uuid,
    /// Action kind as the event layer reports it (break, place, kill, fish).
    #[arg(long)]
    action: String,
    /// Target material/entity name, e.g. coal_ore.
    #[arg(long)]
    material: String,
    /// Display name used for player-facing messages.
    #[arg(long)]
    name: Option<String>,
}

type CliResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Stand-in for a host player object: messages go to stdout.
struct ConsolePlayer {
    id: Uuid,
    name: String,
}

impl PlayerHandle for ConsolePlayer {
    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn send_message(&self, message: &str) {
        println!("[{}] {message}", self.name);
    }
}

#[tokio::main]
async fn main() -> CliResult {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db = Database::connect(&cli.database_url).await?;
    migration::Migrator::up(&db, None).await?;

    match cli.command {
        Command::Seed(args) => seed(&db, &args.file).await,
        Command::Account(args) => account_command(&build_engine(db).await?, args).await,
        Command::Balance(args) => balance_command(&build_engine(db).await?, args).await,
        Command::SetBalance(args) => set_balance_command(&build_engine(db).await?, args).await,
        Command::Pay(args) => pay_command(&build_engine(db).await?, args).await,
        Command::Jobs(args) => jobs_command(&build_engine(db).await?, args).await,
        Command::Action(args) => action_command(&build_engine(db).await?, args).await,
    }
}

async fn build_engine(db: DatabaseConnection) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    Ok(Engine::builder().database(db).build().await?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog seeding
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CatalogFile {
    currencies: Vec<CurrencyEntry>,
    #[serde(default)]
    jobs: Vec<JobEntry>,
}

#[derive(Debug, Deserialize)]
struct CurrencyEntry {
    id: i32,
    name_singular: String,
    name_plural: String,
    symbol: String,
    #[serde(default)]
    fraction_digits: u32,
    #[serde(default)]
    is_default: bool,
    /// Amount every new account starts with, as a decimal string.
    #[serde(default)]
    starting_balance: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobEntry {
    name: String,
    #[serde(default)]
    rewards: Vec<RewardEntry>,
}

#[derive(Debug, Deserialize)]
struct RewardEntry {
    action: String,
    material: String,
    /// Defaults to the catalog's default currency.
    #[serde(default)]
    currency_id: Option<i32>,
    money: String,
    experience: i64,
}

async fn seed(db: &DatabaseConnection, file: &PathBuf) -> CliResult {
    let raw = std::fs::read_to_string(file)?;
    let catalog: CatalogFile = serde_json::from_str(&raw)?;

    let default_currency_id = catalog
        .currencies
        .iter()
        .find(|currency| currency.is_default)
        .map(|currency| currency.id)
        .ok_or("catalog must flag one currency as default")?;
    let digits_by_id: HashMap<i32, u32> = catalog
        .currencies
        .iter()
        .map(|currency| (currency.id, currency.fraction_digits))
        .collect();

    for currency in &catalog.currencies {
        tables::currency::ActiveModel {
            id: ActiveValue::Set(currency.id),
            name_singular: ActiveValue::Set(currency.name_singular.clone()),
            name_plural: ActiveValue::Set(currency.name_plural.clone()),
            symbol: ActiveValue::Set(currency.symbol.clone()),
            fraction_digits: ActiveValue::Set(currency.fraction_digits as i32),
            is_default: ActiveValue::Set(currency.is_default),
        }
        .insert(db)
        .await?;

        if let Some(amount) = &currency.starting_balance {
            let amount = Money::from_decimal_str(amount, currency.fraction_digits)?;
            tables::default_balance::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                currency_id: ActiveValue::Set(currency.id),
                amount_minor: ActiveValue::Set(amount.minor()),
            }
            .insert(db)
            .await?;
        }
    }

    let mut action_ids: HashMap<String, String> = tables::job_action::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|model| (model.name, model.id))
        .collect();

    let mut reward_count = 0usize;
    for job in &catalog.jobs {
        let job_id = Uuid::new_v4().to_string();
        tables::job::ActiveModel {
            id: ActiveValue::Set(job_id.clone()),
            name: ActiveValue::Set(job.name.clone()),
        }
        .insert(db)
        .await?;

        for reward in &job.rewards {
            let action_id = match action_ids.get(&reward.action) {
                Some(id) => id.clone(),
                None => {
                    let id = Uuid::new_v4().to_string();
                    tables::job_action::ActiveModel {
                        id: ActiveValue::Set(id.clone()),
                        name: ActiveValue::Set(reward.action.clone()),
                    }
                    .insert(db)
                    .await?;
                    action_ids.insert(reward.action.clone(), id.clone());
                    id
                }
            };

            let currency_id = reward.currency_id.unwrap_or(default_currency_id);
            let digits = *digits_by_id
                .get(&currency_id)
                .ok_or_else(|| format!("reward references unknown currency {currency_id}"))?;
            let money = Money::from_decimal_str(&reward.money, digits)?;

            tables::job_reward::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                job_id: ActiveValue::Set(job_id.clone()),
                job_action_id: ActiveValue::Set(action_id),
                currency_id: ActiveValue::Set(currency_id),
                material: ActiveValue::Set(reward.material.clone()),
                money_minor: ActiveValue::Set(money.minor()),
                experience: ActiveValue::Set(reward.experience),
            }
            .insert(db)
            .await?;
            reward_count += 1;
        }
    }

    println!(
        "Seeded {} currencies, {} jobs, {} rewards",
        catalog.currencies.len(),
        catalog.jobs.len(),
        reward_count
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

async fn account_command(engine: &Engine, args: AccountArgs) -> CliResult {
    match args.command {
        AccountCommand::Create(PlayerArg { player }) => {
            let account = engine.create_account(player).await?;
            engine.create_experience_rows(player).await?;
            println!("Created account {} at {}", account.id, account.created_at);
        }
        AccountCommand::Show(PlayerArg { player }) => {
            let account = engine.account(player).await?;
            println!("Account {} created {}", account.id, account.created_at);
            for balance in engine.balances(player).await? {
                let currency = engine.currencies().currency(balance.currency_id)?;
                println!(
                    "  {} {}",
                    currency.format(balance.amount),
                    currency.name_for(balance.amount)
                );
            }
        }
    }
    Ok(())
}

async fn balance_command(engine: &Engine, args: BalanceArgs) -> CliResult {
    match args.currency {
        Some(currency_id) => {
            let amount = engine.balance(args.player, currency_id).await?;
            let currency = engine.currencies().currency(currency_id)?;
            println!("{} {}", currency.format(amount), currency.name_for(amount));
        }
        None => {
            for balance in engine.balances(args.player).await? {
                let currency = engine.currencies().currency(balance.currency_id)?;
                println!(
                    "{} {}",
                    currency.format(balance.amount),
                    currency.name_for(balance.amount)
                );
            }
        }
    }
    Ok(())
}

async fn set_balance_command(engine: &Engine, args: SetBalanceArgs) -> CliResult {
    let currency_id = args
        .currency
        .unwrap_or_else(|| engine.currencies().default_currency().id);
    let currency = engine.currencies().currency(currency_id)?;
    let amount = Money::from_decimal_str(&args.amount, currency.fraction_digits)?;

    let balance = engine.set_balance(args.player, currency_id, amount).await?;
    println!("Balance set to {}", currency.format(balance.amount));
    Ok(())
}

async fn pay_command(engine: &Engine, args: PayArgs) -> CliResult {
    let currency = engine.currencies().default_currency();
    let amount = Money::from_decimal_str(&args.amount, currency.fraction_digits)?;
    if !amount.is_positive() {
        return Err("amount must be a positive decimal".into());
    }

    let receipt = engine
        .transfer(args.from, args.to, currency.id, amount)
        .await?;
    println!(
        "Paid {} to {} (remaining balance: {})",
        currency.format(receipt.amount),
        receipt.to_account_id,
        currency.format(receipt.from_balance)
    );
    Ok(())
}

async fn jobs_command(engine: &Engine, args: JobsArgs) -> CliResult {
    let rows = engine.all_experience(args.player).await?;
    if rows.is_empty() {
        println!("No job experience recorded for {}", args.player);
        return Ok(());
    }
    for row in rows {
        let job = engine.jobs().job(row.job_id)?;
        println!(
            "{:<16} level {:<4} {} / {} exp",
            job.name,
            row.level(),
            row.experience,
            row.next_level_experience()
        );
    }
    Ok(())
}

async fn action_command(engine: &Engine, args: ActionArgs) -> CliResult {
    let player = ConsolePlayer {
        id: args.player,
        name: args.name.unwrap_or_else(|| args.player.to_string()),
    };

    let Some(outcome) = engine
        .handle_action(&player, &args.action, &args.material)
        .await
    else {
        println!(
            "No reward configured for '{}' on '{}'",
            args.action, args.material
        );
        return Ok(());
    };

    let job = engine.jobs().job(outcome.job_id)?;
    match &outcome.money {
        Some(Ok(deposit)) => {
            let currency = engine.currencies().currency(deposit.currency_id)?;
            println!(
                "Credited {} (balance: {})",
                currency.format(deposit.amount),
                currency.format(deposit.new_balance)
            );
        }
        Some(Err(err)) => println!("Money reward failed: {err}"),
        None => {}
    }
    match &outcome.experience {
        Ok(progress) => {
            println!(
                "{}: {} exp, level {}",
                job.name, progress.experience, progress.level
            );
            if progress.leveled_up {
                player.send_message(&format!(
                    "Congratulations on reaching level {} in {}!",
                    progress.level, job.name
                ));
            }
        }
        Err(err) => println!("Experience reward failed: {err}"),
    }

    Ok(())
}
