use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{Engine, EngineError, Money, PlayerHandle};
use migration::MigratorTrait;

const DOLLARS: i32 = 1;
const MINER_JOB_ID: &str = "1f0b9f5a-3c64-4d2a-9f76-8d2f2a6e4b11";
const LUMBERJACK_JOB_ID: &str = "6cf04f3e-9d5b-4a2e-b1b7-20b4df5d8c2a";
const BREAK_ACTION_ID: &str = "b3c9e3a7-52b0-4f0e-8f9d-3a4c5b6d7e8f";

struct FakePlayer {
    id: Uuid,
}

impl PlayerHandle for FakePlayer {
    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        "tester"
    }

    fn send_message(&self, _message: &str) {}
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO currency (id, name_singular, name_plural, symbol, fraction_digits, is_default) \
         VALUES (?, ?, ?, ?, ?, ?)",
        vec![
            DOLLARS.into(),
            "Dollar".into(),
            "Dollars".into(),
            "$".into(),
            2.into(),
            true.into(),
        ],
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO job (id, name) VALUES (?, ?)",
        vec![MINER_JOB_ID.into(), "miner".into()],
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO job (id, name) VALUES (?, ?)",
        vec![LUMBERJACK_JOB_ID.into(), "lumberjack".into()],
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO job_action (id, name) VALUES (?, ?)",
        vec![BREAK_ACTION_ID.into(), "break".into()],
    ))
    .await
    .unwrap();
    // Breaking coal_ore as a miner pays 0.25 dollars and 5 experience.
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO job_reward (id, job_id, job_action_id, currency_id, material, money_minor, experience) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            MINER_JOB_ID.into(),
            BREAK_ACTION_ID.into(),
            DOLLARS.into(),
            "coal_ore".into(),
            25.into(),
            5.into(),
        ],
    ))
    .await
    .unwrap();

    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn miner_job() -> Uuid {
    Uuid::parse_str(MINER_JOB_ID).unwrap()
}

async fn player_with_account(engine: &Engine) -> Uuid {
    let player = Uuid::new_v4();
    engine.create_account(player).await.unwrap();
    engine.create_experience_rows(player).await.unwrap();
    player
}

#[tokio::test]
async fn catalog_lookups() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(engine.jobs().jobs().len(), 2);
    assert_eq!(engine.jobs().job_by_name("miner").unwrap().id, miner_job());
    assert!(matches!(
        engine.jobs().job_by_name("farmer"),
        Err(EngineError::KeyNotFound(_))
    ));

    let action = engine.jobs().action_by_name("break").unwrap();
    assert!(engine.jobs().reward_for(action.id, "coal_ore").is_some());
    assert!(engine.jobs().reward_for(action.id, "dirt").is_none());
}

#[tokio::test]
async fn create_experience_rows_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let player = player_with_account(&engine).await;

    let first = engine.all_experience(player).await.unwrap();
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|row| row.experience == 0));

    engine.create_experience_rows(player).await.unwrap();
    let second = engine.all_experience(player).await.unwrap();
    assert_eq!(
        first.iter().map(|row| row.id).collect::<Vec<_>>(),
        second.iter().map(|row| row.id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn create_experience_rows_requires_the_account() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_experience_rows(Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn add_experience_accumulates_and_reports_level_movement() {
    let (engine, _db) = engine_with_db().await;
    let player = player_with_account(&engine).await;

    let progress = engine.add_experience(player, miner_job(), 10).await.unwrap();
    assert_eq!(progress.experience, 10);
    assert_eq!(progress.level, 1);
    assert!(!progress.leveled_up);

    // 10 + 40 = 50, exactly the level 2 threshold.
    let progress = engine.add_experience(player, miner_job(), 40).await.unwrap();
    assert_eq!(progress.experience, 50);
    assert_eq!(progress.level, 2);
    assert!(progress.leveled_up);

    let row = engine.experience(player, miner_job()).await.unwrap();
    assert_eq!(row.experience, 50);
    assert_eq!(row.level(), 2);
    assert_eq!(row.level_base_experience(), 50);
    assert_eq!(row.next_level_experience(), 197);

    // A zero delta is a valid no-op.
    let progress = engine.add_experience(player, miner_job(), 0).await.unwrap();
    assert_eq!(progress.experience, 50);
    assert!(!progress.leveled_up);
}

#[tokio::test]
async fn add_experience_rejects_negative_deltas() {
    let (engine, _db) = engine_with_db().await;
    let player = player_with_account(&engine).await;

    let err = engine
        .add_experience(player, miner_job(), -1)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let row = engine.experience(player, miner_job()).await.unwrap();
    assert_eq!(row.experience, 0);
}

#[tokio::test]
async fn experience_without_a_provisioned_row_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let player = Uuid::new_v4();
    engine.create_account(player).await.unwrap();
    // No create_experience_rows call.

    assert!(matches!(
        engine.experience(player, miner_job()).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.add_experience(player, miner_job(), 5).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn breaking_coal_ore_pays_and_levels_up() {
    let (engine, _db) = engine_with_db().await;
    let player = player_with_account(&engine).await;

    // One experience shy of the configured reward pushing past level 1.
    engine.add_experience(player, miner_job(), 45).await.unwrap();

    let outcome = engine
        .handle_action(&FakePlayer { id: player }, "break", "coal_ore")
        .await
        .unwrap();

    assert_eq!(outcome.job_id, miner_job());
    assert!(outcome.fully_applied());
    assert_eq!(outcome.credited(), Money::from_minor(25));
    assert!(outcome.leveled_up());
    assert_eq!(outcome.new_level(), Some(2));

    let progress = outcome.experience.unwrap();
    assert_eq!(progress.experience, 50);

    let balance = engine.balance(player, DOLLARS).await.unwrap();
    assert_eq!(balance, Money::from_minor(25));
}

#[tokio::test]
async fn untracked_actions_grant_nothing() {
    let (engine, _db) = engine_with_db().await;
    let player = player_with_account(&engine).await;
    let handle = FakePlayer { id: player };

    assert!(engine.handle_action(&handle, "swim", "water").await.is_none());
    assert!(engine.handle_action(&handle, "break", "dirt").await.is_none());

    assert_eq!(engine.balance(player, DOLLARS).await.unwrap(), Money::ZERO);
    let row = engine.experience(player, miner_job()).await.unwrap();
    assert_eq!(row.experience, 0);
}

#[tokio::test]
async fn partial_reward_failures_are_reported_not_swallowed() {
    let (engine, db) = engine_with_db().await;
    let player = player_with_account(&engine).await;

    // Drop the player's dollar balance row so the money leg cannot land.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "DELETE FROM balance WHERE account_id = ? AND currency_id = ?",
        vec![player.to_string().into(), DOLLARS.into()],
    ))
    .await
    .unwrap();

    let outcome = engine
        .handle_action(&FakePlayer { id: player }, "break", "coal_ore")
        .await
        .unwrap();

    assert!(!outcome.fully_applied());
    assert_eq!(outcome.credited(), Money::ZERO);
    assert!(matches!(
        outcome.money,
        Some(Err(EngineError::KeyNotFound(_)))
    ));

    // The experience leg still landed and is reported.
    assert!(outcome.experience.is_ok());
    let row = engine.experience(player, miner_job()).await.unwrap();
    assert_eq!(row.experience, 5);
}
