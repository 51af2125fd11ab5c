use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{Balance, Engine, EngineError, Money};
use migration::MigratorTrait;

const DOLLARS: i32 = 1;
const GEMS: i32 = 2;

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
        "INSERT INTO currency (id, name_singular, name_plural, symbol, fraction_digits, is_default) \
         VALUES (?, ?, ?, ?, ?, ?)",
        vec![
            GEMS.into(),
            "Gem".into(),
            "Gems".into(),
            "◆".into(),
            0.into(),
            false.into(),
        ],
    ))
    .await
    .unwrap();
    // New accounts start with 100.00 dollars; gems start at zero.
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO default_balance (id, currency_id, amount_minor) VALUES (?, ?, ?)",
        vec![Uuid::new_v4().to_string().into(), DOLLARS.into(), 10_000.into()],
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

#[tokio::test]
async fn registry_exposes_default_and_rejects_unknown_ids() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(engine.currencies().default_currency().id, DOLLARS);
    assert_eq!(engine.currencies().currencies().len(), 2);
    assert!(matches!(
        engine.currencies().currency(99),
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn create_account_seeds_one_balance_per_currency() {
    let (engine, _db) = engine_with_db().await;
    let player = Uuid::new_v4();

    assert!(!engine.has_account(player).await.unwrap());
    let account = engine.create_account(player).await.unwrap();
    assert_eq!(account.id, player);
    assert!(engine.has_account(player).await.unwrap());

    let balances = engine.balances(player).await.unwrap();
    assert_eq!(balances.len(), 2);
    assert_eq!(balances[0].currency_id, DOLLARS);
    assert_eq!(balances[0].amount, Money::from_minor(10_000));
    assert_eq!(balances[1].currency_id, GEMS);
    assert_eq!(balances[1].amount, Money::ZERO);
}

#[tokio::test]
async fn create_account_twice_is_a_conflict() {
    let (engine, _db) = engine_with_db().await;
    let player = Uuid::new_v4();

    engine.create_account(player).await.unwrap();
    let err = engine.create_account(player).await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn unknown_account_lookups_fail_cleanly() {
    let (engine, _db) = engine_with_db().await;
    let stranger = Uuid::new_v4();

    assert!(matches!(
        engine.account(stranger).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.balance(stranger, DOLLARS).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.balances(stranger).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn set_balance_rejects_negative_amounts() {
    let (engine, _db) = engine_with_db().await;
    let player = Uuid::new_v4();
    engine.create_account(player).await.unwrap();

    let err = engine
        .set_balance(player, DOLLARS, Money::from_minor(-1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    // Untouched by the rejected write.
    let balance = engine.balance(player, DOLLARS).await.unwrap();
    assert_eq!(balance, Money::from_minor(10_000));
}

#[tokio::test]
async fn deposit_and_withdraw_roundtrip() {
    let (engine, _db) = engine_with_db().await;
    let player = Uuid::new_v4();
    engine.create_account(player).await.unwrap();

    let deposit = engine
        .deposit(player, DOLLARS, Money::from_minor(250), true)
        .await
        .unwrap();
    assert_eq!(deposit.new_balance, Money::from_minor(10_250));
    assert!(deposit.notify);

    let remaining = engine
        .withdraw(player, DOLLARS, Money::from_minor(250))
        .await
        .unwrap();
    assert_eq!(remaining, Money::from_minor(10_000));

    assert!(matches!(
        engine.deposit(player, DOLLARS, Money::ZERO, false).await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine.withdraw(player, DOLLARS, Money::from_minor(-5)).await,
        Err(EngineError::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn withdraw_more_than_the_balance_is_insufficient() {
    let (engine, _db) = engine_with_db().await;
    let player = Uuid::new_v4();
    engine.create_account(player).await.unwrap();

    let err = engine
        .withdraw(player, DOLLARS, Money::from_minor(10_001))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    let balance = engine.balance(player, DOLLARS).await.unwrap();
    assert_eq!(balance, Money::from_minor(10_000));
}

#[tokio::test]
async fn transfer_moves_exactly_the_amount_and_conserves_supply() {
    let (engine, _db) = engine_with_db().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    engine.create_account(alice).await.unwrap();
    engine.create_account(bob).await.unwrap();

    // Alice pays Bob 40.00 from her starting 100.00.
    let receipt = engine
        .transfer(alice, bob, DOLLARS, Money::from_minor(4_000))
        .await
        .unwrap();
    assert_eq!(receipt.from_balance, Money::from_minor(6_000));
    assert_eq!(receipt.to_balance, Money::from_minor(14_000));

    let alice_balance = engine.balance(alice, DOLLARS).await.unwrap();
    let bob_balance = engine.balance(bob, DOLLARS).await.unwrap();
    assert_eq!(alice_balance, Money::from_minor(6_000));
    assert_eq!(bob_balance, Money::from_minor(14_000));
    assert_eq!(
        alice_balance.checked_add(bob_balance),
        Some(Money::from_minor(20_000))
    );
}

#[tokio::test]
async fn transfer_with_insufficient_funds_touches_nothing() {
    let (engine, _db) = engine_with_db().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    engine.create_account(alice).await.unwrap();
    engine.create_account(bob).await.unwrap();

    // Alice holds 24.00 and tries to move 25.00.
    engine
        .set_balance(alice, DOLLARS, Money::from_minor(2_400))
        .await
        .unwrap();
    let err = engine
        .transfer(alice, bob, DOLLARS, Money::from_minor(2_500))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    assert_eq!(
        engine.balance(alice, DOLLARS).await.unwrap(),
        Money::from_minor(2_400)
    );
    assert_eq!(
        engine.balance(bob, DOLLARS).await.unwrap(),
        Money::from_minor(10_000)
    );
}

#[tokio::test]
async fn transfer_rejects_bad_arguments() {
    let (engine, _db) = engine_with_db().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    engine.create_account(alice).await.unwrap();
    engine.create_account(bob).await.unwrap();

    assert!(matches!(
        engine.transfer(alice, bob, DOLLARS, Money::ZERO).await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine
            .transfer(alice, bob, DOLLARS, Money::from_minor(-100))
            .await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine
            .transfer(alice, alice, DOLLARS, Money::from_minor(100))
            .await,
        Err(EngineError::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn transfer_between_mismatched_currencies_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    engine.create_account(alice).await.unwrap();
    engine.create_account(bob).await.unwrap();

    let from = engine
        .balances(alice)
        .await
        .unwrap()
        .into_iter()
        .find(|balance| balance.currency_id == DOLLARS)
        .unwrap();
    let to: Balance = engine
        .balances(bob)
        .await
        .unwrap()
        .into_iter()
        .find(|balance| balance.currency_id == GEMS)
        .unwrap();

    let err = engine
        .transfer_balances(&from, &to, Money::from_minor(100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CurrencyMismatch(_)));

    // Neither side changed.
    assert_eq!(
        engine.balance(alice, DOLLARS).await.unwrap(),
        Money::from_minor(10_000)
    );
    assert_eq!(engine.balance(bob, GEMS).await.unwrap(), Money::ZERO);
}

#[tokio::test]
async fn transfer_balances_with_matching_currencies_delegates() {
    let (engine, _db) = engine_with_db().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    engine.create_account(alice).await.unwrap();
    engine.create_account(bob).await.unwrap();

    let from = engine.balances(alice).await.unwrap().remove(0);
    let to = engine.balances(bob).await.unwrap().remove(0);

    let receipt = engine
        .transfer_balances(&from, &to, Money::from_minor(1_000))
        .await
        .unwrap();
    assert_eq!(receipt.from_balance, Money::from_minor(9_000));
    assert_eq!(receipt.to_balance, Money::from_minor(11_000));
}
