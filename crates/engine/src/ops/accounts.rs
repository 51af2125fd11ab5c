use sea_orm::{QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Account, Balance, EngineError, ResultEngine, accounts, balances};

use super::{Engine, with_tx};

impl Engine {
    /// Create the ledger account for a player.
    ///
    /// Inserts the account row and, in the same DB transaction, one balance
    /// row per known currency seeded at that currency's configured starting
    /// amount. Fails with `ExistingKey` when the account already exists;
    /// callers that only want "make sure it exists" should check
    /// [`has_account`](Engine::has_account) first.
    pub async fn create_account(&self, account_id: Uuid) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let existing = accounts::Entity::find_by_id(account_id.to_string())
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(account_id.to_string()));
            }

            let account = Account::new(account_id);
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;

            for currency in self.currencies().currencies() {
                let balance = Balance::new(
                    account_id,
                    currency.id,
                    self.currencies().starting_balance(currency.id),
                );
                balances::ActiveModel::from(&balance).insert(&db_tx).await?;
            }

            Ok(account)
        })
    }

    /// Return an account snapshot from DB.
    pub async fn account(&self, account_id: Uuid) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("account {account_id}")))?;
        Account::try_from(model)
    }

    /// Whether an account exists. Absence is `Ok(false)`, never an error.
    pub async fn has_account(&self, account_id: Uuid) -> ResultEngine<bool> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?;
        Ok(model.is_some())
    }

    /// All accounts, oldest first.
    pub async fn accounts(&self) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .order_by_asc(accounts::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(Account::try_from(model)?);
        }
        Ok(out)
    }
}
