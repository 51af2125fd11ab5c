use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Balance, Deposit, EngineError, Money, ResultEngine, Transfer, balances,
    util::ensure_same_currency,
};

use super::{Engine, MAX_WRITE_ATTEMPTS};

impl Engine {
    /// Current balance of an account in one currency.
    pub async fn balance(&self, account_id: Uuid, currency_id: i32) -> ResultEngine<Money> {
        let model = self
            .require_balance_row(&self.database, account_id, currency_id)
            .await?;
        Ok(Money::from_minor(model.amount_minor))
    }

    /// All balance rows of an account, ordered by currency id.
    pub async fn balances(&self, account_id: Uuid) -> ResultEngine<Vec<Balance>> {
        if !self.has_account(account_id).await? {
            return Err(EngineError::KeyNotFound(format!("account {account_id}")));
        }

        let models = balances::Entity::find()
            .filter(balances::Column::AccountId.eq(account_id.to_string()))
            .order_by_asc(balances::Column::CurrencyId)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(Balance::try_from(model)?);
        }
        Ok(out)
    }

    /// Overwrite the stored amount of one balance row.
    ///
    /// The amount must already be scaled to the currency's fraction digits
    /// (all [`Money`] values are); negative amounts are rejected before any
    /// write.
    pub async fn set_balance(
        &self,
        account_id: Uuid,
        currency_id: i32,
        amount: Money,
    ) -> ResultEngine<Balance> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "balance must be >= 0".to_string(),
            ));
        }

        let model = self
            .require_balance_row(&self.database, account_id, currency_id)
            .await?;

        let update = balances::ActiveModel {
            id: ActiveValue::Set(model.id.clone()),
            amount_minor: ActiveValue::Set(amount.minor()),
            ..Default::default()
        };
        update.update(&self.database).await?;

        let mut balance = Balance::try_from(model)?;
        balance.amount = amount;
        Ok(balance)
    }

    /// Credit an account.
    ///
    /// `notify` is a hint for the presentation layer, echoed back in the
    /// receipt; the engine does not act on it.
    pub async fn deposit(
        &self,
        account_id: Uuid,
        currency_id: i32,
        amount: Money,
        notify: bool,
    ) -> ResultEngine<Deposit> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "deposit amount must be > 0".to_string(),
            ));
        }

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let model = self
                .require_balance_row(&self.database, account_id, currency_id)
                .await?;
            let current = Money::from_minor(model.amount_minor);
            let updated = current.checked_add(amount).ok_or_else(|| {
                EngineError::InvalidAmount("deposit overflows the balance".to_string())
            })?;

            if write_amount_if_unchanged(&self.database, &model.id, current, updated).await? {
                return Ok(Deposit {
                    account_id,
                    currency_id,
                    amount,
                    new_balance: updated,
                    notify,
                });
            }
        }

        Err(EngineError::WriteConflict(format!(
            "deposit (account: {account_id}, currency: {currency_id})"
        )))
    }

    /// Debit an account, failing without a write when funds are short.
    pub async fn withdraw(
        &self,
        account_id: Uuid,
        currency_id: i32,
        amount: Money,
    ) -> ResultEngine<Money> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "withdraw amount must be > 0".to_string(),
            ));
        }

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let model = self
                .require_balance_row(&self.database, account_id, currency_id)
                .await?;
            let current = Money::from_minor(model.amount_minor);
            if current < amount {
                return Err(EngineError::InsufficientFunds(format!(
                    "account {account_id} holds {} of currency {currency_id}",
                    current.minor()
                )));
            }
            let updated = current - amount;

            if write_amount_if_unchanged(&self.database, &model.id, current, updated).await? {
                return Ok(updated);
            }
        }

        Err(EngineError::WriteConflict(format!(
            "withdraw (account: {account_id}, currency: {currency_id})"
        )))
    }

    /// Move funds between two accounts in the same currency.
    ///
    /// Both row writes commit as one DB transaction: either both balances
    /// change or neither does, and no intermediate state is observable.
    /// Concurrent transfers over disjoint accounts interleave freely;
    /// transfers racing on the same row retry on the conditional-write
    /// conflict, so every applied delta lands exactly once.
    pub async fn transfer(
        &self,
        from_account_id: Uuid,
        to_account_id: Uuid,
        currency_id: i32,
        amount: Money,
    ) -> ResultEngine<Transfer> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "transfer amount must be > 0".to_string(),
            ));
        }
        if from_account_id == to_account_id {
            return Err(EngineError::InvalidAmount(
                "from and to accounts must differ".to_string(),
            ));
        }

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let db_tx = self.database.begin().await?;

            let from_row = self
                .require_balance_row(&db_tx, from_account_id, currency_id)
                .await?;
            let to_row = self
                .require_balance_row(&db_tx, to_account_id, currency_id)
                .await?;
            ensure_same_currency(from_row.currency_id, to_row.currency_id)?;

            let from_current = Money::from_minor(from_row.amount_minor);
            let to_current = Money::from_minor(to_row.amount_minor);
            if from_current < amount {
                return Err(EngineError::InsufficientFunds(format!(
                    "account {from_account_id} holds {} of currency {currency_id}",
                    from_current.minor()
                )));
            }

            let from_updated = from_current - amount;
            let to_updated = to_current.checked_add(amount).ok_or_else(|| {
                EngineError::InvalidAmount("transfer overflows the receiving balance".to_string())
            })?;

            let debited =
                write_amount_if_unchanged(&db_tx, &from_row.id, from_current, from_updated).await?;
            let credited =
                write_amount_if_unchanged(&db_tx, &to_row.id, to_current, to_updated).await?;

            if debited && credited {
                db_tx.commit().await?;
                return Ok(Transfer {
                    from_account_id,
                    to_account_id,
                    currency_id,
                    amount,
                    from_balance: from_updated,
                    to_balance: to_updated,
                });
            }

            // Lost a race on one of the rows; drop both writes and retry
            // from fresh reads.
            db_tx.rollback().await?;
        }

        Err(EngineError::WriteConflict(format!(
            "transfer (from: {from_account_id}, to: {to_account_id}, currency: {currency_id})"
        )))
    }

    /// Transfer between two already-fetched balance snapshots.
    ///
    /// Entry point for callers (the pay command) that hold [`Balance`]
    /// snapshots: validates that both reference the same currency, then
    /// re-reads authoritative state inside [`transfer`](Engine::transfer);
    /// the snapshot amounts are treated as stale hints.
    pub async fn transfer_balances(
        &self,
        from: &Balance,
        to: &Balance,
        amount: Money,
    ) -> ResultEngine<Transfer> {
        ensure_same_currency(from.currency_id, to.currency_id)?;
        self.transfer(from.account_id, to.account_id, from.currency_id, amount)
            .await
    }

    pub(super) async fn require_balance_row<C: ConnectionTrait>(
        &self,
        conn: &C,
        account_id: Uuid,
        currency_id: i32,
    ) -> ResultEngine<balances::Model> {
        self.currencies().currency(currency_id)?;

        balances::Entity::find()
            .filter(balances::Column::AccountId.eq(account_id.to_string()))
            .filter(balances::Column::CurrencyId.eq(currency_id))
            .one(conn)
            .await?
            .ok_or_else(|| {
                EngineError::KeyNotFound(format!(
                    "balance (account: {account_id}, currency: {currency_id})"
                ))
            })
    }
}

/// Conditionally overwrite a balance row: the write only lands when the row
/// still holds the amount this writer read. Returns whether it did.
async fn write_amount_if_unchanged<C: ConnectionTrait>(
    conn: &C,
    row_id: &str,
    observed: Money,
    updated: Money,
) -> ResultEngine<bool> {
    let result = balances::Entity::update_many()
        .col_expr(balances::Column::AmountMinor, Expr::value(updated.minor()))
        .filter(balances::Column::Id.eq(row_id))
        .filter(balances::Column::AmountMinor.eq(observed.minor()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}
